use std::net::SocketAddr;

use anyhow::Result;
use bloom_api::{build_app_with_config, ApiConfig};
use bloom_observability::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("bloom_api");

    let config = ApiConfig::from_env();
    let bind = config.bind.clone();
    let app = build_app_with_config(config).await?;

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!(bind = %bind, "bloom advisory api started");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
