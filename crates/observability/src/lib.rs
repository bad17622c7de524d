use std::env;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceCell<()> = OnceCell::new();

/// Counters for advisory traffic. Every timed request contributes one
/// latency sample, so the average is taken over samples rather than over
/// whatever else bumped `requests_total`.
#[derive(Debug, Default)]
pub struct AppMetrics {
    requests_total: AtomicU64,
    alerts_total: AtomicU64,
    questions_total: AtomicU64,
    fallback_replies_total: AtomicU64,
    zone_not_found_total: AtomicU64,
    latency_samples_total: AtomicU64,
    total_latency_micros: AtomicU64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub requests_total: u64,
    pub alerts_total: u64,
    pub questions_total: u64,
    pub fallback_replies_total: u64,
    pub zone_not_found_total: u64,
    pub latency_samples_total: u64,
    pub avg_latency_millis: f64,
}

/// Records elapsed time into its metrics when dropped.
#[must_use = "the latency sample is taken when the timer is dropped"]
pub struct RequestTimer<'a> {
    metrics: &'a AppMetrics,
    started: Instant,
}

impl Drop for RequestTimer<'_> {
    fn drop(&mut self) {
        self.metrics.observe_latency(self.started.elapsed());
    }
}

impl AppMetrics {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Counts a request and times it until the returned guard goes out of scope.
    pub fn start_request(&self) -> RequestTimer<'_> {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        RequestTimer {
            metrics: self,
            started: Instant::now(),
        }
    }

    pub fn inc_alert(&self) {
        self.alerts_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_question(&self) {
        self.questions_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_fallback(&self) {
        self.fallback_replies_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_zone_not_found(&self) {
        self.zone_not_found_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn observe_latency(&self, duration: Duration) {
        let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);
        self.latency_samples_total.fetch_add(1, Ordering::Relaxed);
        self.total_latency_micros.fetch_add(micros, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let samples = self.latency_samples_total.load(Ordering::Relaxed);
        let latency = self.total_latency_micros.load(Ordering::Relaxed);

        MetricsSnapshot {
            requests_total: self.requests_total.load(Ordering::Relaxed),
            alerts_total: self.alerts_total.load(Ordering::Relaxed),
            questions_total: self.questions_total.load(Ordering::Relaxed),
            fallback_replies_total: self.fallback_replies_total.load(Ordering::Relaxed),
            zone_not_found_total: self.zone_not_found_total.load(Ordering::Relaxed),
            latency_samples_total: samples,
            avg_latency_millis: if samples == 0 {
                0.0
            } else {
                latency as f64 / 1_000.0 / samples as f64
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Compact,
}

impl LogFormat {
    /// Reads `BLOOM_LOG_FORMAT`; anything other than `compact` keeps JSON.
    pub fn from_env() -> Self {
        Self::parse(env::var("BLOOM_LOG_FORMAT").ok().as_deref())
    }

    fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(value) if value.eq_ignore_ascii_case("compact") => Self::Compact,
            _ => Self::Json,
        }
    }
}

/// Installs the global subscriber once per process. Events go to stderr so
/// the CLI can keep stdout for its own JSON output.
pub fn init_tracing(service_name: &str) {
    TRACING_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{service_name}=info,bloom_api=info,bloom_agents=info"
            ))
        });

        match LogFormat::from_env() {
            LogFormat::Json => tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_current_span(true)
                .with_span_list(true)
                .with_writer(io::stderr)
                .init(),
            LogFormat::Compact => tracing_subscriber::fmt()
                .compact()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .init(),
        }
    });
}
