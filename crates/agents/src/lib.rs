use std::sync::Arc;

use anyhow::Result;
use bloom_core::{
    classify, route, Alert, AlertTier, ConversationSession, Intent, SensitivityProfile, Zone,
    ZoneRegistry,
};
use bloom_observability::AppMetrics;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskInput {
    pub zone: String,
    pub sensitivity: SensitivityProfile,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ZoneAlert {
    pub zone: Zone,
    pub sensitivity: SensitivityProfile,
    pub alert: Alert,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdvisoryReply {
    pub session_id: String,
    pub reply_text: String,
    pub intent: Intent,
    pub zone: String,
    pub tier: AlertTier,
    pub turn_count: usize,
}

/// Entry point shared by the API and CLI hosts.
///
/// Holds no per-user state; conversation sessions are owned by the caller.
#[derive(Clone)]
pub struct AdvisoryAgent {
    registry: Arc<ZoneRegistry>,
    metrics: Arc<AppMetrics>,
}

impl AdvisoryAgent {
    pub fn new(registry: Arc<ZoneRegistry>, metrics: Arc<AppMetrics>) -> Self {
        Self { registry, metrics }
    }

    /// Agent over the seeded Cusco registry.
    pub fn seeded(metrics: Arc<AppMetrics>) -> Self {
        Self::new(Arc::new(ZoneRegistry::global().clone()), metrics)
    }

    pub fn metrics(&self) -> &Arc<AppMetrics> {
        &self.metrics
    }

    pub fn zone_count(&self) -> usize {
        self.registry.len()
    }

    pub fn list_zones(&self) -> &[Zone] {
        let _timer = self.metrics.start_request();
        self.registry.list_zones()
    }

    pub fn zone(&self, name: &str) -> Result<&Zone> {
        self.registry.get_zone(name).map_err(|err| {
            self.metrics.inc_zone_not_found();
            warn!(zone = %name, "zone lookup failed");
            err.into()
        })
    }

    #[instrument(skip(self))]
    pub fn alert(&self, zone_name: &str, sensitivity: SensitivityProfile) -> Result<ZoneAlert> {
        let _timer = self.metrics.start_request();
        let zone = self.zone(zone_name)?;
        let alert = classify(zone, sensitivity);
        self.metrics.inc_alert();

        debug!(
            zone = %zone.name,
            tier = ?alert.tier,
            special_notice = alert.special_notice.is_some(),
            "alert classified"
        );

        Ok(ZoneAlert {
            zone: zone.clone(),
            sensitivity,
            alert,
        })
    }

    /// Routes one question and records it in `session`.
    ///
    /// Returns `Ok(None)` without touching the session when the question is
    /// blank.
    #[instrument(skip(self, session, input), fields(session_id = %session.session_id()))]
    pub fn ask(
        &self,
        session: &mut ConversationSession,
        input: &AskInput,
    ) -> Result<Option<AdvisoryReply>> {
        let _timer = self.metrics.start_request();

        if input.text.trim().is_empty() {
            debug!("blank question ignored");
            return Ok(None);
        }

        let zone = self.zone(&input.zone)?;
        let alert = classify(zone, input.sensitivity);
        let (intent, reply_text) = route(session, &input.text, zone, &alert);

        self.metrics.inc_question();
        if intent == Intent::Greeting {
            self.metrics.inc_fallback();
        }

        info!(
            zone = %zone.name,
            intent = ?intent,
            tier = ?alert.tier,
            turns = session.len(),
            "question routed"
        );

        Ok(Some(AdvisoryReply {
            session_id: session.session_id().to_string(),
            reply_text,
            intent,
            zone: zone.name.clone(),
            tier: alert.tier,
            turn_count: session.len(),
        }))
    }
}
