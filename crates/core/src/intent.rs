use crate::models::{Alert, ConversationSession, Intent, Role, Zone};
use crate::responses::{self, ReplyContext};

pub type Renderer = fn(&ReplyContext<'_>) -> String;

#[derive(Clone, Copy)]
pub struct IntentRoute {
    pub intent: Intent,
    pub keywords: &'static [&'static str],
    pub render: Renderer,
}

/// Evaluated top to bottom; the first route with a keyword contained in the
/// case-folded question wins.
pub const INTENT_ROUTES: &[IntentRoute] = &[
    IntentRoute {
        intent: Intent::PollenSituation,
        keywords: &["pollen", "allergy", "symptoms"],
        render: responses::pollen_situation,
    },
    IntentRoute {
        intent: Intent::SatelliteData,
        keywords: &["nasa", "satellite", "data"],
        render: responses::satellite_data,
    },
    IntentRoute {
        intent: Intent::Forecast,
        keywords: &["predict", "forecast", "tomorrow"],
        render: responses::forecast,
    },
    IntentRoute {
        intent: Intent::HealthGuidance,
        keywords: &["medicine", "treatment", "help"],
        render: responses::health_guidance,
    },
];

const FALLBACK_RENDER: Renderer = responses::greeting;

pub fn normalize_text(input: &str) -> String {
    input.to_lowercase()
}

pub fn classify_intent(text: &str) -> Intent {
    match_route(&normalize_text(text)).map_or(Intent::Greeting, |route| route.intent)
}

pub fn render_reply(intent: Intent, zone: &Zone, alert: &Alert) -> String {
    let ctx = ReplyContext { zone, alert };
    let render = INTENT_ROUTES
        .iter()
        .find(|route| route.intent == intent)
        .map_or(FALLBACK_RENDER, |route| route.render);
    render(&ctx)
}

/// Answers `question` for the current zone and records the exchange.
///
/// Appends one user turn and one assistant turn, in that order. Callers are
/// expected to drop blank questions before getting here.
pub fn route(
    session: &mut ConversationSession,
    question: &str,
    zone: &Zone,
    alert: &Alert,
) -> (Intent, String) {
    let intent = classify_intent(question);
    let reply = render_reply(intent, zone, alert);

    session.push(Role::User, question.to_string(), None);
    session.push(Role::Assistant, reply.clone(), Some(intent));

    (intent, reply)
}

fn match_route(lower: &str) -> Option<&'static IntentRoute> {
    INTENT_ROUTES
        .iter()
        .find(|route| contains_any(lower, route.keywords))
}

fn contains_any(input: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| input.contains(needle))
}
