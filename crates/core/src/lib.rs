pub mod alert;
pub mod intent;
pub mod models;
pub mod registry;
pub mod responses;

pub use alert::{classify, tier_for, SPECIAL_NOTICE};
pub use intent::{
    classify_intent, normalize_text, render_reply, route, IntentRoute, Renderer, INTENT_ROUTES,
};
pub use models::*;
pub use registry::{cusco_seed, RegistryError, ZoneNotFound, ZoneRegistry};
pub use responses::ReplyContext;
