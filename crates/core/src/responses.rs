use crate::models::{Alert, Zone};

/// What a reply template may read while rendering.
#[derive(Debug, Clone, Copy)]
pub struct ReplyContext<'a> {
    pub zone: &'a Zone,
    pub alert: &'a Alert,
}

pub fn pollen_situation(ctx: &ReplyContext<'_>) -> String {
    format!(
        "Current Pollen Situation in {}:\n\
         - Risk Level: {}\n\
         - Pollen Count: {}/100\n\
         - Primary Triggers: Eucalyptus, grasses, local flora\n\n\
         NASA Insight: MODIS satellite data shows active vegetation flowering in central Cusco regions.",
        ctx.zone.name,
        ctx.zone.risk_level.label(),
        ctx.zone.pollen_count,
    )
}

pub fn satellite_data(_: &ReplyContext<'_>) -> String {
    "NASA Technology Powering Bloom4Health+:\n\
     - MODIS Terra/Aqua: Daily vegetation monitoring (NDVI)\n\
     - Landsat 8/9: High-resolution land observation\n\
     - VIIRS: Night-time data and urban heat islands\n\
     - Earthdata API: Real-time data access and processing\n\n\
     We combine these datasets to predict pollen release 72 hours in advance."
        .to_string()
}

pub fn forecast(ctx: &ReplyContext<'_>) -> String {
    format!(
        "3-Day Allergy Forecast for {}:\n\
         - Today: {} risk\n\
         - Tomorrow: Expected similar conditions\n\
         - Day 3: Potential improvement if weather changes\n\n\
         NASA Prediction Model: Using historical patterns + real-time vegetation data",
        ctx.zone.name,
        ctx.alert.tier.label(),
    )
}

pub fn health_guidance(_: &ReplyContext<'_>) -> String {
    "Health Recommendations:\n\n\
     For Mild Symptoms:\n\
     - Antihistamines (consult pharmacist)\n\
     - Nasal saline sprays\n\
     - Eye drops for irritation\n\n\
     For Severe Symptoms:\n\
     - Consult healthcare provider\n\
     - Consider allergy testing\n\
     - Develop management plan\n\n\
     Prevention:\n\
     - Check our daily alerts\n\
     - Plan outdoor activities wisely\n\
     - Keep medications handy"
        .to_string()
}

pub fn greeting(_: &ReplyContext<'_>) -> String {
    "Hello! I'm BloomWatch AI, your allergy assistant.\n\n\
     I can help you with:\n\
     - Current pollen and allergy conditions\n\
     - NASA satellite data explanations\n\
     - Health recommendations and precautions\n\
     - 3-day allergy forecasts\n\n\
     Try asking about today's pollen levels or how NASA technology helps us predict allergies!"
        .to_string()
}
