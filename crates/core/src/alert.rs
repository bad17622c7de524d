use crate::models::{Alert, AlertTier, RiskLevel, SensitivityProfile, Zone};

pub const SPECIAL_NOTICE: &str =
    "Due to your high sensitivity level, consider extra precautions even in moderate risk zones.";

const HIGH_ACTIONS: &[&str] = &[
    "Wear N95 mask outdoors",
    "Avoid parks and green areas",
    "Keep windows closed",
    "Consider indoor activities today",
];

const MODERATE_ACTIONS: &[&str] = &[
    "Limit outdoor time to 1-2 hours",
    "Carry allergy medication",
    "Shower after being outdoors",
    "Use air purifier at home",
];

const LOW_ACTIONS: &[&str] = &[
    "Normal outdoor activities safe",
    "Ideal for tourism and exploration",
    "Maintain normal precautions",
];

pub fn tier_for(risk_level: RiskLevel) -> AlertTier {
    match risk_level {
        RiskLevel::High => AlertTier::High,
        RiskLevel::Medium => AlertTier::Moderate,
        RiskLevel::Low => AlertTier::Low,
    }
}

/// Builds the alert for a zone as seen by a user with the given sensitivity.
///
/// Sensitivity only gates `special_notice`; the tier and actions come from
/// the zone alone.
pub fn classify(zone: &Zone, sensitivity: SensitivityProfile) -> Alert {
    let tier = tier_for(zone.risk_level);

    let (headline, action_heading, actions) = match tier {
        AlertTier::High => ("HIGH RISK ALERT", "Immediate Actions", HIGH_ACTIONS),
        AlertTier::Moderate => (
            "MODERATE RISK ALERT",
            "Recommended Actions",
            MODERATE_ACTIONS,
        ),
        AlertTier::Low => ("LOW RISK CONDITIONS", "Enjoy your day", LOW_ACTIONS),
    };

    Alert {
        tier,
        headline: headline.to_string(),
        pollen_summary: format!(
            "Pollen Count: {}/100 ({})",
            zone.pollen_count,
            pollen_label(tier)
        ),
        action_heading: action_heading.to_string(),
        actions: actions.iter().map(|action| action.to_string()).collect(),
        special_notice: sensitivity
            .is_elevated()
            .then(|| SPECIAL_NOTICE.to_string()),
    }
}

fn pollen_label(tier: AlertTier) -> &'static str {
    match tier {
        AlertTier::High => "Very High",
        AlertTier::Moderate => "Moderate",
        AlertTier::Low => "Low",
    }
}
