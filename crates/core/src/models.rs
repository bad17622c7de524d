use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Pollen count at or above which a zone is considered high risk.
    pub const HIGH_POLLEN_THRESHOLD: u8 = 80;
    /// Pollen count at or above which a zone is considered medium risk.
    pub const MEDIUM_POLLEN_THRESHOLD: u8 = 40;

    /// Banding used to cross-check authored risk levels against pollen counts.
    pub fn from_pollen_count(pollen_count: u8) -> Self {
        if pollen_count >= Self::HIGH_POLLEN_THRESHOLD {
            Self::High
        } else if pollen_count >= Self::MEDIUM_POLLEN_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub name: String,
    pub coordinates: Coordinates,
    pub risk_level: RiskLevel,
    pub pollen_count: u8,
    pub description: String,
}

impl Zone {
    pub fn new(
        name: &str,
        (latitude, longitude): (f64, f64),
        risk_level: RiskLevel,
        pollen_count: u8,
        description: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            coordinates: Coordinates {
                latitude,
                longitude,
            },
            risk_level,
            pollen_count,
            description: description.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityProfile {
    Low,
    Medium,
    High,
    Respiratory,
}

impl SensitivityProfile {
    pub const ALL: [Self; 4] = [Self::Low, Self::Medium, Self::High, Self::Respiratory];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "low" | "none" | "no history" | "low (no history)" => Some(Self::Low),
            "medium" | "occasional" | "medium (occasional)" => Some(Self::Medium),
            "high" | "frequent" | "high (frequent)" => Some(Self::High),
            "respiratory" | "asthma" | "asthma/respiratory" | "asthma/respiratory issues" => {
                Some(Self::Respiratory)
            }
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low (No history)",
            Self::Medium => "Medium (Occasional)",
            Self::High => "High (Frequent)",
            Self::Respiratory => "Asthma/Respiratory issues",
        }
    }

    /// Profiles that receive the extra cautionary notice on every alert.
    pub fn is_elevated(self) -> bool {
        matches!(self, Self::High | Self::Respiratory)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertTier {
    Low,
    Moderate,
    High,
}

impl AlertTier {
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub tier: AlertTier,
    pub headline: String,
    pub pollen_summary: String,
    pub action_heading: String,
    pub actions: Vec<String>,
    pub special_notice: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    PollenSituation,
    SatelliteData,
    Forecast,
    HealthGuidance,
    Greeting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
    pub at: DateTime<Utc>,
}

/// Append-only transcript for a single user interaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSession {
    session_id: String,
    created_at: DateTime<Utc>,
    turns: Vec<ConversationTurn>,
}

impl ConversationSession {
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4().to_string())
    }

    pub fn with_id(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            created_at: Utc::now(),
            turns: Vec::new(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn append_turn(&mut self, role: Role, text: impl Into<String>) {
        self.push(role, text.into(), None);
    }

    pub(crate) fn push(&mut self, role: Role, text: String, intent: Option<Intent>) {
        self.turns.push(ConversationTurn {
            role,
            text,
            intent,
            at: Utc::now(),
        });
    }
}

impl Default for ConversationSession {
    fn default() -> Self {
        Self::new()
    }
}
