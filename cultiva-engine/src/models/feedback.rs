//! Feedback and recommendation history models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Recommendation;

/// Reported effectiveness of an implemented recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effectiveness {
    Positive,
    Neutral,
    Negative,
}

impl Effectiveness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Effectiveness::Positive => "positive",
            Effectiveness::Neutral => "neutral",
            Effectiveness::Negative => "negative",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "positive" => Some(Effectiveness::Positive),
            "neutral" => Some(Effectiveness::Neutral),
            "negative" => Some(Effectiveness::Negative),
            _ => None,
        }
    }
}

/// Caller-submitted feedback for one recommendation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackSubmission {
    pub implemented: bool,
    /// Required when `implemented` is true
    pub effectiveness: Option<Effectiveness>,
    pub notes: Option<String>,
    /// Free-form outcome payload (e.g. measured results after the change)
    pub outcome: Option<serde_json::Value>,
}

/// Durable record linking a recommendation snapshot to its feedback.
/// One row per recommendation id: created on first feedback, updated after.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationHistoryEntry {
    pub recommendation_id: Uuid,
    pub plant_id: Uuid,
    pub recommendation: Recommendation,
    pub implemented: bool,
    pub effectiveness: Option<Effectiveness>,
    pub notes: Option<String>,
    pub outcome: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Aggregated feedback statistics for a plant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeedbackStats {
    pub total: i64,
    pub implemented: i64,
    pub positive: i64,
    pub neutral: i64,
    pub negative: i64,
    /// implemented / total, 0 when no feedback exists
    pub implementation_rate: f64,
}
