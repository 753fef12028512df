//! Recommendation models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Recommendation priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Weight used for prioritization (high=3, medium=2, low=1)
    pub fn weight(&self) -> f64 {
        match self {
            Priority::High => 3.0,
            Priority::Medium => 2.0,
            Priority::Low => 1.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

/// Concern group a rule belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    Environmental,
    Nutrient,
    Cultivation,
    Harvest,
}

impl RuleCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleCategory::Environmental => "environmental",
            RuleCategory::Nutrient => "nutrient",
            RuleCategory::Cultivation => "cultivation",
            RuleCategory::Harvest => "harvest",
        }
    }
}

/// One concrete step inside a recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedAction {
    /// Parameter the action targets (e.g. "vpd_kpa", "temperature_c")
    pub parameter: String,
    /// What to do with it (e.g. "raise", "lower", "hold")
    pub directive: String,
    /// Current measured value, when one was available
    pub current_value: Option<f64>,
    pub target_min: f64,
    pub target_max: f64,
    pub expected_benefit: String,
}

/// A prioritized, confidence-scored suggested action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: Uuid,
    pub category: RuleCategory,
    /// Name of the rule that produced this recommendation
    pub rule: String,
    pub priority: Priority,
    pub title: String,
    pub description: String,
    pub actions: Vec<RecommendedAction>,
    pub confidence: f64,
    pub reasoning: String,
    pub expected_benefit: String,
}

/// Result of one `RecommendationEngine::generate` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationSet {
    pub plant_id: Uuid,
    pub recommendations: Vec<Recommendation>,
    pub last_updated: DateTime<Utc>,
    pub total_recommendations: usize,
    /// Unweighted mean of the surfaced recommendations' confidences
    /// (0 when none surfaced)
    pub confidence: f64,
}
