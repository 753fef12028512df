//! Database models for the externally-owned cultivation tables

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Plant growth stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthStage {
    Seedling,
    Vegetative,
    Flowering,
    LateFlowering,
    Harvest,
}

impl GrowthStage {
    /// Database/string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            GrowthStage::Seedling => "seedling",
            GrowthStage::Vegetative => "vegetative",
            GrowthStage::Flowering => "flowering",
            GrowthStage::LateFlowering => "late_flowering",
            GrowthStage::Harvest => "harvest",
        }
    }

    /// Parse from the database representation
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "seedling" => Some(GrowthStage::Seedling),
            "vegetative" => Some(GrowthStage::Vegetative),
            "flowering" => Some(GrowthStage::Flowering),
            "late_flowering" => Some(GrowthStage::LateFlowering),
            "harvest" => Some(GrowthStage::Harvest),
            _ => None,
        }
    }

    /// Terminal stages are excluded from scheduled recomputation
    pub fn is_terminal(&self) -> bool {
        matches!(self, GrowthStage::Harvest)
    }
}

/// A cultivated plant. Owned by the external persistence layer; the engine
/// treats rows as read-only input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plant {
    pub id: Uuid,
    pub name: String,
    pub strain: String,
    pub stage: GrowthStage,
    pub medium: String,
    pub tent_id: String,
    pub planted_at: DateTime<Utc>,
    pub stage_started_at: DateTime<Utc>,
    pub archived: bool,
}

impl Plant {
    /// Days spent in the current stage (computed, never stored)
    pub fn days_in_stage(&self, now: DateTime<Utc>) -> i64 {
        (now - self.stage_started_at).num_days().max(0)
    }

    /// Days since planting (computed, never stored)
    pub fn total_days(&self, now: DateTime<Utc>) -> i64 {
        (now - self.planted_at).num_days().max(0)
    }
}

/// One timestamped environment reading for a tent/zone. Reading columns are
/// individually nullable: sensors drop out independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentSample {
    pub id: Uuid,
    pub tent_id: String,
    pub recorded_at: DateTime<Utc>,
    pub temperature_c: Option<f64>,
    pub humidity_pct: Option<f64>,
    pub vpd_kpa: Option<f64>,
    pub co2_ppm: Option<f64>,
    pub ppfd_umol: Option<f64>,
}

/// Discrete cultivation activity type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    Watering,
    Feeding,
    Training,
    Pruning,
    Measurement,
    Transplant,
    Note,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Watering => "watering",
            ActivityType::Feeding => "feeding",
            ActivityType::Training => "training",
            ActivityType::Pruning => "pruning",
            ActivityType::Measurement => "measurement",
            ActivityType::Transplant => "transplant",
            ActivityType::Note => "note",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "watering" => Some(ActivityType::Watering),
            "feeding" => Some(ActivityType::Feeding),
            "training" => Some(ActivityType::Training),
            "pruning" => Some(ActivityType::Pruning),
            "measurement" => Some(ActivityType::Measurement),
            "transplant" => Some(ActivityType::Transplant),
            "note" => Some(ActivityType::Note),
            _ => None,
        }
    }
}

/// One append-only activity log entry for a plant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    pub id: Uuid,
    pub plant_id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub activity: ActivityType,
    /// Numeric payload, e.g. measured height in cm for `Measurement`
    pub value: Option<f64>,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_roundtrip() {
        for stage in [
            GrowthStage::Seedling,
            GrowthStage::Vegetative,
            GrowthStage::Flowering,
            GrowthStage::LateFlowering,
            GrowthStage::Harvest,
        ] {
            assert_eq!(GrowthStage::parse(stage.as_str()), Some(stage));
        }
        assert_eq!(GrowthStage::parse("germinating"), None);
    }

    #[test]
    fn test_only_harvest_is_terminal() {
        assert!(GrowthStage::Harvest.is_terminal());
        assert!(!GrowthStage::LateFlowering.is_terminal());
        assert!(!GrowthStage::Seedling.is_terminal());
    }

    #[test]
    fn test_plant_derived_days() {
        let now = chrono::Utc::now();
        let plant = Plant {
            id: Uuid::new_v4(),
            name: "Test".to_string(),
            strain: "Northern Lights".to_string(),
            stage: GrowthStage::Vegetative,
            medium: "soil".to_string(),
            tent_id: "tent-1".to_string(),
            planted_at: now - chrono::Duration::days(40),
            stage_started_at: now - chrono::Duration::days(12),
            archived: false,
        };
        assert_eq!(plant.days_in_stage(now), 12);
        assert_eq!(plant.total_days(now), 40);
    }
}
