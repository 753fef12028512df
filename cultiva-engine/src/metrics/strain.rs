//! Strain classification and growing-medium normalization
//!
//! Keyword-matching classifiers with fixed defaults. Matching is
//! case-insensitive and order-independent over each keyword set; class
//! precedence is fixed (auto > indica > sativa) so a label naming several
//! classes always resolves the same way.

use serde::{Deserialize, Serialize};

/// Broad strain class used for yield base lookup and range adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrainClass {
    Indica,
    Sativa,
    Hybrid,
    Auto,
}

impl StrainClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrainClass::Indica => "indica",
            StrainClass::Sativa => "sativa",
            StrainClass::Hybrid => "hybrid",
            StrainClass::Auto => "auto",
        }
    }
}

/// Normalized growing medium
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Medium {
    Soil,
    Coco,
    Hydro,
}

impl Medium {
    pub fn as_str(&self) -> &'static str {
        match self {
            Medium::Soil => "soil",
            Medium::Coco => "coco",
            Medium::Hydro => "hydro",
        }
    }
}

/// Fixed optimal-range offsets per strain class. Adding a class means
/// adding a row here, not new branching.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrainAdjust {
    pub temperature_offset_c: f64,
    pub humidity_offset_pct: f64,
    pub vpd_offset_kpa: f64,
}

const AUTO_KEYWORDS: &[&str] = &["auto", "automatic", "ruderalis"];
const INDICA_KEYWORDS: &[&str] = &["indica", "kush", "afghan", "hashplant", "northern"];
const SATIVA_KEYWORDS: &[&str] = &["sativa", "haze", "thai", "durban", "jack"];

/// Classify a strain label into its broad class. Unmatched labels default
/// to `Hybrid`.
pub fn classify_strain(label: &str) -> StrainClass {
    let label = label.to_lowercase();
    if AUTO_KEYWORDS.iter().any(|k| label.contains(k)) {
        return StrainClass::Auto;
    }
    if INDICA_KEYWORDS.iter().any(|k| label.contains(k)) {
        return StrainClass::Indica;
    }
    if SATIVA_KEYWORDS.iter().any(|k| label.contains(k)) {
        return StrainClass::Sativa;
    }
    StrainClass::Hybrid
}

const COCO_KEYWORDS: &[&str] = &["coco", "coir"];
const HYDRO_KEYWORDS: &[&str] = &["hydro", "dwc", "nft", "aero", "rockwool"];

/// Normalize a free-text medium label. Unmatched labels default to `Soil`.
pub fn normalize_medium(label: &str) -> Medium {
    let label = label.to_lowercase();
    if COCO_KEYWORDS.iter().any(|k| label.contains(k)) {
        return Medium::Coco;
    }
    if HYDRO_KEYWORDS.iter().any(|k| label.contains(k)) {
        return Medium::Hydro;
    }
    Medium::Soil
}

/// Optimal-range offsets for a strain class.
///
/// Indicas tolerate cooler, drier air; sativas run warmer with a slightly
/// higher transpiration target; autoflowers prefer a gentler climate.
pub fn strain_adjustments(class: StrainClass) -> StrainAdjust {
    match class {
        StrainClass::Indica => StrainAdjust {
            temperature_offset_c: -1.0,
            humidity_offset_pct: -3.0,
            vpd_offset_kpa: -0.1,
        },
        StrainClass::Sativa => StrainAdjust {
            temperature_offset_c: 1.0,
            humidity_offset_pct: 2.0,
            vpd_offset_kpa: 0.1,
        },
        StrainClass::Hybrid => StrainAdjust {
            temperature_offset_c: 0.0,
            humidity_offset_pct: 0.0,
            vpd_offset_kpa: 0.0,
        },
        StrainClass::Auto => StrainAdjust {
            temperature_offset_c: -0.5,
            humidity_offset_pct: 3.0,
            vpd_offset_kpa: -0.05,
        },
    }
}
