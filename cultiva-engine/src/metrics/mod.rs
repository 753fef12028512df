//! Metric library: pure, stateless functions computing derived quantities
//! from raw cultivation data. No I/O here; every function is independently
//! testable.

pub mod efficiency;
pub mod growth;
pub mod strain;
pub mod yield_model;

pub use efficiency::{stage_efficiency, Dimension, EnvironmentReading, RangeSpec};
pub use growth::{growth_rate, stage_default, HeightMeasurement};
pub use strain::{classify_strain, normalize_medium, strain_adjustments, Medium, StrainAdjust, StrainClass};
pub use yield_model::{base_yield, care_multiplier, stage_multiplier, yield_prediction};
