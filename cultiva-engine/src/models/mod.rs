//! Domain models owned by the analytics engine

mod analytics;
mod feedback;
mod recommendation;

pub use analytics::{
    AnalyticsRecord, EmbeddedRecommendation, EnvironmentalEfficiency, NewAnalyticsRecord,
    TrendPoint, TrendSeries,
};
pub use feedback::{Effectiveness, FeedbackStats, FeedbackSubmission, RecommendationHistoryEntry};
pub use recommendation::{
    Priority, Recommendation, RecommendationSet, RecommendedAction, RuleCategory,
};
