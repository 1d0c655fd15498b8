//! Data models for feedback, improvement suggestions, and detected patterns

mod feedback;
mod improvement;
mod pattern;

pub use feedback::{Feedback, FeedbackSeverity, FeedbackStatus, FeedbackType, MetricValue};
pub use improvement::{ImprovementStatus, ImprovementSuggestion, ImprovementType};
pub(crate) use improvement::clamp_unit;
pub use pattern::{Pattern, PatternKind, WeightedPattern};
