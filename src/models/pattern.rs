use super::{FeedbackSeverity, FeedbackType};
use serde::{Deserialize, Serialize};

/// Discriminant of a [`Pattern`], used for tags and output labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternKind {
    TimeBased,
    TypeBased,
    MetricBased,
}

impl PatternKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternKind::TimeBased => "time_based",
            PatternKind::TypeBased => "type_based",
            PatternKind::MetricBased => "metric_based",
        }
    }
}

impl std::fmt::Display for PatternKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// A recurring regularity found in a feedback set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Pattern {
    /// Feedback clusters around an hour of the day (UTC)
    TimeBased { hour: u8, count: usize },
    /// One feedback type dominates
    TypeBased {
        feedback_type: FeedbackType,
        count: usize,
        main_severity: FeedbackSeverity,
    },
    /// A metric has values above the IQR upper fence
    MetricBased {
        metric_name: String,
        avg_value: f64,
        max_value: f64,
        min_value: f64,
        anomaly_count: usize,
        anomaly_threshold: f64,
    },
}

impl Pattern {
    #[must_use]
    pub fn kind(&self) -> PatternKind {
        match self {
            Pattern::TimeBased { .. } => PatternKind::TimeBased,
            Pattern::TypeBased { .. } => PatternKind::TypeBased,
            Pattern::MetricBased { .. } => PatternKind::MetricBased,
        }
    }

    /// Occurrence count, for patterns that have one
    #[must_use]
    pub fn count(&self) -> Option<usize> {
        match self {
            Pattern::TimeBased { count, .. } | Pattern::TypeBased { count, .. } => Some(*count),
            Pattern::MetricBased { .. } => None,
        }
    }

    #[must_use]
    pub fn anomaly_count(&self) -> Option<usize> {
        match self {
            Pattern::MetricBased { anomaly_count, .. } => Some(*anomaly_count),
            _ => None,
        }
    }

    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Pattern::TimeBased { hour, count } => {
                format!("Feedback is frequently reported around {hour:02}:00 UTC ({count} occurrences)")
            }
            Pattern::TypeBased {
                feedback_type,
                main_severity,
                ..
            } => format!(
                "{feedback_type} feedback occurs frequently, mostly with {main_severity} severity"
            ),
            Pattern::MetricBased {
                metric_name,
                avg_value,
                anomaly_count,
                anomaly_threshold,
                ..
            } => format!(
                "{anomaly_count} anomalies found in metric {metric_name} \
                 (threshold: {anomaly_threshold:.2}, average: {avg_value:.2})"
            ),
        }
    }
}

/// A pattern paired with the weight it was ranked by
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightedPattern {
    #[serde(flatten)]
    pub pattern: Pattern,
    pub weight: f64,
}
