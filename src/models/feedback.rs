use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

/// Category of a feedback item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackType {
    Execution,
    Performance,
    Usability,
    Error,
    Suggestion,
    Resource,
    Other,
}

impl FeedbackType {
    pub const ALL: [FeedbackType; 7] = [
        FeedbackType::Execution,
        FeedbackType::Performance,
        FeedbackType::Usability,
        FeedbackType::Error,
        FeedbackType::Suggestion,
        FeedbackType::Resource,
        FeedbackType::Other,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackType::Execution => "execution",
            FeedbackType::Performance => "performance",
            FeedbackType::Usability => "usability",
            FeedbackType::Error => "error",
            FeedbackType::Suggestion => "suggestion",
            FeedbackType::Resource => "resource",
            FeedbackType::Other => "other",
        }
    }
}

impl std::fmt::Display for FeedbackType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for FeedbackType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.to_ascii_lowercase();
        FeedbackType::ALL
            .into_iter()
            .find(|t| t.as_str() == label)
            .ok_or_else(|| format!("unknown feedback type '{s}'"))
    }
}

/// Severity of a feedback item, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl FeedbackSeverity {
    pub const ALL: [FeedbackSeverity; 4] = [
        FeedbackSeverity::Low,
        FeedbackSeverity::Medium,
        FeedbackSeverity::High,
        FeedbackSeverity::Critical,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackSeverity::Low => "low",
            FeedbackSeverity::Medium => "medium",
            FeedbackSeverity::High => "high",
            FeedbackSeverity::Critical => "critical",
        }
    }

    /// Weight used by severity and urgency scoring
    #[must_use]
    pub fn weight(&self) -> f64 {
        match self {
            FeedbackSeverity::Low => 0.2,
            FeedbackSeverity::Medium => 0.5,
            FeedbackSeverity::High => 0.8,
            FeedbackSeverity::Critical => 1.0,
        }
    }

    /// Bonus added to pattern weight/significance for a dominant severity
    #[must_use]
    pub fn pattern_bonus(&self) -> f64 {
        match self {
            FeedbackSeverity::Low => 0.0,
            FeedbackSeverity::Medium => 0.1,
            FeedbackSeverity::High => 0.2,
            FeedbackSeverity::Critical => 0.3,
        }
    }
}

impl std::fmt::Display for FeedbackSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for FeedbackSeverity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.to_ascii_lowercase();
        FeedbackSeverity::ALL
            .into_iter()
            .find(|sev| sev.as_str() == label)
            .ok_or_else(|| format!("unknown severity '{s}'"))
    }
}

/// Review lifecycle of a feedback item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackStatus {
    #[default]
    New,
    InReview,
    Accepted,
    Rejected,
    Implemented,
    Closed,
}

impl FeedbackStatus {
    pub const ALL: [FeedbackStatus; 6] = [
        FeedbackStatus::New,
        FeedbackStatus::InReview,
        FeedbackStatus::Accepted,
        FeedbackStatus::Rejected,
        FeedbackStatus::Implemented,
        FeedbackStatus::Closed,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackStatus::New => "new",
            FeedbackStatus::InReview => "in_review",
            FeedbackStatus::Accepted => "accepted",
            FeedbackStatus::Rejected => "rejected",
            FeedbackStatus::Implemented => "implemented",
            FeedbackStatus::Closed => "closed",
        }
    }

    /// Whether the feedback counts as resolved
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self, FeedbackStatus::Implemented | FeedbackStatus::Closed)
    }
}

impl std::fmt::Display for FeedbackStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for FeedbackStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.to_ascii_lowercase().replace('-', "_");
        FeedbackStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == label)
            .ok_or_else(|| format!("unknown status '{s}'"))
    }
}

/// A metric attached to feedback; only numeric values feed the statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl MetricValue {
    /// Numeric view of the value, `None` for text
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Int(v) => Some(*v as f64),
            MetricValue::Float(v) => Some(*v),
            MetricValue::Text(_) => None,
        }
    }

    /// Parse a CLI value: integer, then float, then plain text
    ///
    /// Words such as `NaN` or `inf` stay text; only finite floats become
    /// `Float`.
    #[must_use]
    pub fn parse_lossy(raw: &str) -> Self {
        if let Ok(v) = raw.parse::<i64>() {
            MetricValue::Int(v)
        } else if let Some(v) = raw.parse::<f64>().ok().filter(|v| v.is_finite()) {
            MetricValue::Float(v)
        } else {
            MetricValue::Text(raw.to_string())
        }
    }

    /// `false` only for NaN or infinite floats, which JSON cannot carry
    #[must_use]
    pub fn is_finite(&self) -> bool {
        match self {
            MetricValue::Float(v) => v.is_finite(),
            MetricValue::Int(_) | MetricValue::Text(_) => true,
        }
    }
}

impl std::fmt::Display for MetricValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricValue::Int(v) => write!(f, "{v}"),
            MetricValue::Float(v) => write!(f, "{v}"),
            MetricValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<i64> for MetricValue {
    fn from(v: i64) -> Self {
        MetricValue::Int(v)
    }
}

impl From<f64> for MetricValue {
    fn from(v: f64) -> Self {
        MetricValue::Float(v)
    }
}

impl From<&str> for MetricValue {
    fn from(v: &str) -> Self {
        MetricValue::Text(v.to_string())
    }
}

impl From<String> for MetricValue {
    fn from(v: String) -> Self {
        MetricValue::Text(v)
    }
}

/// A single feedback item reported against a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub id: String,
    pub plan_id: String,
    #[serde(rename = "type")]
    pub feedback_type: FeedbackType,
    pub severity: FeedbackSeverity,
    #[serde(default)]
    pub status: FeedbackStatus,
    pub title: String,
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(default)]
    pub step_index: Option<u32>,
    #[serde(default)]
    pub metrics: BTreeMap<String, MetricValue>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Feedback {
    /// Create feedback in status `New`, timestamped now
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        plan_id: impl Into<String>,
        feedback_type: FeedbackType,
        severity: FeedbackSeverity,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: id.into(),
            plan_id: plan_id.into(),
            feedback_type,
            severity,
            status: FeedbackStatus::New,
            title: title.into(),
            description: description.into(),
            created_at: now,
            updated_at: now,
            step_index: None,
            metrics: BTreeMap::new(),
            tags: Vec::new(),
        }
    }

    /// Override both timestamps, mostly for backfilled or imported feedback
    #[must_use]
    pub fn created_at(mut self, at: OffsetDateTime) -> Self {
        self.created_at = at;
        self.updated_at = at;
        self
    }

    pub fn update_status(&mut self, new_status: FeedbackStatus) {
        self.status = new_status;
        self.touch();
    }

    pub fn add_metric(&mut self, key: impl Into<String>, value: impl Into<MetricValue>) {
        self.metrics.insert(key.into(), value.into());
        self.touch();
    }

    /// Add a tag; duplicates are ignored and leave `updated_at` untouched
    pub fn add_tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
            self.touch();
        }
    }

    /// Name of the first metric holding a NaN or infinite value
    #[must_use]
    pub fn non_finite_metric(&self) -> Option<&str> {
        self.metrics
            .iter()
            .find(|(_, v)| !v.is_finite())
            .map(|(k, _)| k.as_str())
    }

    /// UTC calendar day of `created_at` as `YYYY-MM-DD`
    #[must_use]
    pub fn created_day(&self) -> String {
        self.created_at
            .to_offset(UtcOffset::UTC)
            .date()
            .format(format_description!("[year]-[month]-[day]"))
            .unwrap_or_default()
    }

    /// Numeric metrics only
    pub fn numeric_metrics(&self) -> impl Iterator<Item = (&str, f64)> {
        self.metrics
            .iter()
            .filter_map(|(k, v)| v.as_f64().map(|n| (k.as_str(), n)))
    }

    fn touch(&mut self) {
        self.updated_at = OffsetDateTime::now_utc().max(self.created_at);
    }
}
