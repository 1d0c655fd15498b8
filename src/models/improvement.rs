use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::OffsetDateTime;

/// Area an improvement targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImprovementType {
    Performance,
    Resource,
    Reliability,
    Efficiency,
    Strategy,
}

impl ImprovementType {
    pub const ALL: [ImprovementType; 5] = [
        ImprovementType::Performance,
        ImprovementType::Resource,
        ImprovementType::Reliability,
        ImprovementType::Efficiency,
        ImprovementType::Strategy,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ImprovementType::Performance => "performance",
            ImprovementType::Resource => "resource",
            ImprovementType::Reliability => "reliability",
            ImprovementType::Efficiency => "efficiency",
            ImprovementType::Strategy => "strategy",
        }
    }
}

impl std::fmt::Display for ImprovementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Lifecycle of an improvement suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImprovementStatus {
    #[default]
    Proposed,
    UnderReview,
    Approved,
    Implementing,
    Implemented,
    Rejected,
}

impl ImprovementStatus {
    pub const ALL: [ImprovementStatus; 6] = [
        ImprovementStatus::Proposed,
        ImprovementStatus::UnderReview,
        ImprovementStatus::Approved,
        ImprovementStatus::Implementing,
        ImprovementStatus::Implemented,
        ImprovementStatus::Rejected,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ImprovementStatus::Proposed => "proposed",
            ImprovementStatus::UnderReview => "under_review",
            ImprovementStatus::Approved => "approved",
            ImprovementStatus::Implementing => "implementing",
            ImprovementStatus::Implemented => "implemented",
            ImprovementStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for ImprovementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for ImprovementStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.to_ascii_lowercase().replace('-', "_");
        ImprovementStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == label)
            .ok_or_else(|| format!("unknown improvement status '{s}'"))
    }
}

/// A proposed improvement derived from feedback patterns
///
/// `priority` is always kept within `0.0..=1.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImprovementSuggestion {
    pub id: String,
    #[serde(rename = "type")]
    pub improvement_type: ImprovementType,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub status: ImprovementStatus,
    pub priority: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(default)]
    pub related_feedbacks: Vec<String>,
    #[serde(default)]
    pub metrics: BTreeMap<String, f64>,
    #[serde(default)]
    pub expected_benefits: BTreeMap<String, f64>,
    #[serde(default)]
    pub implementation_cost: BTreeMap<String, f64>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ImprovementSuggestion {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        improvement_type: ImprovementType,
        title: impl Into<String>,
        description: impl Into<String>,
        priority: f64,
    ) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: id.into(),
            improvement_type,
            title: title.into(),
            description: description.into(),
            status: ImprovementStatus::Proposed,
            priority: clamp_unit(priority),
            created_at: now,
            updated_at: now,
            related_feedbacks: Vec::new(),
            metrics: BTreeMap::new(),
            expected_benefits: BTreeMap::new(),
            implementation_cost: BTreeMap::new(),
            tags: Vec::new(),
        }
    }

    pub fn update_status(&mut self, new_status: ImprovementStatus) {
        self.status = new_status;
        self.touch();
    }

    pub fn update_priority(&mut self, new_priority: f64) {
        self.priority = clamp_unit(new_priority);
        self.touch();
    }

    pub fn add_related_feedback(&mut self, feedback_id: impl Into<String>) {
        let feedback_id = feedback_id.into();
        if !self.related_feedbacks.contains(&feedback_id) {
            self.related_feedbacks.push(feedback_id);
            self.touch();
        }
    }

    pub fn update_metrics(&mut self, metrics: impl IntoIterator<Item = (String, f64)>) {
        self.metrics.extend(metrics);
        self.touch();
    }

    pub fn update_expected_benefits(&mut self, benefits: impl IntoIterator<Item = (String, f64)>) {
        self.expected_benefits.extend(benefits);
        self.touch();
    }

    pub fn update_implementation_cost(&mut self, cost: impl IntoIterator<Item = (String, f64)>) {
        self.implementation_cost.extend(cost);
        self.touch();
    }

    pub fn add_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for tag in tags {
            let tag = tag.into();
            if !self.tags.contains(&tag) {
                self.tags.push(tag);
            }
        }
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = OffsetDateTime::now_utc().max(self.created_at);
    }
}

/// Clamp to `0.0..=1.0`, mapping NaN to 0
pub(crate) fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
