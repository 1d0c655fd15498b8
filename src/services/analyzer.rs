//! Descriptive statistics over a feedback set

use crate::models::{Feedback, FeedbackSeverity, FeedbackStatus, FeedbackType};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use time::{Duration, OffsetDateTime};

/// Count, min, max and mean of one numeric metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricSummary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeedbackAnalysis {
    pub total_count: usize,
    pub type_distribution: BTreeMap<FeedbackType, usize>,
    pub severity_distribution: BTreeMap<FeedbackSeverity, usize>,
    pub status_distribution: BTreeMap<FeedbackStatus, usize>,
    /// Most common first; equal counts keep first-seen order
    pub common_tags: Vec<(String, usize)>,
    pub metrics_summary: BTreeMap<String, MetricSummary>,
    /// `YYYY-MM-DD` (UTC) to count
    pub daily_counts: BTreeMap<String, usize>,
    /// Percentage of the analysed feedback that is resolved
    pub resolution_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeedbackSummary {
    pub total_count: usize,
    pub type_distribution: BTreeMap<FeedbackType, usize>,
    pub severity_distribution: BTreeMap<FeedbackSeverity, usize>,
    pub status_distribution: BTreeMap<FeedbackStatus, usize>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FeedbackAnalyzer;

impl FeedbackAnalyzer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Full breakdown, optionally restricted to feedback newer than `window`
    #[must_use]
    pub fn analyze_feedbacks(&self, feedbacks: &[Feedback], window: Option<Duration>) -> FeedbackAnalysis {
        let selected: Vec<&Feedback> = match window {
            Some(window) => {
                let cutoff = OffsetDateTime::now_utc() - window;
                feedbacks.iter().filter(|f| f.created_at >= cutoff).collect()
            }
            None => feedbacks.iter().collect(),
        };

        let mut analysis = FeedbackAnalysis {
            total_count: selected.len(),
            ..FeedbackAnalysis::default()
        };

        for feedback in &selected {
            *analysis
                .type_distribution
                .entry(feedback.feedback_type)
                .or_default() += 1;
            *analysis
                .severity_distribution
                .entry(feedback.severity)
                .or_default() += 1;
            *analysis
                .status_distribution
                .entry(feedback.status)
                .or_default() += 1;

            *analysis
                .daily_counts
                .entry(feedback.created_day())
                .or_default() += 1;
        }

        analysis.resolution_rate = resolved_percentage(&selected);
        analysis.common_tags = tag_counts(&selected);
        analysis.metrics_summary = summarize_metrics(&selected);
        analysis
    }

    #[must_use]
    pub fn critical_feedbacks<'a>(&self, feedbacks: &'a [Feedback]) -> Vec<&'a Feedback> {
        feedbacks
            .iter()
            .filter(|f| f.severity == FeedbackSeverity::Critical)
            .collect()
    }

    /// Tags seen at least `min_occurrence` times within `window`
    #[must_use]
    pub fn trending_issues(
        &self,
        feedbacks: &[Feedback],
        window: Duration,
        min_occurrence: usize,
    ) -> Vec<(String, usize)> {
        let cutoff = OffsetDateTime::now_utc() - window;
        let recent: Vec<&Feedback> = feedbacks.iter().filter(|f| f.created_at >= cutoff).collect();
        tag_counts(&recent)
            .into_iter()
            .filter(|(_, count)| *count >= min_occurrence)
            .collect()
    }

    /// Metric summary over performance feedback only
    #[must_use]
    pub fn performance_metrics(&self, feedbacks: &[Feedback]) -> BTreeMap<String, MetricSummary> {
        let performance: Vec<&Feedback> = feedbacks
            .iter()
            .filter(|f| f.feedback_type == FeedbackType::Performance)
            .collect();
        summarize_metrics(&performance)
    }

    #[must_use]
    pub fn feedback_summary(&self, feedbacks: &[Feedback]) -> FeedbackSummary {
        let mut summary = FeedbackSummary {
            total_count: feedbacks.len(),
            ..FeedbackSummary::default()
        };
        for feedback in feedbacks {
            *summary
                .type_distribution
                .entry(feedback.feedback_type)
                .or_default() += 1;
            *summary
                .severity_distribution
                .entry(feedback.severity)
                .or_default() += 1;
            *summary
                .status_distribution
                .entry(feedback.status)
                .or_default() += 1;
        }
        summary
    }

    /// Percentage of implemented or closed feedback; 0 for an empty set
    #[must_use]
    pub fn resolution_rate(&self, feedbacks: &[Feedback]) -> f64 {
        resolved_percentage(&feedbacks.iter().collect::<Vec<_>>())
    }
}

#[allow(clippy::cast_precision_loss)]
fn resolved_percentage(feedbacks: &[&Feedback]) -> f64 {
    if feedbacks.is_empty() {
        return 0.0;
    }
    let resolved = feedbacks.iter().filter(|f| f.status.is_resolved()).count();
    resolved as f64 / feedbacks.len() as f64 * 100.0
}

fn tag_counts(feedbacks: &[&Feedback]) -> Vec<(String, usize)> {
    let mut first_seen: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for tag in feedbacks.iter().flat_map(|f| f.tags.iter()) {
        let count = counts.entry(tag.as_str()).or_insert_with(|| {
            first_seen.push(tag.as_str());
            0
        });
        *count += 1;
    }

    let mut ranked: Vec<(String, usize)> = first_seen
        .into_iter()
        .map(|tag| (tag.to_string(), counts[tag]))
        .collect();
    // stable sort keeps first-seen order among ties
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

#[allow(clippy::cast_precision_loss)]
fn summarize_metrics(feedbacks: &[&Feedback]) -> BTreeMap<String, MetricSummary> {
    let mut values: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for feedback in feedbacks {
        for (name, value) in feedback.numeric_metrics() {
            values.entry(name).or_default().push(value);
        }
    }

    values
        .into_iter()
        .map(|(name, vals)| {
            let min = vals.iter().copied().fold(f64::INFINITY, f64::min);
            let max = vals.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let avg = vals.iter().sum::<f64>() / vals.len() as f64;
            (
                name.to_string(),
                MetricSummary {
                    count: vals.len(),
                    min,
                    max,
                    avg,
                },
            )
        })
        .collect()
}
