//! Tracking the outcome of implemented improvements
//!
//! Two signals are combined: metric deltas measured before and after an
//! implementation, and the shape of the feedback that keeps arriving
//! afterwards (volume trend and severity mix).

use crate::config::TrackerConfig;
use crate::models::{Feedback, FeedbackSeverity, FeedbackType, ImprovementSuggestion, MetricValue};
use crate::services::stats;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use time::OffsetDateTime;

const TREND_SLOPE_EPSILON: f64 = 0.1;
const HIGH_SEVERITY_RATIO_LIMIT: f64 = 0.2;

/// Change of one metric across an implementation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricImprovement {
    pub before: f64,
    pub after: f64,
    /// Relative change toward the metric's good direction; positive is better
    pub improvement_rate: f64,
}

/// Outcome of comparing before/after metrics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImplementationResult {
    pub suggestion_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub improvements: BTreeMap<String, MetricImprovement>,
    pub overall_score: f64,
    pub success: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotKind {
    AfterImplementation,
}

/// Metrics recorded for a suggestion at a point in time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub metrics: BTreeMap<String, MetricValue>,
    pub kind: SnapshotKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    #[default]
    Stable,
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TrendDirection::Increasing => "increasing",
            TrendDirection::Decreasing => "decreasing",
            TrendDirection::Stable => "stable",
        })
    }
}

/// Daily feedback volume trend
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TrendAnalysis {
    pub direction: TrendDirection,
    /// R² of the linear fit
    pub confidence: f64,
    pub slope: f64,
}

/// Feedback received after an implementation, inside the tracking window
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FeedbackChanges {
    pub total_feedbacks: usize,
    pub type_distribution: BTreeMap<FeedbackType, usize>,
    pub severity_distribution: BTreeMap<FeedbackSeverity, usize>,
    /// `YYYY-MM-DD` (UTC) to count
    pub daily_counts: BTreeMap<String, usize>,
    pub trend: TrendAnalysis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuccessEvaluation {
    pub success: bool,
    pub confidence: f64,
    pub reasons: Vec<String>,
    pub description: String,
}

/// Records metric and feedback history per suggestion and judges outcomes
#[derive(Debug, Default)]
pub struct ResultTracker {
    config: TrackerConfig,
    metrics_history: HashMap<String, Vec<MetricsSnapshot>>,
    feedback_history: HashMap<String, Vec<Feedback>>,
}

impl ResultTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: TrackerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Compare metrics before and after implementing `suggestion`
    ///
    /// Only metrics present and numeric on both sides are compared. Only
    /// `after` is appended to the suggestion's metric history.
    pub fn track_implementation(
        &mut self,
        suggestion: &ImprovementSuggestion,
        before: &BTreeMap<String, MetricValue>,
        after: &BTreeMap<String, MetricValue>,
    ) -> ImplementationResult {
        let timestamp = OffsetDateTime::now_utc();
        self.metrics_history
            .entry(suggestion.id.clone())
            .or_default()
            .push(MetricsSnapshot {
                timestamp,
                metrics: after.clone(),
                kind: SnapshotKind::AfterImplementation,
            });

        let improvements: BTreeMap<String, MetricImprovement> = before
            .iter()
            .filter_map(|(name, b)| {
                let b = b.as_f64()?;
                let a = after.get(name)?.as_f64()?;
                Some((
                    name.clone(),
                    MetricImprovement {
                        before: b,
                        after: a,
                        improvement_rate: self.improvement_rate(name, b, a),
                    },
                ))
            })
            .collect();

        let overall_score = Self::overall_score(&improvements);
        let success = overall_score >= self.config.success_threshold;

        log::debug!(
            "Tracked implementation of {}: {} metrics, score {overall_score:.3}",
            suggestion.id,
            improvements.len()
        );

        ImplementationResult {
            suggestion_id: suggestion.id.clone(),
            timestamp,
            improvements,
            overall_score,
            success,
        }
    }

    /// Relative change of a metric; positive means it moved the right way
    #[must_use]
    pub fn improvement_rate(&self, metric: &str, before: f64, after: f64) -> f64 {
        let higher_is_better = self.config.is_higher_better(metric);
        if before == 0.0 {
            let improved = if higher_is_better { after > 0.0 } else { after < 0.0 };
            return if improved { 1.0 } else { 0.0 };
        }
        let delta = if higher_is_better {
            after - before
        } else {
            before - after
        };
        delta / before.abs()
    }

    /// Mean improvement rate after dropping IQR outliers, mapped to `0..=1`
    ///
    /// A mean rate of 0 maps to 0.5, +100% to 1.0 and -100% to 0.0.
    #[must_use]
    pub fn overall_score(improvements: &BTreeMap<String, MetricImprovement>) -> f64 {
        let rates: Vec<f64> = improvements.values().map(|i| i.improvement_rate).collect();
        let Some((low, high)) = stats::iqr_fences(&rates) else {
            return 0.0;
        };
        let kept: Vec<f64> = rates
            .into_iter()
            .filter(|r| *r >= low && *r <= high)
            .collect();
        match stats::mean(&kept) {
            Some(avg) => ((avg + 1.0) / 2.0).clamp(0.0, 1.0),
            None => 0.0,
        }
    }

    /// Summarise feedback received after implementing `suggestion`
    ///
    /// All of `feedbacks` is appended to the history; only items inside the
    /// tracking window are analysed.
    pub fn track_feedback_changes(
        &mut self,
        suggestion: &ImprovementSuggestion,
        feedbacks: &[Feedback],
    ) -> FeedbackChanges {
        self.feedback_history
            .entry(suggestion.id.clone())
            .or_default()
            .extend(feedbacks.iter().cloned());

        let now = OffsetDateTime::now_utc();
        let window = self.config.tracking_window();
        let recent: Vec<&Feedback> = feedbacks
            .iter()
            .filter(|f| now - f.created_at <= window)
            .collect();

        if recent.is_empty() {
            return FeedbackChanges::default();
        }

        let ((type_distribution, severity_distribution), (daily_counts, trend)) = rayon::join(
            || {
                rayon::join(
                    || count_by(&recent, |f| f.feedback_type),
                    || count_by(&recent, |f| f.severity),
                )
            },
            || {
                let daily = count_by(&recent, Feedback::created_day);
                let trend = Self::analyze_trend(&daily);
                (daily, trend)
            },
        );

        FeedbackChanges {
            total_feedbacks: recent.len(),
            type_distribution,
            severity_distribution,
            daily_counts,
            trend,
        }
    }

    /// Linear trend over daily counts in chronological order
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn analyze_trend(daily_counts: &BTreeMap<String, usize>) -> TrendAnalysis {
        let counts: Vec<f64> = daily_counts.values().map(|c| *c as f64).collect();
        let Some(fit) = stats::linear_fit(&counts) else {
            return TrendAnalysis::default();
        };

        let direction = if fit.slope < -TREND_SLOPE_EPSILON {
            TrendDirection::Decreasing
        } else if fit.slope > TREND_SLOPE_EPSILON {
            TrendDirection::Increasing
        } else {
            TrendDirection::Stable
        };

        TrendAnalysis {
            direction,
            confidence: fit.r_squared,
            slope: fit.slope,
        }
    }

    /// Combine metric and feedback signals into a verdict
    ///
    /// Success needs at least two of: metric targets met, decreasing feedback
    /// volume, and under 20% high/critical feedback.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn evaluate_success(
        &self,
        result: &ImplementationResult,
        changes: &FeedbackChanges,
    ) -> SuccessEvaluation {
        let mut indicators = 0_u8;
        let mut confidence = 0.0;
        let mut reasons = Vec::new();

        if result.success {
            indicators += 1;
            confidence += 0.4;
            reasons.push("metric improvement target met".to_string());
        }

        if changes.trend.direction == TrendDirection::Decreasing {
            indicators += 1;
            confidence += 0.3;
            reasons.push("related feedback is decreasing".to_string());
        }

        let total: usize = changes.severity_distribution.values().sum();
        if total > 0 {
            let severe: usize = changes
                .severity_distribution
                .iter()
                .filter(|(sev, _)| **sev >= FeedbackSeverity::High)
                .map(|(_, n)| *n)
                .sum();
            if (severe as f64 / total as f64) < HIGH_SEVERITY_RATIO_LIMIT {
                indicators += 1;
                confidence += 0.3;
                reasons.push("low share of high-severity feedback".to_string());
            }
        }

        let success = indicators >= 2;
        let confidence = f64::min(confidence, 1.0);

        let verdict = if success {
            "success"
        } else if confidence >= 0.5 {
            "partial success"
        } else {
            "needs improvement"
        };
        let mut description = format!("{verdict} (confidence: {confidence:.2})");
        if !reasons.is_empty() {
            description.push_str(&format!("\nreasons: {}", reasons.join(", ")));
        }

        SuccessEvaluation {
            success,
            confidence,
            reasons,
            description,
        }
    }

    /// Recorded metric snapshots, optionally narrowed to one metric
    ///
    /// With a metric name, snapshots that lack it are skipped and the rest
    /// carry only that metric.
    #[must_use]
    pub fn metrics_history(&self, suggestion_id: &str, metric: Option<&str>) -> Vec<MetricsSnapshot> {
        let Some(history) = self.metrics_history.get(suggestion_id) else {
            return Vec::new();
        };
        let Some(name) = metric else {
            return history.clone();
        };
        history
            .iter()
            .filter_map(|snapshot| {
                let value = snapshot.metrics.get(name)?;
                Some(MetricsSnapshot {
                    timestamp: snapshot.timestamp,
                    metrics: BTreeMap::from([(name.to_string(), value.clone())]),
                    kind: snapshot.kind,
                })
            })
            .collect()
    }

    #[must_use]
    pub fn feedback_history(
        &self,
        suggestion_id: &str,
        feedback_type: Option<FeedbackType>,
    ) -> Vec<Feedback> {
        self.feedback_history
            .get(suggestion_id)
            .map(|history| {
                history
                    .iter()
                    .filter(|f| feedback_type.is_none_or(|t| f.feedback_type == t))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn count_by<K: Ord>(feedbacks: &[&Feedback], key: impl Fn(&Feedback) -> K) -> BTreeMap<K, usize> {
    let mut counts = BTreeMap::new();
    for feedback in feedbacks {
        *counts.entry(key(feedback)).or_default() += 1;
    }
    counts
}
