//! Priority scoring for improvement suggestions

use crate::config::PriorityConfig;
use crate::models::{Feedback, ImprovementSuggestion, clamp_unit};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use time::{Duration, OffsetDateTime};

/// Individual priority components, each in `0..=1`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriorityScores {
    pub base: f64,
    pub severity: f64,
    pub frequency: f64,
    pub impact: f64,
    pub cost: f64,
    pub urgency: f64,
}

/// Computes and orders suggestion priorities
#[derive(Debug, Clone, Default)]
pub struct PriorityManager {
    config: PriorityConfig,
}

impl PriorityManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: PriorityConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &PriorityConfig {
        &self.config
    }

    /// Priority of `suggestion` given the feedback it was derived from
    ///
    /// The type base score and the weighted component sum are averaged, so a
    /// suggestion with no supporting feedback still ranks by its type.
    #[must_use]
    pub fn calculate_priority(&self, suggestion: &ImprovementSuggestion, related: &[Feedback]) -> f64 {
        let scores = self.score_breakdown(suggestion, related);
        let w = &self.config.weights;
        let weighted = scores.severity * w.severity
            + scores.frequency * w.frequency
            + scores.impact * w.impact
            + scores.cost * w.cost
            + scores.urgency * w.urgency;

        clamp_unit((scores.base + weighted) / 2.0)
    }

    #[must_use]
    pub fn score_breakdown(
        &self,
        suggestion: &ImprovementSuggestion,
        related: &[Feedback],
    ) -> PriorityScores {
        let now = OffsetDateTime::now_utc();
        PriorityScores {
            base: self.config.base_score(suggestion.improvement_type),
            severity: severity_score(related),
            frequency: self.frequency_score(related, now),
            impact: impact_score(suggestion),
            cost: cost_score(suggestion),
            urgency: urgency_score(related, now),
        }
    }

    /// Recompute priorities in parallel, store them on the suggestions, and
    /// return the suggestions highest priority first
    ///
    /// Suggestions without an entry in `feedback_map` are scored with no
    /// related feedback.
    #[must_use]
    pub fn sort_suggestions(
        &self,
        mut suggestions: Vec<ImprovementSuggestion>,
        feedback_map: &HashMap<String, Vec<Feedback>>,
    ) -> Vec<ImprovementSuggestion> {
        if suggestions.is_empty() {
            return suggestions;
        }

        let priorities: Vec<f64> = suggestions
            .par_iter()
            .map(|s| {
                let related = feedback_map.get(&s.id).map_or(&[][..], Vec::as_slice);
                self.calculate_priority(s, related)
            })
            .collect();

        for (suggestion, priority) in suggestions.iter_mut().zip(priorities) {
            suggestion.update_priority(priority);
        }
        suggestions.sort_by(|a, b| b.priority.total_cmp(&a.priority));
        suggestions
    }

    #[allow(clippy::cast_precision_loss)]
    fn frequency_score(&self, feedbacks: &[Feedback], now: OffsetDateTime) -> f64 {
        if feedbacks.is_empty() {
            return 0.0;
        }
        let window_days = self.config.frequency_window_days.max(1);
        let cutoff = now - Duration::days(window_days);
        let recent = feedbacks.iter().filter(|f| f.created_at >= cutoff).count();

        let daily_avg = recent as f64 / window_days as f64;
        clamp_unit(daily_avg / 5.0)
    }
}

#[allow(clippy::cast_precision_loss)]
fn severity_score(feedbacks: &[Feedback]) -> f64 {
    if feedbacks.is_empty() {
        return 0.0;
    }
    let total: f64 = feedbacks.iter().map(|f| f.severity.weight()).sum();
    total / feedbacks.len() as f64
}

fn impact_score(suggestion: &ImprovementSuggestion) -> f64 {
    let benefits = &suggestion.expected_benefits;
    if benefits.is_empty() {
        return 0.5;
    }
    let get = |key: &str| benefits.get(key).copied().unwrap_or(0.0);
    clamp_unit(
        get("performance_improvement") * 0.4
            + get("resource_saving") * 0.3
            + get("reliability_improvement") * 0.3,
    )
}

fn cost_score(suggestion: &ImprovementSuggestion) -> f64 {
    let cost = &suggestion.implementation_cost;
    if cost.is_empty() {
        return 0.5;
    }
    let inverse = |key: &str| 1.0 - cost.get(key).copied().unwrap_or(0.5);
    clamp_unit(
        inverse("development_time") * 0.4
            + inverse("resource_requirement") * 0.3
            + inverse("risk_level") * 0.3,
    )
}

/// Recent, severe feedback is urgent; anything a week old or more counts for nothing
#[allow(clippy::cast_precision_loss)]
fn urgency_score(feedbacks: &[Feedback], now: OffsetDateTime) -> f64 {
    if feedbacks.is_empty() {
        return 0.0;
    }
    let total: f64 = feedbacks
        .iter()
        .map(|f| {
            let days_old = (now - f.created_at).whole_days() as f64;
            (1.0 - days_old / 7.0).clamp(0.0, 1.0) * f.severity.weight()
        })
        .sum();
    clamp_unit(total / feedbacks.len() as f64)
}
