//! Improvement suggestions derived from feedback patterns
//!
//! The suggester owns a pattern matcher, a priority manager and a result
//! tracker, and keeps every suggestion it has produced so that status changes
//! and implementation outcomes can be recorded against it later.

use crate::config::Config;
use crate::models::{
    Feedback, ImprovementStatus, ImprovementSuggestion, ImprovementType, MetricValue, Pattern,
};
use crate::services::pattern_matcher::PatternMatcher;
use crate::services::priority_manager::PriorityManager;
use crate::services::result_tracker::{
    FeedbackChanges, ImplementationResult, MetricsSnapshot, ResultTracker, SuccessEvaluation,
};
use crate::{Error, Result};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Everything learned from one implementation of a suggestion
#[derive(Debug, Clone, Serialize)]
pub struct TrackingReport {
    pub suggestion_id: String,
    pub implementation_result: ImplementationResult,
    pub feedback_changes: FeedbackChanges,
    pub evaluation: SuccessEvaluation,
}

#[derive(Debug, Default)]
pub struct ImprovementSuggester {
    pattern_matcher: PatternMatcher,
    priority_manager: PriorityManager,
    result_tracker: ResultTracker,
    suggestions: HashMap<String, ImprovementSuggestion>,
    /// Insertion order of `suggestions`
    order: Vec<String>,
    feedback_map: HashMap<String, Vec<String>>,
}

impl ImprovementSuggester {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: &Config) -> Self {
        Self {
            pattern_matcher: PatternMatcher::with_config(config.pattern.clone()),
            priority_manager: PriorityManager::with_config(config.priority.clone()),
            result_tracker: ResultTracker::with_config(config.tracker.clone()),
            ..Self::default()
        }
    }

    /// Create one suggestion per detected pattern, highest priority first
    ///
    /// Every input feedback is recorded as related to each new suggestion.
    pub fn analyze_feedbacks(&mut self, feedbacks: &[Feedback]) -> Vec<ImprovementSuggestion> {
        let patterns = self.pattern_matcher.find_patterns(feedbacks);
        if patterns.is_empty() {
            return Vec::new();
        }

        let feedback_ids: Vec<String> = feedbacks.iter().map(|f| f.id.clone()).collect();
        let mut created = Vec::with_capacity(patterns.len());
        let mut feedback_map = HashMap::with_capacity(patterns.len());

        for pattern in &patterns {
            let (improvement_type, confidence) =
                self.pattern_matcher.suggest_improvement_type(pattern);
            let significance = self.pattern_matcher.pattern_significance(pattern);
            let suggestion = build_suggestion(
                improvement_type,
                pattern,
                confidence,
                significance,
                &feedback_ids,
            );
            feedback_map.insert(suggestion.id.clone(), feedbacks.to_vec());
            created.push(suggestion);
        }

        let sorted = self.priority_manager.sort_suggestions(created, &feedback_map);
        for suggestion in &sorted {
            self.feedback_map
                .insert(suggestion.id.clone(), feedback_ids.clone());
            self.order.push(suggestion.id.clone());
            self.suggestions
                .insert(suggestion.id.clone(), suggestion.clone());
        }

        log::debug!(
            "Created {} suggestions from {} patterns",
            sorted.len(),
            patterns.len()
        );
        sorted
    }

    #[must_use]
    pub fn get_suggestion(&self, suggestion_id: &str) -> Option<&ImprovementSuggestion> {
        self.suggestions.get(suggestion_id)
    }

    /// Suggestions in creation order, optionally filtered by status
    #[must_use]
    pub fn all_suggestions(&self, status: Option<ImprovementStatus>) -> Vec<&ImprovementSuggestion> {
        self.order
            .iter()
            .filter_map(|id| self.suggestions.get(id))
            .filter(|s| status.is_none_or(|st| s.status == st))
            .collect()
    }

    /// Returns false when no suggestion has this id
    pub fn update_suggestion_status(&mut self, suggestion_id: &str, status: ImprovementStatus) -> bool {
        match self.suggestions.get_mut(suggestion_id) {
            Some(suggestion) => {
                suggestion.update_status(status);
                true
            }
            None => false,
        }
    }

    /// Record before/after metrics and follow-up feedback for a suggestion
    ///
    /// # Errors
    /// `Error::NotFound` if no suggestion has this id
    pub fn track_implementation_result(
        &mut self,
        suggestion_id: &str,
        before: &BTreeMap<String, MetricValue>,
        after: &BTreeMap<String, MetricValue>,
        new_feedbacks: &[Feedback],
    ) -> Result<TrackingReport> {
        let suggestion = self
            .suggestions
            .get(suggestion_id)
            .ok_or_else(|| Error::NotFound(format!("suggestion {suggestion_id}")))?;

        let implementation_result = self
            .result_tracker
            .track_implementation(suggestion, before, after);
        let feedback_changes = self
            .result_tracker
            .track_feedback_changes(suggestion, new_feedbacks);
        let evaluation = self
            .result_tracker
            .evaluate_success(&implementation_result, &feedback_changes);

        log::info!("Implementation of {suggestion_id}: {}", evaluation.description);

        Ok(TrackingReport {
            suggestion_id: suggestion_id.to_string(),
            implementation_result,
            feedback_changes,
            evaluation,
        })
    }

    /// Metric snapshots and follow-up feedback recorded for a suggestion
    #[must_use]
    pub fn implementation_history(&self, suggestion_id: &str) -> (Vec<MetricsSnapshot>, Vec<Feedback>) {
        (
            self.result_tracker.metrics_history(suggestion_id, None),
            self.result_tracker.feedback_history(suggestion_id, None),
        )
    }

    #[must_use]
    pub fn related_feedback_ids(&self, suggestion_id: &str) -> &[String] {
        self.feedback_map
            .get(suggestion_id)
            .map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn pattern_matcher(&self) -> &PatternMatcher {
        &self.pattern_matcher
    }

    #[must_use]
    pub fn result_tracker(&self) -> &ResultTracker {
        &self.result_tracker
    }
}

fn build_suggestion(
    improvement_type: ImprovementType,
    pattern: &Pattern,
    confidence: f64,
    significance: f64,
    related: &[String],
) -> ImprovementSuggestion {
    let id = format!("imp-{:08x}", rand::random::<u32>());

    let title = match pattern {
        Pattern::MetricBased { metric_name, .. } => format!("{metric_name} metric needs improvement"),
        Pattern::TypeBased { feedback_type, .. } => format!("{feedback_type} issues need improvement"),
        Pattern::TimeBased { .. } => format!("{improvement_type} improvement needed"),
    };

    let mut description = format!("Pattern analysis: {}\n", pattern.description());
    if let Some(count) = pattern.count() {
        description.push_str(&format!("Occurrences: {count}\n"));
    }
    if let Some(anomalies) = pattern.anomaly_count() {
        description.push_str(&format!("Anomalies: {anomalies}\n"));
    }

    let mut suggestion =
        ImprovementSuggestion::new(id, improvement_type, title, description, significance);

    for feedback_id in related {
        suggestion.add_related_feedback(feedback_id.as_str());
    }

    if let Pattern::MetricBased {
        avg_value,
        max_value,
        min_value,
        anomaly_threshold,
        ..
    } = pattern
    {
        suggestion.update_metrics([
            ("avg_value".to_string(), *avg_value),
            ("max_value".to_string(), *max_value),
            ("min_value".to_string(), *min_value),
            ("anomaly_threshold".to_string(), *anomaly_threshold),
        ]);
    }

    let mut benefits = vec![
        ("confidence".to_string(), confidence),
        ("significance".to_string(), significance),
    ];
    match improvement_type {
        ImprovementType::Performance => benefits.push(("performance_improvement".to_string(), 0.3)),
        ImprovementType::Resource => benefits.push(("resource_saving".to_string(), 0.25)),
        ImprovementType::Reliability => benefits.push(("reliability_improvement".to_string(), 0.4)),
        ImprovementType::Efficiency | ImprovementType::Strategy => {}
    }
    suggestion.update_expected_benefits(benefits);

    suggestion.update_implementation_cost([
        ("development_time".to_string(), 0.5),
        ("resource_requirement".to_string(), 0.3),
        ("risk_level".to_string(), 0.2),
    ]);

    suggestion.add_tags([improvement_type.as_str(), pattern.kind().as_str()]);
    suggestion
}
