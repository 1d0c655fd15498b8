//! In-memory feedback collection

use crate::models::{
    Feedback, FeedbackSeverity, FeedbackStatus, FeedbackType, MetricValue,
};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

/// Input for [`FeedbackCollector::create_feedback`]
#[derive(Debug, Clone)]
pub struct NewFeedback {
    pub plan_id: String,
    pub feedback_type: FeedbackType,
    pub severity: FeedbackSeverity,
    pub title: String,
    pub description: String,
    pub step_index: Option<u32>,
    pub metrics: BTreeMap<String, MetricValue>,
    pub tags: Vec<String>,
}

impl NewFeedback {
    #[must_use]
    pub fn new(
        plan_id: impl Into<String>,
        feedback_type: FeedbackType,
        severity: FeedbackSeverity,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            plan_id: plan_id.into(),
            feedback_type,
            severity,
            title: title.into(),
            description: description.into(),
            step_index: None,
            metrics: BTreeMap::new(),
            tags: Vec::new(),
        }
    }

    #[must_use]
    pub fn step_index(mut self, step: u32) -> Self {
        self.step_index = Some(step);
        self
    }

    #[must_use]
    pub fn metric(mut self, key: impl Into<String>, value: impl Into<MetricValue>) -> Self {
        self.metrics.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }
}

/// Holds feedback by id; listings follow creation order
#[derive(Debug, Default)]
pub struct FeedbackCollector {
    feedbacks: HashMap<String, Feedback>,
    order: Vec<String>,
}

impl FeedbackCollector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and store feedback under a fresh random id
    pub fn create_feedback(&mut self, input: NewFeedback) -> Feedback {
        let mut feedback = Feedback::new(
            Uuid::new_v4().to_string(),
            input.plan_id,
            input.feedback_type,
            input.severity,
            input.title,
            input.description,
        );
        feedback.step_index = input.step_index;
        feedback.metrics = input.metrics;
        for tag in input.tags {
            feedback.add_tag(tag);
        }
        feedback.updated_at = feedback.created_at;

        self.insert(feedback.clone());
        feedback
    }

    /// Store existing feedback, replacing any with the same id
    pub fn insert(&mut self, feedback: Feedback) {
        if !self.feedbacks.contains_key(&feedback.id) {
            self.order.push(feedback.id.clone());
        }
        self.feedbacks.insert(feedback.id.clone(), feedback);
    }

    #[must_use]
    pub fn get_feedback(&self, feedback_id: &str) -> Option<&Feedback> {
        self.feedbacks.get(feedback_id)
    }

    #[must_use]
    pub fn feedbacks_by_plan(&self, plan_id: &str) -> Vec<&Feedback> {
        self.filtered(|f| f.plan_id == plan_id)
    }

    #[must_use]
    pub fn feedbacks_by_type(&self, feedback_type: FeedbackType) -> Vec<&Feedback> {
        self.filtered(|f| f.feedback_type == feedback_type)
    }

    #[must_use]
    pub fn feedbacks_by_severity(&self, severity: FeedbackSeverity) -> Vec<&Feedback> {
        self.filtered(|f| f.severity == severity)
    }

    pub fn update_feedback_status(
        &mut self,
        feedback_id: &str,
        status: FeedbackStatus,
    ) -> Option<&Feedback> {
        let feedback = self.feedbacks.get_mut(feedback_id)?;
        feedback.update_status(status);
        Some(feedback)
    }

    pub fn add_feedback_metric(
        &mut self,
        feedback_id: &str,
        key: impl Into<String>,
        value: impl Into<MetricValue>,
    ) -> Option<&Feedback> {
        let feedback = self.feedbacks.get_mut(feedback_id)?;
        feedback.add_metric(key, value);
        Some(feedback)
    }

    pub fn add_feedback_tag(&mut self, feedback_id: &str, tag: impl Into<String>) -> Option<&Feedback> {
        let feedback = self.feedbacks.get_mut(feedback_id)?;
        feedback.add_tag(tag);
        Some(feedback)
    }

    pub fn delete_feedback(&mut self, feedback_id: &str) -> bool {
        if self.feedbacks.remove(feedback_id).is_none() {
            return false;
        }
        self.order.retain(|id| id != feedback_id);
        true
    }

    #[must_use]
    pub fn all_feedbacks(&self) -> Vec<&Feedback> {
        self.filtered(|_| true)
    }

    #[must_use]
    pub fn feedback_count(&self) -> usize {
        self.feedbacks.len()
    }

    pub fn clear_feedbacks(&mut self) {
        self.feedbacks.clear();
        self.order.clear();
    }

    fn filtered(&self, keep: impl Fn(&Feedback) -> bool) -> Vec<&Feedback> {
        self.order
            .iter()
            .filter_map(|id| self.feedbacks.get(id))
            .filter(|f| keep(f))
            .collect()
    }
}
