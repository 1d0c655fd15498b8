//! Pattern detection over feedback sets
//!
//! Three independent detectors run in parallel on every uncached request:
//!
//! - time-based: hours of the day (UTC) with at least `frequency_threshold`
//!   recent feedback items;
//! - type-based: feedback types reported at least `frequency_threshold` times,
//!   with their dominant severity;
//! - metric-based: numeric metrics whose values exceed the Tukey upper fence.
//!
//! Results are cached per set of feedback ids, so repeated analysis of the
//! same feedback returns the identical pattern list.

use crate::config::PatternConfig;
use crate::models::{
    Feedback, FeedbackSeverity, FeedbackType, ImprovementType, Pattern, WeightedPattern,
};
use crate::services::stats;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, PoisonError};
use time::{OffsetDateTime, UtcOffset};

/// Detects and scores recurring patterns in feedback
#[derive(Debug)]
pub struct PatternMatcher {
    config: PatternConfig,
    cache: Mutex<HashMap<String, Vec<Pattern>>>,
}

impl Default for PatternMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternMatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(PatternConfig::default())
    }

    #[must_use]
    pub fn with_config(config: PatternConfig) -> Self {
        Self {
            config,
            cache: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn config(&self) -> &PatternConfig {
        &self.config
    }

    /// Find all patterns in `feedbacks`, ordered time, type, then metric based
    pub fn find_patterns(&self, feedbacks: &[Feedback]) -> Vec<Pattern> {
        if feedbacks.is_empty() {
            return Vec::new();
        }

        let key = cache_key(feedbacks);
        if let Some(hit) = self.lock_cache().get(&key) {
            log::debug!("Pattern cache hit for {} feedback", feedbacks.len());
            return hit.clone();
        }

        let (time_patterns, (type_patterns, metric_patterns)) = rayon::join(
            || self.time_based_patterns(feedbacks),
            || {
                rayon::join(
                    || self.type_based_patterns(feedbacks),
                    || self.metric_based_patterns(feedbacks),
                )
            },
        );

        let mut patterns =
            Vec::with_capacity(time_patterns.len() + type_patterns.len() + metric_patterns.len());
        patterns.extend(time_patterns);
        patterns.extend(type_patterns);
        patterns.extend(metric_patterns);

        log::debug!(
            "Found {} patterns in {} feedback",
            patterns.len(),
            feedbacks.len()
        );

        self.lock_cache().insert(key, patterns.clone());
        patterns
    }

    /// Number of cached feedback sets
    #[must_use]
    pub fn cache_len(&self) -> usize {
        self.lock_cache().len()
    }

    pub fn clear_cache(&self) {
        self.lock_cache().clear();
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<Pattern>>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Hours of the day with frequent feedback inside the time window
    #[must_use]
    pub fn time_based_patterns(&self, feedbacks: &[Feedback]) -> Vec<Pattern> {
        let now = OffsetDateTime::now_utc();
        let window = self.config.time_window();

        let mut by_hour: BTreeMap<u8, usize> = BTreeMap::new();
        for feedback in feedbacks.iter().filter(|f| now - f.created_at <= window) {
            let hour = feedback.created_at.to_offset(UtcOffset::UTC).hour();
            *by_hour.entry(hour).or_default() += 1;
        }

        by_hour
            .into_iter()
            .filter(|(_, count)| *count >= self.config.frequency_threshold)
            .map(|(hour, count)| Pattern::TimeBased { hour, count })
            .collect()
    }

    /// Frequent feedback types and their most common severity
    #[must_use]
    pub fn type_based_patterns(&self, feedbacks: &[Feedback]) -> Vec<Pattern> {
        let mut by_type: BTreeMap<FeedbackType, BTreeMap<FeedbackSeverity, usize>> =
            BTreeMap::new();
        for feedback in feedbacks {
            *by_type
                .entry(feedback.feedback_type)
                .or_default()
                .entry(feedback.severity)
                .or_default() += 1;
        }

        by_type
            .into_iter()
            .filter_map(|(feedback_type, severities)| {
                let count: usize = severities.values().sum();
                if count < self.config.frequency_threshold {
                    return None;
                }
                // Ties resolve to the lowest severity
                let main_severity = severities
                    .iter()
                    .fold(None::<(FeedbackSeverity, usize)>, |best, (sev, n)| match best {
                        Some((_, best_n)) if best_n >= *n => best,
                        _ => Some((*sev, *n)),
                    })
                    .map(|(sev, _)| sev)?;
                Some(Pattern::TypeBased {
                    feedback_type,
                    count,
                    main_severity,
                })
            })
            .collect()
    }

    /// Numeric metrics with values above the upper IQR fence
    #[must_use]
    pub fn metric_based_patterns(&self, feedbacks: &[Feedback]) -> Vec<Pattern> {
        let mut by_metric: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        for feedback in feedbacks {
            for (name, value) in feedback.numeric_metrics() {
                by_metric.entry(name).or_default().push(value);
            }
        }

        let mut patterns = Vec::new();
        for (name, values) in by_metric {
            if values.len() < self.config.frequency_threshold {
                continue;
            }
            let (Some(avg_value), Some((_, upper))) = (stats::mean(&values), stats::iqr_fences(&values))
            else {
                continue;
            };
            let anomaly_count = values.iter().filter(|v| **v > upper).count();
            if anomaly_count == 0 {
                continue;
            }
            let max_value = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let min_value = values.iter().copied().fold(f64::INFINITY, f64::min);

            patterns.push(Pattern::MetricBased {
                metric_name: name.to_string(),
                avg_value,
                max_value,
                min_value,
                anomaly_count,
                anomaly_threshold: upper,
            });
        }
        patterns
    }

    /// Ranking weight of a pattern in `0.5..=1.0`
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn pattern_weight(&self, pattern: &Pattern) -> f64 {
        let threshold = self.config.frequency_threshold as f64;
        let mut weight = 0.5;

        match pattern {
            Pattern::MetricBased {
                anomaly_count,
                avg_value,
                max_value,
                min_value,
                ..
            } => {
                let anomaly_ratio = *anomaly_count as f64 / threshold;
                weight += (anomaly_ratio * 2.0).min(1.0) * 0.3;

                let range = max_value - min_value;
                if range > 0.0 && *avg_value != 0.0 {
                    weight += (range / avg_value.abs()).min(1.0) * 0.2;
                }
            }
            Pattern::TimeBased { count, .. } => {
                weight += (*count as f64 / (threshold * 2.0)).min(1.0) * 0.3;
            }
            Pattern::TypeBased {
                count,
                main_severity,
                ..
            } => {
                let frequency = (*count as f64 / (threshold * 2.0)).min(1.0);
                weight += main_severity.pattern_bonus() + frequency * 0.2;
            }
        }

        weight.min(1.0)
    }

    /// Patterns whose weight reaches `threshold`, heaviest first
    #[must_use]
    pub fn significant_patterns(&self, patterns: &[Pattern], threshold: f64) -> Vec<WeightedPattern> {
        let mut significant: Vec<WeightedPattern> = patterns
            .iter()
            .map(|p| WeightedPattern {
                pattern: p.clone(),
                weight: self.pattern_weight(p),
            })
            .filter(|wp| wp.weight >= threshold)
            .collect();
        significant.sort_by(|a, b| b.weight.total_cmp(&a.weight));
        significant
    }

    /// Improvement type suggested by a pattern, with a confidence in `0..=1`
    #[must_use]
    pub fn suggest_improvement_type(&self, pattern: &Pattern) -> (ImprovementType, f64) {
        match pattern {
            Pattern::MetricBased { metric_name, .. } => {
                let name = metric_name.to_lowercase();
                if name.contains("cpu") || name.contains("memory") {
                    return (ImprovementType::Resource, 0.8);
                }
                if name.contains("time") || name.contains("duration") {
                    return (ImprovementType::Performance, 0.8);
                }
            }
            Pattern::TypeBased { feedback_type, .. } => match feedback_type {
                FeedbackType::Performance => return (ImprovementType::Performance, 0.9),
                FeedbackType::Resource => return (ImprovementType::Resource, 0.9),
                FeedbackType::Error => return (ImprovementType::Reliability, 0.8),
                FeedbackType::Suggestion => return (ImprovementType::Strategy, 0.7),
                _ => {}
            },
            Pattern::TimeBased { .. } => {}
        }
        (ImprovementType::Efficiency, 0.5)
    }

    /// How much a pattern matters, in `0..=1`
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn pattern_significance(&self, pattern: &Pattern) -> f64 {
        let threshold = self.config.frequency_threshold as f64;
        let mut score = 0.5;

        match pattern {
            Pattern::MetricBased { anomaly_count, .. } => {
                score += (*anomaly_count as f64 / threshold).min(1.0) * 0.3;
            }
            Pattern::TypeBased {
                count,
                main_severity,
                ..
            } => {
                let frequency = (*count as f64 / (threshold * 2.0)).min(1.0);
                score += frequency * 0.2 + main_severity.pattern_bonus();
            }
            Pattern::TimeBased { count, .. } => {
                score += (*count as f64 / (threshold * 2.0)).min(1.0) * 0.2;
            }
        }

        score.clamp(0.0, 1.0)
    }
}

fn cache_key(feedbacks: &[Feedback]) -> String {
    let mut ids: Vec<&str> = feedbacks.iter().map(|f| f.id.as_str()).collect();
    ids.sort_unstable();
    ids.join("|")
}
