//! Tunable thresholds and weights
//!
//! Every section implements `Default` with the values the analysis was
//! calibrated against. A JSON file may override any subset of fields:
//!
//! ```json
//! { "pattern": { "frequency_threshold": 5 }, "tracker": { "success_threshold": 0.65 } }
//! ```

use crate::models::ImprovementType;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub pattern: PatternConfig,
    pub priority: PriorityConfig,
    pub tracker: TrackerConfig,
}

impl Config {
    /// Load a JSON configuration file, falling back to defaults for absent fields
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        log::debug!("Loaded configuration from {}", path.as_ref().display());
        Ok(config)
    }

    /// Reject values the scoring code cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.pattern.frequency_threshold == 0 {
            return Err(Error::InvalidInput(
                "pattern.frequency_threshold must be at least 1".to_string(),
            ));
        }
        if self.pattern.time_window_days <= 0 || self.tracker.tracking_window_days <= 0 {
            return Err(Error::InvalidInput(
                "time windows must be a positive number of days".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.tracker.success_threshold) {
            return Err(Error::InvalidInput(
                "tracker.success_threshold must be within 0..=1".to_string(),
            ));
        }
        let weights = &self.priority.weights;
        if [
            weights.severity,
            weights.frequency,
            weights.impact,
            weights.cost,
            weights.urgency,
        ]
        .iter()
        .any(|w| !w.is_finite() || *w < 0.0)
        {
            return Err(Error::InvalidInput(
                "priority weights must be finite and non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Pattern detection thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Minimum occurrences before a grouping counts as a pattern
    pub frequency_threshold: usize,
    /// Look-back window for time-of-day patterns
    pub time_window_days: i64,
    pub similarity_threshold: f64,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            frequency_threshold: 3,
            time_window_days: 7,
            similarity_threshold: 0.7,
        }
    }
}

impl PatternConfig {
    #[must_use]
    pub fn time_window(&self) -> Duration {
        Duration::days(self.time_window_days)
    }
}

/// Relative weight of each priority component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityWeights {
    pub severity: f64,
    pub frequency: f64,
    pub impact: f64,
    pub cost: f64,
    pub urgency: f64,
}

impl Default for PriorityWeights {
    fn default() -> Self {
        Self {
            severity: 0.35,
            frequency: 0.25,
            impact: 0.20,
            cost: 0.10,
            urgency: 0.10,
        }
    }
}

/// Priority scoring configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityConfig {
    pub weights: PriorityWeights,
    /// Base score per improvement type; missing types score 0.5
    pub base_scores: BTreeMap<ImprovementType, f64>,
    pub frequency_window_days: i64,
}

impl Default for PriorityConfig {
    fn default() -> Self {
        let base_scores = BTreeMap::from([
            (ImprovementType::Performance, 0.8),
            (ImprovementType::Reliability, 0.9),
            (ImprovementType::Resource, 0.7),
            (ImprovementType::Efficiency, 0.6),
            (ImprovementType::Strategy, 0.5),
        ]);
        Self {
            weights: PriorityWeights::default(),
            base_scores,
            frequency_window_days: 7,
        }
    }
}

impl PriorityConfig {
    #[must_use]
    pub fn base_score(&self, improvement_type: ImprovementType) -> f64 {
        self.base_scores
            .get(&improvement_type)
            .copied()
            .unwrap_or(0.5)
    }
}

/// Result tracking configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub tracking_window_days: i64,
    /// Minimum overall score for an implementation to count as successful
    pub success_threshold: f64,
    /// Metrics where an increase is an improvement; all others improve by decreasing
    pub higher_is_better: Vec<String>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            tracking_window_days: 30,
            success_threshold: 0.6,
            higher_is_better: ["throughput", "success_rate", "availability", "hit_rate"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl TrackerConfig {
    #[must_use]
    pub fn tracking_window(&self) -> Duration {
        Duration::days(self.tracking_window_days)
    }

    #[must_use]
    pub fn is_higher_better(&self, metric: &str) -> bool {
        self.higher_is_better.iter().any(|m| m == metric)
    }
}
