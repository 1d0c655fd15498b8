//! Feedback Analysis Library
//!
//! This library turns execution feedback (errors, performance reports,
//! usability notes) into prioritised improvement suggestions. It detects
//! recurring patterns, scores and ranks the suggestions derived from them,
//! and tracks whether implemented improvements actually moved the metrics.
//! Feedback can be persisted in a JSON file store or exported as a Parquet
//! snapshot.

pub mod cli;
pub mod config;
pub mod io;
pub mod models;
pub mod services;

pub use config::Config;
pub use models::{
    Feedback, FeedbackSeverity, FeedbackStatus, FeedbackType, ImprovementStatus,
    ImprovementSuggestion, ImprovementType, MetricValue, Pattern, WeightedPattern,
};

use services::pattern_matcher::PatternMatcher;
use services::suggester::ImprovementSuggester;
use std::result;

/// Custom error type for the library
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow_schema::ArrowError),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

pub type Result<T> = result::Result<T, Error>;

/// Result of a one-shot analysis over a feedback set
#[derive(Debug)]
pub struct AnalysisReport {
    pub feedback_count: usize,
    pub patterns: Vec<Pattern>,
    pub significant: Vec<WeightedPattern>,
    pub suggestions: Vec<ImprovementSuggestion>,
}

/// Run pattern detection and suggestion generation over `feedbacks`
///
/// # Arguments
/// * `feedbacks` - The feedback set to analyse
/// * `config` - Thresholds and weights
/// * `min_weight` - Minimum weight for a pattern to count as significant
///
/// # Returns
/// An `AnalysisReport` with raw patterns, significant patterns sorted by
/// weight, and suggestions sorted by priority
#[must_use]
pub fn run_analysis(feedbacks: &[Feedback], config: &Config, min_weight: f64) -> AnalysisReport {
    let matcher = PatternMatcher::with_config(config.pattern.clone());
    let patterns = matcher.find_patterns(feedbacks);
    let significant = matcher.significant_patterns(&patterns, min_weight);

    let mut suggester = ImprovementSuggester::with_config(config);
    let suggestions = suggester.analyze_feedbacks(feedbacks);

    log::debug!(
        "Analysis over {} feedback: {} patterns, {} significant, {} suggestions",
        feedbacks.len(),
        patterns.len(),
        significant.len(),
        suggestions.len()
    );

    AnalysisReport {
        feedback_count: feedbacks.len(),
        patterns,
        significant,
        suggestions,
    }
}
