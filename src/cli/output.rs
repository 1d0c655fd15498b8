//! Output formatting for CLI

use crate::io::storage::StorageStats;
use crate::models::{Feedback, FeedbackSeverity, ImprovementSuggestion, WeightedPattern};
use crate::services::analyzer::{FeedbackAnalysis, MetricSummary};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Reset ANSI color
const COLOR_RESET: &str = "\x1b[0m";

/// Get ANSI color code for a severity
fn severity_color(severity: FeedbackSeverity) -> &'static str {
    match severity {
        FeedbackSeverity::Critical => "\x1b[31m", // Red
        FeedbackSeverity::High => "\x1b[33m",     // Yellow
        FeedbackSeverity::Medium => "\x1b[36m",   // Cyan
        FeedbackSeverity::Low => "\x1b[90m",      // Gray
    }
}

/// Get ANSI color code for a 0..=1 score
fn score_color(score: f64) -> &'static str {
    if score >= 0.8 {
        "\x1b[31m"
    } else if score >= 0.6 {
        "\x1b[33m"
    } else {
        "\x1b[90m"
    }
}

/// Pretty JSON for any serialisable value
pub fn format_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Feedback table, one row per item
pub fn format_feedback_list(feedbacks: &[&Feedback]) -> String {
    if feedbacks.is_empty() {
        return "No feedback found.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<36} {:<12} {:<9} {:<12} {}",
        "ID", "Type", "Severity", "Status", "Title"
    );
    let _ = writeln!(out, "{}", "─".repeat(96));
    for f in feedbacks {
        let _ = writeln!(
            out,
            "{:<36} {:<12} {}{:<9}{} {:<12} {}",
            f.id,
            f.feedback_type,
            severity_color(f.severity),
            f.severity,
            COLOR_RESET,
            f.status,
            f.title
        );
    }
    let _ = writeln!(out, "\n{} feedback", feedbacks.len());
    out
}

pub fn format_analysis(analysis: &FeedbackAnalysis) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total feedback: {}", analysis.total_count);
    let _ = writeln!(out, "Resolution rate: {:.1}%", analysis.resolution_rate);

    write_distribution(&mut out, "By type", &analysis.type_distribution);
    write_distribution(&mut out, "By severity", &analysis.severity_distribution);
    write_distribution(&mut out, "By status", &analysis.status_distribution);

    if !analysis.common_tags.is_empty() {
        let _ = writeln!(out, "\nCommon tags:");
        for (tag, count) in analysis.common_tags.iter().take(10) {
            let _ = writeln!(out, "  {tag:<24} {count:>6}");
        }
    }

    if !analysis.metrics_summary.is_empty() {
        let _ = writeln!(out, "\nMetrics:");
        write_metric_table(&mut out, &analysis.metrics_summary);
    }

    if !analysis.daily_counts.is_empty() {
        let _ = writeln!(out, "\nPer day:");
        for (day, count) in &analysis.daily_counts {
            let _ = writeln!(out, "  {day}  {count:>6}");
        }
    }
    out
}

pub fn format_patterns(patterns: &[WeightedPattern]) -> String {
    if patterns.is_empty() {
        return "No significant patterns.\n".to_string();
    }
    let mut out = String::new();
    let _ = writeln!(out, "{:>6}  {:<13} {}", "Weight", "Kind", "Description");
    let _ = writeln!(out, "{}", "─".repeat(96));
    for wp in patterns {
        let _ = writeln!(
            out,
            "{}{:>6.2}{}  {:<13} {}",
            score_color(wp.weight),
            wp.weight,
            COLOR_RESET,
            wp.pattern.kind().as_str(),
            wp.pattern.description()
        );
    }
    out
}

pub fn format_suggestions(suggestions: &[ImprovementSuggestion]) -> String {
    if suggestions.is_empty() {
        return "No suggestions.\n".to_string();
    }
    let mut out = String::new();
    for (rank, s) in suggestions.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {}[{:.2}]{} {} ({}, {})",
            rank + 1,
            score_color(s.priority),
            s.priority,
            COLOR_RESET,
            s.title,
            s.improvement_type,
            s.id
        );
        for line in s.description.lines() {
            let _ = writeln!(out, "     {line}");
        }
    }
    out
}

pub fn format_stats(stats: &StorageStats) -> String {
    format!(
        "Feedback stored: {}\nStorage size: {} bytes\n",
        stats.total_feedbacks, stats.storage_size
    )
}

fn write_distribution<K: std::fmt::Display>(out: &mut String, heading: &str, counts: &BTreeMap<K, usize>) {
    if counts.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n{heading}:");
    for (key, count) in counts {
        let _ = writeln!(out, "  {:<24} {count:>6}", key.to_string());
    }
}

fn write_metric_table(out: &mut String, metrics: &BTreeMap<String, MetricSummary>) {
    let _ = writeln!(
        out,
        "  {:<24} {:>6} {:>10} {:>10} {:>10}",
        "Metric", "Count", "Min", "Max", "Avg"
    );
    for (name, m) in metrics {
        let _ = writeln!(
            out,
            "  {name:<24} {:>6} {:>10.2} {:>10.2} {:>10.2}",
            m.count, m.min, m.max, m.avg
        );
    }
}
