//! Unit tests for descriptive feedback statistics

#[cfg(test)]
mod tests {
    use crate::fixtures::{days_ago, make_feedback, sample_feedbacks};
    use feedback::services::analyzer::FeedbackAnalyzer;
    use feedback::{Feedback, FeedbackSeverity, FeedbackStatus, FeedbackType};
    use time::Duration;

    fn tagged(id: &str, tags: &[&str]) -> Feedback {
        let mut f = make_feedback(id, FeedbackType::Usability, FeedbackSeverity::Low);
        for tag in tags {
            f.add_tag(*tag);
        }
        f
    }

    #[test]
    fn test_distributions_and_metric_summary() {
        let analysis = FeedbackAnalyzer::new().analyze_feedbacks(&sample_feedbacks(), None);

        assert_eq!(analysis.total_count, 8);
        assert_eq!(analysis.type_distribution[&FeedbackType::Performance], 5);
        assert_eq!(analysis.type_distribution[&FeedbackType::Error], 3);
        assert_eq!(analysis.severity_distribution[&FeedbackSeverity::Critical], 3);
        assert_eq!(analysis.status_distribution[&FeedbackStatus::New], 8);

        let rt = analysis.metrics_summary["response_time"];
        assert_eq!(rt.count, 5);
        assert_eq!(rt.min, 100.0);
        assert_eq!(rt.max, 900.0);
        assert!((rt.avg - 263.4).abs() < 1e-9);

        assert_eq!(analysis.daily_counts.values().sum::<usize>(), 8);
    }

    #[test]
    fn test_common_tags_are_most_frequent_first_with_stable_ties() {
        let feedbacks = vec![
            tagged("a", &["ui", "slow"]),
            tagged("b", &["network"]),
            tagged("c", &["slow", "network"]),
            tagged("d", &["slow"]),
        ];
        let analysis = FeedbackAnalyzer::new().analyze_feedbacks(&feedbacks, None);

        assert_eq!(
            analysis.common_tags,
            vec![
                ("slow".to_string(), 3),
                ("network".to_string(), 2),
                ("ui".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_window_excludes_old_feedback() {
        let feedbacks = vec![
            make_feedback("new", FeedbackType::Error, FeedbackSeverity::High),
            make_feedback("old", FeedbackType::Error, FeedbackSeverity::High).created_at(days_ago(3)),
        ];
        let analysis = FeedbackAnalyzer::new().analyze_feedbacks(&feedbacks, Some(Duration::days(1)));
        assert_eq!(analysis.total_count, 1);
    }

    #[test]
    fn test_empty_input_gives_an_empty_analysis() {
        let analysis = FeedbackAnalyzer::new().analyze_feedbacks(&[], None);
        assert_eq!(analysis.total_count, 0);
        assert!(analysis.common_tags.is_empty());
        assert!(analysis.metrics_summary.is_empty());
    }

    #[test]
    fn test_critical_feedback_is_extracted() {
        let critical = FeedbackAnalyzer::new().critical_feedbacks(&sample_feedbacks()).len();
        assert_eq!(critical, 3);
    }

    #[test]
    fn test_trending_issues_need_min_occurrence() {
        let mut old = tagged("old", &["ui", "ui-old"]);
        old = old.created_at(days_ago(10));
        let feedbacks = vec![
            tagged("a", &["slow"]),
            tagged("b", &["slow", "ui"]),
            old,
        ];

        let trending = FeedbackAnalyzer::new().trending_issues(&feedbacks, Duration::days(7), 2);
        assert_eq!(trending, vec![("slow".to_string(), 2)]);
    }

    #[test]
    fn test_performance_metrics_only_use_performance_feedback() {
        let mut feedbacks = sample_feedbacks();
        let mut other = make_feedback("res", FeedbackType::Resource, FeedbackSeverity::Low);
        other.add_metric("response_time", 1.0);
        feedbacks.push(other);

        let summary = FeedbackAnalyzer::new().performance_metrics(&feedbacks);
        assert_eq!(summary["response_time"].count, 5);
    }

    #[test]
    fn test_summary_counts_everything() {
        let summary = FeedbackAnalyzer::new().feedback_summary(&sample_feedbacks());
        assert_eq!(summary.total_count, 8);
        assert_eq!(summary.severity_distribution[&FeedbackSeverity::High], 5);

        let empty = FeedbackAnalyzer::new().feedback_summary(&[]);
        assert_eq!(empty.total_count, 0);
        assert!(empty.type_distribution.is_empty());
    }

    #[test]
    fn test_resolution_rate_is_a_percentage() {
        let analyzer = FeedbackAnalyzer::new();
        assert_eq!(analyzer.resolution_rate(&[]), 0.0);

        let mut feedbacks = sample_feedbacks();
        feedbacks[0].update_status(FeedbackStatus::Implemented);
        feedbacks[1].update_status(FeedbackStatus::Closed);
        feedbacks[2].update_status(FeedbackStatus::Rejected);

        assert!((analyzer.resolution_rate(&feedbacks) - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_resolution_rate_follows_the_analysis_window() {
        let mut old_closed =
            make_feedback("old", FeedbackType::Error, FeedbackSeverity::High).created_at(days_ago(5));
        old_closed.status = FeedbackStatus::Closed;
        let mut recent_closed = make_feedback("done", FeedbackType::Error, FeedbackSeverity::High);
        recent_closed.status = FeedbackStatus::Implemented;
        let feedbacks = vec![
            old_closed,
            recent_closed,
            make_feedback("open", FeedbackType::Error, FeedbackSeverity::High),
        ];

        let analyzer = FeedbackAnalyzer::new();
        let windowed = analyzer.analyze_feedbacks(&feedbacks, Some(Duration::days(1)));
        assert_eq!(windowed.total_count, 2);
        assert!((windowed.resolution_rate - 50.0).abs() < 1e-9);

        let all = analyzer.analyze_feedbacks(&feedbacks, None);
        assert!((all.resolution_rate - analyzer.resolution_rate(&feedbacks)).abs() < 1e-9);
    }
}
