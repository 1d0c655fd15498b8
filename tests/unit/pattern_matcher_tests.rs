//! Unit tests for pattern detection and weighting

#[cfg(test)]
mod tests {
    use crate::fixtures::{approx_eq, days_ago, hours_ago, make_feedback, sample_feedbacks};
    use feedback::config::PatternConfig;
    use feedback::models::PatternKind;
    use feedback::services::pattern_matcher::PatternMatcher;
    use feedback::{FeedbackSeverity, FeedbackType, ImprovementType, Pattern};

    #[test]
    fn test_empty_input_has_no_patterns() {
        let matcher = PatternMatcher::new();
        assert!(matcher.find_patterns(&[]).is_empty());
        assert_eq!(matcher.cache_len(), 0);
    }

    #[test]
    fn test_sample_yields_time_type_and_metric_patterns_in_order() {
        let matcher = PatternMatcher::new();
        let patterns = matcher.find_patterns(&sample_feedbacks());

        let kinds: Vec<PatternKind> = patterns.iter().map(Pattern::kind).collect();
        assert_eq!(
            kinds,
            vec![
                PatternKind::TimeBased,
                PatternKind::TypeBased,
                PatternKind::TypeBased,
                PatternKind::MetricBased,
            ]
        );
    }

    #[test]
    fn test_time_pattern_counts_feedback_in_the_same_hour() {
        let matcher = PatternMatcher::new();
        let patterns = matcher.time_based_patterns(&sample_feedbacks());

        assert_eq!(patterns.len(), 1);
        let Pattern::TimeBased { hour, count } = patterns[0] else {
            panic!("expected time based pattern");
        };
        assert_eq!(count, 8);
        assert_eq!(hour, hours_ago(1).hour());
    }

    #[test]
    fn test_feedback_outside_the_window_is_ignored_by_time_patterns() {
        let at = days_ago(10);
        let old: Vec<_> = (0..5)
            .map(|i| {
                make_feedback(&format!("old-{i}"), FeedbackType::Error, FeedbackSeverity::Low)
                    .created_at(at)
            })
            .collect();

        let matcher = PatternMatcher::new();
        assert!(matcher.time_based_patterns(&old).is_empty());
        // type patterns have no window
        assert_eq!(matcher.type_based_patterns(&old).len(), 1);
    }

    #[test]
    fn test_type_patterns_report_main_severity() {
        let matcher = PatternMatcher::new();
        let patterns = matcher.type_based_patterns(&sample_feedbacks());

        assert_eq!(
            patterns,
            vec![
                Pattern::TypeBased {
                    feedback_type: FeedbackType::Performance,
                    count: 5,
                    main_severity: FeedbackSeverity::High,
                },
                Pattern::TypeBased {
                    feedback_type: FeedbackType::Error,
                    count: 3,
                    main_severity: FeedbackSeverity::Critical,
                },
            ]
        );
    }

    #[test]
    fn test_severity_ties_resolve_to_the_lowest() {
        let feedbacks = vec![
            make_feedback("a", FeedbackType::Usability, FeedbackSeverity::Critical),
            make_feedback("b", FeedbackType::Usability, FeedbackSeverity::Low),
            make_feedback("c", FeedbackType::Usability, FeedbackSeverity::Critical),
            make_feedback("d", FeedbackType::Usability, FeedbackSeverity::Low),
        ];
        let patterns = PatternMatcher::new().type_based_patterns(&feedbacks);

        assert_eq!(patterns.len(), 1);
        let Pattern::TypeBased { main_severity, .. } = &patterns[0] else {
            panic!("expected type based pattern");
        };
        assert_eq!(*main_severity, FeedbackSeverity::Low);
    }

    #[test]
    fn test_types_below_threshold_are_not_patterns() {
        let feedbacks = vec![
            make_feedback("a", FeedbackType::Usability, FeedbackSeverity::Medium),
            make_feedback("b", FeedbackType::Usability, FeedbackSeverity::Medium),
        ];
        assert!(PatternMatcher::new().type_based_patterns(&feedbacks).is_empty());
    }

    #[test]
    fn test_metric_pattern_flags_values_above_the_upper_fence() {
        let patterns = PatternMatcher::new().metric_based_patterns(&sample_feedbacks());
        assert_eq!(patterns.len(), 1);

        let Pattern::MetricBased {
            metric_name,
            anomaly_count,
            max_value,
            min_value,
            anomaly_threshold,
            ..
        } = &patterns[0]
        else {
            panic!("expected metric based pattern");
        };
        assert_eq!(metric_name, "response_time");
        assert_eq!(*anomaly_count, 1);
        assert_eq!(*max_value, 900.0);
        assert_eq!(*min_value, 100.0);
        // q1 = 102, q3 = 110
        assert!((anomaly_threshold - 122.0).abs() < 1e-9);
    }

    #[test]
    fn test_steady_metrics_produce_no_pattern() {
        let feedbacks: Vec<_> = [90_i64, 91, 92]
            .into_iter()
            .enumerate()
            .map(|(i, cpu)| {
                let mut f = make_feedback(
                    &format!("cpu-{i}"),
                    FeedbackType::Resource,
                    FeedbackSeverity::Medium,
                );
                f.add_metric("cpu_usage", cpu);
                f
            })
            .collect();
        assert!(PatternMatcher::new().metric_based_patterns(&feedbacks).is_empty());
    }

    #[test]
    fn test_repeated_lookups_hit_the_cache() {
        let matcher = PatternMatcher::new();
        let feedbacks = sample_feedbacks();

        let first = matcher.find_patterns(&feedbacks);
        let mut reversed = feedbacks.clone();
        reversed.reverse();
        let second = matcher.find_patterns(&reversed);

        assert_eq!(first, second);
        assert_eq!(matcher.cache_len(), 1);

        matcher.clear_cache();
        assert_eq!(matcher.cache_len(), 0);
    }

    #[test]
    fn test_weights_stay_within_bounds() {
        let matcher = PatternMatcher::new();
        for pattern in matcher.find_patterns(&sample_feedbacks()) {
            let weight = matcher.pattern_weight(&pattern);
            assert!((0.5..=1.0).contains(&weight), "{pattern:?} -> {weight}");
            let significance = matcher.pattern_significance(&pattern);
            assert!((0.0..=1.0).contains(&significance));
        }
    }

    fn metric_pattern(avg: f64, min: f64, max: f64, anomaly_count: usize) -> Pattern {
        Pattern::MetricBased {
            metric_name: "response_time".to_string(),
            avg_value: avg,
            max_value: max,
            min_value: min,
            anomaly_count,
            anomaly_threshold: max,
        }
    }

    fn type_pattern(count: usize, main_severity: FeedbackSeverity) -> Pattern {
        Pattern::TypeBased {
            feedback_type: FeedbackType::Error,
            count,
            main_severity,
        }
    }

    #[test]
    fn test_time_pattern_weight_and_significance() {
        let matcher = PatternMatcher::new();

        let few = Pattern::TimeBased { hour: 3, count: 3 };
        // 0.5 + (3 / 6) * 0.3, 0.5 + (3 / 6) * 0.2
        assert!(approx_eq(matcher.pattern_weight(&few), 0.65));
        assert!(approx_eq(matcher.pattern_significance(&few), 0.6));

        let many = Pattern::TimeBased { hour: 3, count: 12 };
        assert!(approx_eq(matcher.pattern_weight(&many), 0.8));
        assert!(approx_eq(matcher.pattern_significance(&many), 0.7));
    }

    #[test]
    fn test_type_pattern_weight_and_significance() {
        let matcher = PatternMatcher::new();

        let critical = type_pattern(3, FeedbackSeverity::Critical);
        // 0.5 + 0.3 bonus + (3 / 6) * 0.2
        assert!(approx_eq(matcher.pattern_weight(&critical), 0.9));
        assert!(approx_eq(matcher.pattern_significance(&critical), 0.9));

        let high = type_pattern(3, FeedbackSeverity::High);
        assert!(approx_eq(matcher.pattern_weight(&high), 0.8));
        assert!(approx_eq(matcher.pattern_significance(&high), 0.8));

        let low = type_pattern(6, FeedbackSeverity::Low);
        assert!(approx_eq(matcher.pattern_weight(&low), 0.7));
        assert!(approx_eq(matcher.pattern_significance(&low), 0.7));

        let capped = type_pattern(30, FeedbackSeverity::Critical);
        assert!(approx_eq(matcher.pattern_weight(&capped), 1.0));
        assert!(approx_eq(matcher.pattern_significance(&capped), 1.0));
    }

    #[test]
    fn test_metric_pattern_weight_and_significance() {
        let matcher = PatternMatcher::new();

        let wide = metric_pattern(100.0, 50.0, 150.0, 1);
        // 0.5 + min(1/3 * 2, 1) * 0.3 + min(100 / 100, 1) * 0.2
        assert!(approx_eq(matcher.pattern_weight(&wide), 0.9));
        // 0.5 + (1 / 3) * 0.3
        assert!(approx_eq(matcher.pattern_significance(&wide), 0.6));

        let narrow = metric_pattern(200.0, 190.0, 210.0, 3);
        // 0.5 + 0.3 + (20 / 200) * 0.2
        assert!(approx_eq(matcher.pattern_weight(&narrow), 0.82));
        assert!(approx_eq(matcher.pattern_significance(&narrow), 0.8));
    }

    #[test]
    fn test_metric_variation_uses_magnitude_of_average() {
        let matcher = PatternMatcher::new();

        let negative = metric_pattern(-10.0, -20.0, 40.0, 1);
        let weight = matcher.pattern_weight(&negative);
        // 0.5 + 0.2 + min(60 / |-10|, 1) * 0.2
        assert!(approx_eq(weight, 0.9), "{weight}");
        assert!(approx_eq(matcher.pattern_significance(&negative), 0.6));

        let zero_mean = metric_pattern(0.0, -5.0, 5.0, 1);
        assert!(approx_eq(matcher.pattern_weight(&zero_mean), 0.7));
    }

    #[test]
    fn test_significant_patterns_are_sorted_and_filtered() {
        let matcher = PatternMatcher::new();
        let patterns = matcher.find_patterns(&sample_feedbacks());

        let significant = matcher.significant_patterns(&patterns, 0.7);
        assert_eq!(significant.len(), 4);
        assert!(
            significant
                .windows(2)
                .all(|pair| pair[0].weight >= pair[1].weight)
        );

        assert!(matcher.significant_patterns(&patterns, 0.95).is_empty());
    }

    #[test]
    fn test_improvement_type_follows_pattern() {
        let matcher = PatternMatcher::new();
        let metric = |name: &str| Pattern::MetricBased {
            metric_name: name.to_string(),
            avg_value: 1.0,
            max_value: 2.0,
            min_value: 0.5,
            anomaly_count: 1,
            anomaly_threshold: 1.5,
        };
        let by_type = |feedback_type| Pattern::TypeBased {
            feedback_type,
            count: 3,
            main_severity: FeedbackSeverity::Medium,
        };

        assert_eq!(
            matcher.suggest_improvement_type(&metric("cpu_usage")),
            (ImprovementType::Resource, 0.8)
        );
        assert_eq!(
            matcher.suggest_improvement_type(&metric("response_time")),
            (ImprovementType::Performance, 0.8)
        );
        assert_eq!(
            matcher.suggest_improvement_type(&metric("queue_depth")),
            (ImprovementType::Efficiency, 0.5)
        );
        assert_eq!(
            matcher.suggest_improvement_type(&by_type(FeedbackType::Error)),
            (ImprovementType::Reliability, 0.8)
        );
        assert_eq!(
            matcher.suggest_improvement_type(&by_type(FeedbackType::Suggestion)),
            (ImprovementType::Strategy, 0.7)
        );
        assert_eq!(
            matcher.suggest_improvement_type(&Pattern::TimeBased { hour: 1, count: 4 }),
            (ImprovementType::Efficiency, 0.5)
        );
    }

    #[test]
    fn test_custom_threshold_is_respected() {
        let matcher = PatternMatcher::with_config(PatternConfig {
            frequency_threshold: 6,
            ..PatternConfig::default()
        });
        let patterns = matcher.find_patterns(&sample_feedbacks());

        // only the eight-item hour survives
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].kind(), PatternKind::TimeBased);
    }
}
