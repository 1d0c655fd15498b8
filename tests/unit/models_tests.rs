//! Unit tests for model parsing, serialization and mutation

#[cfg(test)]
mod tests {
    use crate::fixtures::make_feedback;
    use feedback::{
        Feedback, FeedbackSeverity, FeedbackStatus, FeedbackType, ImprovementStatus,
        ImprovementSuggestion, ImprovementType, MetricValue, Pattern,
    };
    use time::macros::datetime;

    #[test]
    fn test_enums_parse_case_insensitively() {
        assert_eq!("Performance".parse::<FeedbackType>(), Ok(FeedbackType::Performance));
        assert_eq!("CRITICAL".parse::<FeedbackSeverity>(), Ok(FeedbackSeverity::Critical));
        assert_eq!("in-review".parse::<FeedbackStatus>(), Ok(FeedbackStatus::InReview));
        assert_eq!("under_review".parse::<ImprovementStatus>(), Ok(ImprovementStatus::UnderReview));
        assert!("bogus".parse::<FeedbackType>().is_err());
    }

    #[test]
    fn test_severity_orders_from_low_to_critical() {
        assert!(FeedbackSeverity::Low < FeedbackSeverity::Medium);
        assert!(FeedbackSeverity::High < FeedbackSeverity::Critical);
        assert_eq!(FeedbackSeverity::Critical.weight(), 1.0);
    }

    #[test]
    fn test_feedback_json_uses_type_key_and_rfc3339() {
        let mut f = make_feedback("fb-1", FeedbackType::Error, FeedbackSeverity::High);
        f.add_metric("retries", 3_i64);
        f.add_metric("ratio", 0.5);
        f.add_metric("host", "db-1");

        let value = serde_json::to_value(&f).unwrap();
        assert_eq!(value["type"], "error");
        assert_eq!(value["severity"], "high");
        assert_eq!(value["status"], "new");
        assert_eq!(value["metrics"]["retries"], 3);
        assert_eq!(value["metrics"]["host"], "db-1");
        assert!(value["created_at"].as_str().unwrap().contains('T'));

        let back: Feedback = serde_json::from_value(value).unwrap();
        assert_eq!(back, f);
    }

    #[test]
    fn test_metric_values_deserialize_untagged() {
        let parsed: Vec<MetricValue> = serde_json::from_str(r#"[1, 2.5, "x"]"#).unwrap();
        assert_eq!(
            parsed,
            vec![
                MetricValue::Int(1),
                MetricValue::Float(2.5),
                MetricValue::Text("x".to_string())
            ]
        );
        assert_eq!(parsed[0].as_f64(), Some(1.0));
        assert_eq!(parsed[2].as_f64(), None);
    }

    #[test]
    fn test_metric_parse_lossy_prefers_integers() {
        assert_eq!(MetricValue::parse_lossy("42"), MetricValue::Int(42));
        assert_eq!(MetricValue::parse_lossy("4.2"), MetricValue::Float(4.2));
        assert_eq!(MetricValue::parse_lossy("fast"), MetricValue::Text("fast".to_string()));
    }

    #[test]
    fn test_non_finite_words_stay_text() {
        for raw in ["NaN", "inf", "-infinity"] {
            let value = MetricValue::parse_lossy(raw);
            assert_eq!(value, MetricValue::Text(raw.to_string()));
            assert!(value.is_finite());
        }
        assert!(!MetricValue::Float(f64::NAN).is_finite());

        let mut f = make_feedback("fb-1", FeedbackType::Resource, FeedbackSeverity::Low);
        f.add_metric("cpu_usage", 0.5);
        assert_eq!(f.non_finite_metric(), None);
        f.add_metric("memory", f64::INFINITY);
        assert_eq!(f.non_finite_metric(), Some("memory"));
    }

    #[test]
    fn test_created_day_is_the_utc_date() {
        let f = make_feedback("fb-1", FeedbackType::Other, FeedbackSeverity::Low)
            .created_at(datetime!(2024-03-05 23:30 -2));
        assert_eq!(f.created_day(), "2024-03-06");

        let f = make_feedback("fb-2", FeedbackType::Other, FeedbackSeverity::Low)
            .created_at(datetime!(2024-11-09 0:05 UTC));
        assert_eq!(f.created_day(), "2024-11-09");
    }

    #[test]
    fn test_status_update_touches_updated_at() {
        let mut f = make_feedback("fb-1", FeedbackType::Error, FeedbackSeverity::High);
        let before = f.updated_at;
        f.update_status(FeedbackStatus::Implemented);
        assert!(f.updated_at >= before);
        assert!(f.status.is_resolved());
    }

    #[test]
    fn test_duplicate_tags_are_ignored() {
        let mut f = make_feedback("fb-1", FeedbackType::Error, FeedbackSeverity::High);
        f.add_tag("db");
        f.add_tag("db");
        assert_eq!(f.tags, vec!["db"]);
    }

    #[test]
    fn test_suggestion_priority_is_clamped() {
        let mut s = ImprovementSuggestion::new("imp-1", ImprovementType::Strategy, "t", "d", 1.7);
        assert_eq!(s.priority, 1.0);
        s.update_priority(-0.3);
        assert_eq!(s.priority, 0.0);
        s.update_priority(f64::NAN);
        assert_eq!(s.priority, 0.0);
    }

    #[test]
    fn test_suggestion_related_feedback_and_tags_deduplicate() {
        let mut s = ImprovementSuggestion::new("imp-1", ImprovementType::Strategy, "t", "d", 0.5);
        s.add_related_feedback("fb-1");
        s.add_related_feedback("fb-1");
        s.add_tags(["a", "b", "a"]);
        assert_eq!(s.related_feedbacks, vec!["fb-1"]);
        assert_eq!(s.tags, vec!["a", "b"]);
    }

    #[test]
    fn test_patterns_serialize_with_a_type_tag() {
        let pattern = Pattern::TimeBased { hour: 9, count: 4 };
        let value = serde_json::to_value(&pattern).unwrap();
        assert_eq!(value["type"], "time_based");
        assert_eq!(value["hour"], 9);
        assert_eq!(pattern.count(), Some(4));
        assert!(pattern.description().contains("09:00"));
    }
}
