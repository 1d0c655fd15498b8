//! Unit tests for CLI argument parsing
#[cfg(test)]
mod tests {
    use feedback::cli::args::{Command, DEFAULT_MIN_WEIGHT, parse_args, parse_metric};
    use feedback::{FeedbackSeverity, FeedbackStatus, FeedbackType, MetricValue};

    fn make_args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_add_with_all_options() {
        let argv = make_args(&[
            "fbk",
            "add",
            "--plan",
            "plan-7",
            "--type",
            "performance",
            "--severity",
            "high",
            "--title",
            "Slow step",
            "--description",
            "Step 3 took too long",
            "--step",
            "3",
            "--metric",
            "response_time=950",
            "--metric",
            "host=db-1",
            "--tag",
            "slow",
        ]);

        let parsed = parse_args(&argv).expect("parse add args");
        let Command::Add(add) = parsed.command else {
            panic!("expected add command");
        };

        assert_eq!(add.plan_id, "plan-7");
        assert_eq!(add.feedback_type, FeedbackType::Performance);
        assert_eq!(add.severity, FeedbackSeverity::High);
        assert_eq!(add.title, "Slow step");
        assert_eq!(add.step_index, Some(3));
        assert_eq!(
            add.metrics,
            vec![
                ("response_time".to_string(), MetricValue::Int(950)),
                ("host".to_string(), MetricValue::Text("db-1".to_string())),
            ]
        );
        assert_eq!(add.tags, vec!["slow"]);
        assert_eq!(parsed.store, "data/feedback");
        assert!(!parsed.json);
    }

    #[test]
    fn test_parse_add_requires_core_fields() {
        let argv = make_args(&["fbk", "add", "--plan", "p", "--type", "error", "--severity", "low"]);
        let err = parse_args(&argv).unwrap_err();
        assert_eq!(err, "Missing required option: --title");
    }

    #[test]
    fn test_parse_add_rejects_unknown_type() {
        let argv = make_args(&["fbk", "add", "--type", "cosmic"]);
        let err = parse_args(&argv).unwrap_err();
        assert!(err.contains("cosmic"), "{err}");
    }

    #[test]
    fn test_parse_global_options_before_command() {
        let argv = make_args(&[
            "fbk",
            "--store",
            "/tmp/fb",
            "--config",
            "fbk.json",
            "--json",
            "list",
            "--type",
            "error",
            "--status",
            "in_review",
        ]);

        let parsed = parse_args(&argv).expect("parse list args");
        assert_eq!(parsed.store, "/tmp/fb");
        assert_eq!(parsed.config.as_deref(), Some("fbk.json"));
        assert!(parsed.json);

        let Command::List(list) = parsed.command else {
            panic!("expected list command");
        };
        assert_eq!(list.feedback_type, Some(FeedbackType::Error));
        assert_eq!(list.status, Some(FeedbackStatus::InReview));
        assert!(list.plan_id.is_none());
    }

    #[test]
    fn test_parse_status_command() {
        let parsed = parse_args(&make_args(&["fbk", "status", "fb-1", "closed"])).unwrap();
        let Command::Status { id, status } = parsed.command else {
            panic!("expected status command");
        };
        assert_eq!(id, "fb-1");
        assert_eq!(status, FeedbackStatus::Closed);

        let err = parse_args(&make_args(&["fbk", "status", "fb-1"])).unwrap_err();
        assert_eq!(err, "Missing required arguments: ID STATUS");
    }

    #[test]
    fn test_parse_patterns_defaults_and_bounds() {
        let parsed = parse_args(&make_args(&["fbk", "patterns"])).unwrap();
        let Command::Patterns { min_weight } = parsed.command else {
            panic!("expected patterns command");
        };
        assert_eq!(min_weight, DEFAULT_MIN_WEIGHT);

        let err = parse_args(&make_args(&["fbk", "patterns", "--min-weight", "2"])).unwrap_err();
        assert!(err.contains("between 0 and 1"));
    }

    #[test]
    fn test_parse_analyze_window() {
        let parsed = parse_args(&make_args(&["fbk", "analyze", "--window-days", "14"])).unwrap();
        assert!(matches!(parsed.command, Command::Analyze { window_days: Some(14) }));

        let err = parse_args(&make_args(&["fbk", "analyze", "--window-days", "0"])).unwrap_err();
        assert!(err.contains("greater than zero"));
    }

    #[test]
    fn test_parse_suggest_and_snapshot_commands() {
        let parsed = parse_args(&make_args(&["fbk", "suggest", "--top", "3"])).unwrap();
        assert!(matches!(parsed.command, Command::Suggest { top: Some(3) }));

        let parsed = parse_args(&make_args(&["fbk", "export", "out.parquet"])).unwrap();
        assert!(matches!(parsed.command, Command::Export { ref path } if path == "out.parquet"));

        let err = parse_args(&make_args(&["fbk", "import"])).unwrap_err();
        assert_eq!(err, "Missing required argument: FILE");
    }

    #[test]
    fn test_missing_values_and_unknown_input_are_reported() {
        assert_eq!(
            parse_args(&make_args(&["fbk", "suggest", "--top"])).unwrap_err(),
            "--top requires a value"
        );
        assert_eq!(
            parse_args(&make_args(&["fbk", "--store"])).unwrap_err(),
            "--store requires a directory"
        );
        assert_eq!(
            parse_args(&make_args(&["fbk", "list", "--color"])).unwrap_err(),
            "Unknown option: --color"
        );
        assert_eq!(
            parse_args(&make_args(&["fbk", "frobnicate"])).unwrap_err(),
            "Unknown command: frobnicate"
        );
        assert_eq!(
            parse_args(&make_args(&["fbk", "--json"])).unwrap_err(),
            "No command specified"
        );
        assert_eq!(
            parse_args(&make_args(&["fbk", "stats", "extra"])).unwrap_err(),
            "Unexpected argument: extra"
        );
    }

    #[test]
    fn test_metric_arguments_need_a_key() {
        assert_eq!(
            parse_metric("ratio=0.5"),
            Ok(("ratio".to_string(), MetricValue::Float(0.5)))
        );
        assert!(parse_metric("=5").is_err());
        assert!(parse_metric("novalue").is_err());
    }
}
