//! Feedback CLI (fbk) - Main binary entry point

use feedback::cli::args::{AddArgs, CliArgs, Command, ListArgs, parse_args};
use feedback::cli::output::{
    format_analysis, format_feedback_list, format_json, format_patterns, format_stats,
    format_suggestions,
};
use feedback::io::snapshot::{read_snapshot, write_snapshot};
use feedback::io::storage::FeedbackStorage;
use feedback::services::analyzer::FeedbackAnalyzer;
use feedback::services::collector::{FeedbackCollector, NewFeedback};
use feedback::services::pattern_matcher::PatternMatcher;
use feedback::services::suggester::ImprovementSuggester;
use feedback::{Config, Error, Feedback, FeedbackStatus};
use std::process;

fn main() {
    // Initialize logger (controlled by RUST_LOG environment variable)
    // Example: RUST_LOG=debug fbk analyze
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_help();
        return;
    }

    match args[1].as_str() {
        "--help" | "-h" => {
            print_help();
            return;
        }
        "--version" | "-v" => {
            print_version();
            return;
        }
        _ => {}
    }

    let cli_args = match parse_args(&args) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Use --help for usage information");
            process::exit(2);
        }
    };

    let exit_code = match run(&cli_args) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {e}");
            exit_code_for(&e)
        }
    };

    process::exit(exit_code);
}

fn exit_code_for(error: &Error) -> i32 {
    match error {
        Error::InvalidInput(_) => 2,
        Error::NotFound(_) => 3,
        _ => 4,
    }
}

fn run(cli: &CliArgs) -> feedback::Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let mut storage = FeedbackStorage::open(&cli.store)?;

    match &cli.command {
        Command::Add(add) => handle_add(&mut storage, add, cli.json),
        Command::List(list) => {
            handle_list(&storage, list, cli.json);
            Ok(())
        }
        Command::Status { id, status } => handle_status(&mut storage, id, *status, cli.json),
        Command::Analyze { window_days } => {
            let analysis = FeedbackAnalyzer::new()
                .analyze_feedbacks(&stored(&storage), window_days.map(time::Duration::days));
            if cli.json {
                println!("{}", format_json(&analysis));
            } else {
                print!("{}", format_analysis(&analysis));
            }
            Ok(())
        }
        Command::Patterns { min_weight } => {
            let matcher = PatternMatcher::with_config(config.pattern.clone());
            let patterns = matcher.find_patterns(&stored(&storage));
            let significant = matcher.significant_patterns(&patterns, *min_weight);
            if cli.json {
                println!("{}", format_json(&significant));
            } else {
                print!("{}", format_patterns(&significant));
            }
            Ok(())
        }
        Command::Suggest { top } => {
            let mut suggester = ImprovementSuggester::with_config(&config);
            let mut suggestions = suggester.analyze_feedbacks(&stored(&storage));
            if let Some(k) = top {
                suggestions.truncate(*k);
            }
            if cli.json {
                println!("{}", format_json(&suggestions));
            } else {
                print!("{}", format_suggestions(&suggestions));
            }
            Ok(())
        }
        Command::Export { path } => {
            let feedbacks = stored(&storage);
            write_snapshot(path, &feedbacks)?;
            eprintln!("Exported {} feedback to {path}", feedbacks.len());
            Ok(())
        }
        Command::Import { path } => {
            let feedbacks = read_snapshot(path)?;
            for feedback in &feedbacks {
                storage.save_feedback(feedback)?;
            }
            eprintln!("Imported {} feedback from {path}", feedbacks.len());
            Ok(())
        }
        Command::Stats => {
            let stats = storage.storage_stats()?;
            if cli.json {
                println!("{}", format_json(&stats));
            } else {
                print!("{}", format_stats(&stats));
            }
            Ok(())
        }
    }
}

fn stored(storage: &FeedbackStorage) -> Vec<Feedback> {
    storage.all_feedbacks().into_iter().cloned().collect()
}

fn handle_add(storage: &mut FeedbackStorage, args: &AddArgs, json: bool) -> feedback::Result<()> {
    let mut input = NewFeedback::new(
        args.plan_id.clone(),
        args.feedback_type,
        args.severity,
        args.title.clone(),
        args.description.clone(),
    );
    input.step_index = args.step_index;
    input.metrics.extend(args.metrics.iter().cloned());
    input.tags.extend(args.tags.iter().cloned());

    let feedback = FeedbackCollector::new().create_feedback(input);
    storage.save_feedback(&feedback)?;

    if json {
        println!("{}", format_json(&feedback));
    } else {
        println!("{}", feedback.id);
    }
    Ok(())
}

fn handle_list(storage: &FeedbackStorage, args: &ListArgs, json: bool) {
    let feedbacks: Vec<&Feedback> = storage
        .all_feedbacks()
        .into_iter()
        .filter(|f| args.plan_id.as_ref().is_none_or(|p| &f.plan_id == p))
        .filter(|f| args.feedback_type.is_none_or(|t| f.feedback_type == t))
        .filter(|f| args.severity.is_none_or(|s| f.severity == s))
        .filter(|f| args.status.is_none_or(|s| f.status == s))
        .collect();

    if json {
        println!("{}", format_json(&feedbacks));
    } else {
        print!("{}", format_feedback_list(&feedbacks));
    }
}

fn handle_status(
    storage: &mut FeedbackStorage,
    id: &str,
    status: FeedbackStatus,
    json: bool,
) -> feedback::Result<()> {
    let mut feedback = storage
        .get_feedback(id)
        .cloned()
        .ok_or_else(|| Error::NotFound(format!("feedback {id}")))?;
    feedback.update_status(status);
    storage.update_feedback(&feedback)?;

    if json {
        println!("{}", format_json(&feedback));
    } else {
        println!("{} -> {}", feedback.id, feedback.status);
    }
    Ok(())
}

fn print_help() {
    println!("Feedback CLI (fbk) - Turn execution feedback into prioritised improvements");
    println!();
    println!("USAGE:");
    println!("    fbk [GLOBAL OPTIONS] <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    add        Record a new feedback item");
    println!("    list       List stored feedback");
    println!("    status     Change the status of a feedback item");
    println!("    analyze    Summarise stored feedback");
    println!("    patterns   Show significant recurring patterns");
    println!("    suggest    Derive prioritised improvement suggestions");
    println!("    export     Write all feedback to a Parquet snapshot");
    println!("    import     Load feedback from a Parquet snapshot");
    println!("    stats      Show store statistics");
    println!();
    println!("GLOBAL OPTIONS (before the command):");
    println!("    --store <DIR>             Feedback store directory (default: data/feedback)");
    println!("    --config <FILE>           JSON configuration file");
    println!("    --json                    Emit machine-readable output");
    println!("    -h, --help                Show this help message");
    println!("    -v, --version             Show version information");
    println!();
    println!("ADD OPTIONS:");
    println!("    --plan <ID>               Plan the feedback belongs to (required)");
    println!("    --type <TYPE>             execution|performance|usability|error|suggestion|resource|other");
    println!("    --severity <SEVERITY>     low|medium|high|critical");
    println!("    --title <TEXT>            Short summary (required)");
    println!("    --description <TEXT>      Longer description");
    println!("    --step <N>                Plan step index");
    println!("    --metric <KEY=VALUE>      Attach a metric (repeatable)");
    println!("    --tag <TAG>               Attach a tag (repeatable)");
    println!();
    println!("LIST OPTIONS:");
    println!("    --plan <ID>  --type <TYPE>  --severity <SEVERITY>  --status <STATUS>");
    println!();
    println!("OTHER OPTIONS:");
    println!("    status <ID> <STATUS>      new|in_review|accepted|rejected|implemented|closed");
    println!("    analyze --window-days <N> Only consider the last N days");
    println!("    patterns --min-weight <W> Minimum pattern weight (default: 0.7)");
    println!("    suggest --top <K>         Show only the top K suggestions");
    println!();
    println!("EXAMPLES:");
    println!("    fbk add --plan p1 --type performance --severity high --title \"Slow step\" --metric response_time=950");
    println!("    fbk --json suggest --top 5");
    println!("    fbk export feedback.parquet");
}

fn print_version() {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const COMMIT: &str = env!("FBK_COMMIT");
    const COMMIT_DATE: &str = env!("FBK_COMMIT_DATE");
    const TARGET: &str = env!("FBK_TARGET");

    println!("fbk {VERSION}");
    println!("Commit: {COMMIT} ({COMMIT_DATE})");
    println!("Target: {TARGET}");

    #[cfg(debug_assertions)]
    println!("Build: debug");
    #[cfg(not(debug_assertions))]
    println!("Build: release");
}
