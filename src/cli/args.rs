//! CLI argument parsing

use crate::io::storage::DEFAULT_STORE_DIR;
use crate::models::{FeedbackSeverity, FeedbackStatus, FeedbackType, MetricValue};

#[derive(Debug, Clone)]
pub struct CliArgs {
    pub store: String,
    pub config: Option<String>,
    pub json: bool,
    pub command: Command,
}

#[derive(Debug, Clone)]
pub enum Command {
    Add(AddArgs),
    List(ListArgs),
    Status { id: String, status: FeedbackStatus },
    Analyze { window_days: Option<i64> },
    Patterns { min_weight: f64 },
    Suggest { top: Option<usize> },
    Export { path: String },
    Import { path: String },
    Stats,
}

#[derive(Debug, Clone)]
pub struct AddArgs {
    pub plan_id: String,
    pub feedback_type: FeedbackType,
    pub severity: FeedbackSeverity,
    pub title: String,
    pub description: String,
    pub step_index: Option<u32>,
    pub metrics: Vec<(String, MetricValue)>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ListArgs {
    pub plan_id: Option<String>,
    pub feedback_type: Option<FeedbackType>,
    pub severity: Option<FeedbackSeverity>,
    pub status: Option<FeedbackStatus>,
}

/// Default minimum weight for `patterns`
pub const DEFAULT_MIN_WEIGHT: f64 = 0.7;

/// Parse command line arguments
///
/// Global options (`--store`, `--config`, `--json`) come before the command.
pub fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut store = DEFAULT_STORE_DIR.to_string();
    let mut config = None;
    let mut json = false;
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--store" => store = required_value(args, &mut i, "--store", "a directory")?,
            "--config" => config = Some(required_value(args, &mut i, "--config", "a file path")?),
            "--json" => json = true,
            arg if arg.starts_with("--") => return Err(format!("Unknown option: {arg}")),
            _ => break,
        }
        i += 1;
    }

    let Some(name) = args.get(i) else {
        return Err("No command specified".to_string());
    };
    let rest = &args[i + 1..];

    let command = match name.as_str() {
        "add" => Command::Add(parse_add_args(rest)?),
        "list" => Command::List(parse_list_args(rest)?),
        "status" => parse_status_args(rest)?,
        "analyze" => {
            let mut window_days = None;
            parse_options(rest, |opt, value| match opt {
                "--window-days" => {
                    let days: i64 = value()?
                        .parse()
                        .map_err(|_| "--window-days must be a positive integer".to_string())?;
                    if days <= 0 {
                        return Err("--window-days must be greater than zero".to_string());
                    }
                    window_days = Some(days);
                    Ok(())
                }
                _ => Err(format!("Unknown option: {opt}")),
            })?;
            Command::Analyze { window_days }
        }
        "patterns" => {
            let mut min_weight = DEFAULT_MIN_WEIGHT;
            parse_options(rest, |opt, value| match opt {
                "--min-weight" => {
                    min_weight = value()?
                        .parse()
                        .map_err(|_| "--min-weight must be a number".to_string())?;
                    if !(0.0..=1.0).contains(&min_weight) {
                        return Err("--min-weight must be between 0 and 1".to_string());
                    }
                    Ok(())
                }
                _ => Err(format!("Unknown option: {opt}")),
            })?;
            Command::Patterns { min_weight }
        }
        "suggest" => {
            let mut top = None;
            parse_options(rest, |opt, value| match opt {
                "--top" => {
                    top = Some(
                        value()?
                            .parse()
                            .map_err(|_| "--top must be a number".to_string())?,
                    );
                    Ok(())
                }
                _ => Err(format!("Unknown option: {opt}")),
            })?;
            Command::Suggest { top }
        }
        "export" => Command::Export {
            path: single_positional(rest, "FILE")?,
        },
        "import" => Command::Import {
            path: single_positional(rest, "FILE")?,
        },
        "stats" => {
            if let Some(extra) = rest.first() {
                return Err(format!("Unexpected argument: {extra}"));
            }
            Command::Stats
        }
        _ => return Err(format!("Unknown command: {name}")),
    };

    Ok(CliArgs {
        store,
        config,
        json,
        command,
    })
}

fn parse_add_args(args: &[String]) -> Result<AddArgs, String> {
    let mut plan_id = None;
    let mut feedback_type = None;
    let mut severity = None;
    let mut title = None;
    let mut description = String::new();
    let mut step_index = None;
    let mut metrics = Vec::new();
    let mut tags = Vec::new();
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "--plan" => plan_id = Some(required_value(args, &mut i, "--plan", "a value")?),
            "--type" => {
                let raw = required_value(args, &mut i, "--type", "a value")?;
                feedback_type = Some(raw.parse::<FeedbackType>()?);
            }
            "--severity" => {
                let raw = required_value(args, &mut i, "--severity", "a value")?;
                severity = Some(raw.parse::<FeedbackSeverity>()?);
            }
            "--title" => title = Some(required_value(args, &mut i, "--title", "a value")?),
            "--description" => {
                description = required_value(args, &mut i, "--description", "a value")?;
            }
            "--step" => {
                let raw = required_value(args, &mut i, "--step", "a value")?;
                step_index = Some(
                    raw.parse()
                        .map_err(|_| "--step must be a non-negative integer".to_string())?,
                );
            }
            "--metric" => {
                let raw = required_value(args, &mut i, "--metric", "KEY=VALUE")?;
                metrics.push(parse_metric(&raw)?);
            }
            "--tag" => tags.push(required_value(args, &mut i, "--tag", "a value")?),
            arg if arg.starts_with("--") => return Err(format!("Unknown option: {arg}")),
            arg => return Err(format!("Unexpected argument: {arg}")),
        }
        i += 1;
    }

    Ok(AddArgs {
        plan_id: plan_id.ok_or("Missing required option: --plan")?,
        feedback_type: feedback_type.ok_or("Missing required option: --type")?,
        severity: severity.ok_or("Missing required option: --severity")?,
        title: title.ok_or("Missing required option: --title")?,
        description,
        step_index,
        metrics,
        tags,
    })
}

fn parse_list_args(args: &[String]) -> Result<ListArgs, String> {
    let mut list = ListArgs::default();
    parse_options(args, |opt, value| {
        match opt {
            "--plan" => list.plan_id = Some(value()?),
            "--type" => list.feedback_type = Some(value()?.parse()?),
            "--severity" => list.severity = Some(value()?.parse()?),
            "--status" => list.status = Some(value()?.parse()?),
            _ => return Err(format!("Unknown option: {opt}")),
        }
        Ok(())
    })?;
    Ok(list)
}

fn parse_status_args(args: &[String]) -> Result<Command, String> {
    match args {
        [id, status] if !id.starts_with("--") && !status.starts_with("--") => Ok(Command::Status {
            id: id.clone(),
            status: status.parse()?,
        }),
        [] | [_] => Err("Missing required arguments: ID STATUS".to_string()),
        [_, _, extra, ..] => Err(format!("Unexpected argument: {extra}")),
        [a, b] => {
            let bad = if a.starts_with("--") { a } else { b };
            Err(format!("Unknown option: {bad}"))
        }
    }
}

/// `KEY=VALUE`; numeric values become numbers, anything else stays text
pub fn parse_metric(raw: &str) -> Result<(String, MetricValue), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => {
            Ok((key.to_string(), MetricValue::parse_lossy(value)))
        }
        _ => Err(format!("Invalid metric {raw:?}, expected KEY=VALUE")),
    }
}

/// Walk `--option value` pairs, handing each option to `handle`
///
/// `handle` receives the option name and a closure that consumes its value.
fn parse_options<F>(args: &[String], mut handle: F) -> Result<(), String>
where
    F: FnMut(&str, &mut dyn FnMut() -> Result<String, String>) -> Result<(), String>,
{
    let mut i = 0;
    while i < args.len() {
        let opt = args[i].as_str();
        if !opt.starts_with("--") {
            return Err(format!("Unexpected argument: {opt}"));
        }
        let mut take_value = || required_value(args, &mut i, opt, "a value");
        handle(opt, &mut take_value)?;
        i += 1;
    }
    Ok(())
}

fn required_value(args: &[String], i: &mut usize, opt: &str, what: &str) -> Result<String, String> {
    *i += 1;
    args.get(*i)
        .cloned()
        .ok_or_else(|| format!("{opt} requires {what}"))
}

fn single_positional(args: &[String], name: &str) -> Result<String, String> {
    match args {
        [] => Err(format!("Missing required argument: {name}")),
        [path] if path.starts_with("--") => Err(format!("Unknown option: {path}")),
        [path] => Ok(path.clone()),
        [_, extra, ..] => Err(format!("Unexpected argument: {extra}")),
    }
}
