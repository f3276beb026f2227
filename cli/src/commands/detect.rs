//! # Nexlayer Detect Command
//!
//! File: cli/src/commands/detect.rs
//!
//! ## Overview
//!
//! Implements `nexlayer detect`, which prints what the detection engine
//! finds in a directory without writing anything.
//!
//! By default a full, merged detection pass runs. `--first-match` switches to
//! the cheap sequential priority scan, and `--no-cache` drops any cached
//! report for the directory before detecting. With the global `--json` flag the result is printed as JSON.
//!
//! ## Examples
//!
//! ```bash
//! nexlayer detect
//! nexlayer detect ../web --json
//! nexlayer detect --first-match
//! ```
//!
use crate::commands::{run_detection, GlobalArgs};
use crate::common::fs::io;
use crate::core::config;
use crate::core::error::{DetectionError, Result};
use crate::detection::registry::{DetectionReport, DetectorRegistry};
use crate::detection::stacks;
use crate::detection::types::ProjectInfo;
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, trace};

#[derive(Parser, Debug)]
#[command(about = "Detect the project type without generating files")]
pub struct DetectArgs {
    /// Project directory to inspect.
    #[arg(default_value = ".")]
    directory: PathBuf,

    /// Stop at the first matching detector instead of merging all results.
    #[arg(long)]
    first_match: bool,

    /// Ignore cached detection results.
    #[arg(long)]
    no_cache: bool,
}

/// # Handle Detect Command (`handle_detect`)
///
/// Runs detection on the target directory and prints the result.
///
/// ## Returns
///
/// * `Ok(())` when a project type was detected.
/// * `Err` when nothing was detected, the directory is invalid, or the pass
///   was cancelled or timed out.
pub async fn handle_detect(args: DetectArgs, globals: &GlobalArgs) -> Result<()> {
    info!("Handling detect command for {}", args.directory.display());

    let project_dir = io::resolve_project_dir(&args.directory)?;
    let cfg = config::load_config(globals.config.as_deref(), &project_dir)
        .context("Failed to load Nexlayer configuration")?;
    let registry = Arc::new(DetectorRegistry::from_config(&cfg.detection));
    let limit = cfg.detection.overall_timeout();
    log_registry(&registry);

    let report = if args.first_match {
        let dir = project_dir.clone();
        let scanner = Arc::clone(&registry);
        let project = run_detection(limit, |_| async move {
            tokio::task::spawn_blocking(move || scanner.scan(&dir))
                .await
                .unwrap_or_else(|e| {
                    Err(DetectionError::internal("detector scan failed").with_cause(e))
                })
        })
        .await?;
        DetectionReport {
            project,
            ..Default::default()
        }
    } else {
        if args.no_cache && registry.cache().invalidate(&project_dir) {
            debug!("Dropped cached detection for {}", project_dir.display());
        }
        let detecting = Arc::clone(&registry);
        let dir = project_dir.clone();
        run_detection(limit, |cancel| async move {
            detecting.detect_report(&dir, &cancel).await
        })
        .await?
    };
    debug!("Filesystem accesses: {}", registry.stats().total());

    if globals.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn log_registry(registry: &DetectorRegistry) {
    let t = registry.thresholds();
    debug!(
        editor = t.editor,
        project_type = t.project_type,
        language = t.language,
        integration = t.integration,
        "Confidence thresholds"
    );
    for task in registry.tasks() {
        trace!(
            detector = task.detector().name(),
            weight = task.weight(),
            timeout_ms = task.timeout().as_millis() as u64,
            "Registered detector"
        );
    }
}

fn print_report(report: &DetectionReport) {
    for (label, value) in summary_lines(&report.project)
        .into_iter()
        .chain(stack_lines(&report.project))
    {
        println!("{:<12} {}", format!("{}:", label), value);
    }
    if !report.integrations.is_empty() {
        println!("{:<12} {}", "Integrations:", report.integrations.join(", "));
    }
    if let Some(detector) = &report.detector {
        println!("{:<12} {}", "Detector:", detector);
    }
}

/// Labelled lines for the fields that were detected.
fn summary_lines(info: &ProjectInfo) -> Vec<(&'static str, String)> {
    let mut lines = vec![
        ("Type", info.project_type.label().to_string()),
        ("Name", info.name.clone()),
        ("Confidence", info.confidence.to_string()),
    ];
    if info.port > 0 {
        lines.push(("Port", info.port.to_string()));
    }
    let optional = [
        ("Version", &info.version),
        ("Language", &info.language),
        ("Editor", &info.editor),
        ("LLM", &info.llm_provider),
        ("Model", &info.llm_model),
    ];
    for (label, value) in optional {
        if let Some(value) = value {
            lines.push((label, value.clone()));
        }
    }
    if info.has_docker {
        lines.push(("Docker", "yes".to_string()));
    }
    lines
}

/// Description and per-role components of a detected full-stack project.
fn stack_lines(info: &ProjectInfo) -> Vec<(&'static str, String)> {
    let Some(stack) = info
        .metadata
        .get("stack")
        .and_then(|v| v.as_str())
        .and_then(stacks::find)
    else {
        return Vec::new();
    };
    let mut lines = vec![("Stack", stack.name.to_string()), ("About", stack.description.to_string())];
    let c = &stack.components;
    let roles = [
        ("Frontend", &c.frontend),
        ("Backend", &c.backend),
        ("Database", &c.database),
        ("AI", &c.ai),
        ("Deployment", &c.deployment),
    ];
    for (label, ids) in roles {
        if !ids.is_empty() {
            lines.push((label, ids.join(", ")));
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::types::ProjectType;

    #[test]
    fn test_detect_args_parsing() {
        let args = DetectArgs::try_parse_from(["detect"]).unwrap();
        assert_eq!(args.directory, PathBuf::from("."));
        assert!(!args.first_match);
        assert!(!args.no_cache);

        let args = DetectArgs::try_parse_from(["detect", "web", "--first-match", "--no-cache"])
            .unwrap();
        assert_eq!(args.directory, PathBuf::from("web"));
        assert!(args.first_match);
        assert!(args.no_cache);
    }

    #[test]
    fn test_summary_lines_skip_missing_fields() {
        let info = ProjectInfo::new(ProjectType::Go, "svc", 0.85).with_port(8080);
        let labels: Vec<_> = summary_lines(&info).into_iter().map(|(l, _)| l).collect();
        assert_eq!(labels, vec!["Type", "Name", "Confidence", "Port"]);

        let mut info = ProjectInfo::new(ProjectType::OpenAiNode, "bot", 0.8).with_language("javascript");
        info.llm_provider = Some("openai".to_string());
        info.has_docker = true;
        let lines = summary_lines(&info);
        assert!(lines.contains(&("Language", "javascript".to_string())));
        assert!(lines.contains(&("LLM", "openai".to_string())));
        assert!(lines.contains(&("Docker", "yes".to_string())));
        assert!(!lines.iter().any(|(l, _)| *l == "Port"));
    }

    #[test]
    fn test_stack_lines_describe_roles() {
        assert!(stack_lines(&ProjectInfo::new(ProjectType::Go, "svc", 0.85)).is_empty());

        let info = ProjectInfo::new(ProjectType::NextjsSupabaseLangchain, "ai", 0.8)
            .with_metadata("stack", "nextjs-supabase-langchain");
        let lines = stack_lines(&info);
        assert_eq!(lines[0], ("Stack", "Next.js + Supabase + LangChain".to_string()));
        assert_eq!(lines[1].0, "About");
        assert!(lines.contains(&("Database", "supabase, pgvector".to_string())));
        assert!(lines.contains(&("AI", "langchain".to_string())));
        assert!(!lines.iter().any(|(l, _)| *l == "Deployment"));

        let unknown = ProjectInfo::new(ProjectType::Go, "svc", 0.85).with_metadata("stack", "nope");
        assert!(stack_lines(&unknown).is_empty());
    }
}
