//! # Nexlayer Init Command
//!
//! File: cli/src/commands/init.rs
//!
//! ## Overview
//!
//! Implements `nexlayer init`, which detects the project in a directory and
//! writes a `nexlayer.yaml` deployment descriptor for it.
//!
//! ## Architecture
//!
//! 1. Resolve the project directory and load configuration for it.
//! 2. Refuse to overwrite an existing descriptor unless `--force` is given.
//! 3. Run a full detection pass. A project that cannot be classified, or
//!    belongs to an unsupported ecosystem, is not an error: the generic nginx
//!    template is used and a warning printed.
//! 4. Build the descriptor, apply the `--pod-*` overrides to the primary
//!    pod and write the file.
//!
//! ## Examples
//!
//! ```bash
//! # Detect the current directory and write ./nexlayer.yaml
//! nexlayer init
//!
//! # Another directory, custom app name and port for the main pod
//! nexlayer init ../api --name billing --pod-port 9000
//!
//! # Regenerate an existing descriptor
//! nexlayer init --force
//! ```
//!
use crate::commands::{run_detection, GlobalArgs};
use crate::common::fs::io;
use crate::core::config::{self, Config};
use crate::core::error::{NexlayerError, Result};
use crate::detection::registry::DetectorRegistry;
use crate::detection::types::ProjectInfo;
use crate::generator::{PodOverrides, YamlGenerator};
use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// # Init Arguments (`InitArgs`)
///
/// Arguments of `nexlayer init`.
#[derive(Parser, Debug)]
#[command(
    about = "Detect the project and generate nexlayer.yaml",
    long_about = "Detects the project type in DIRECTORY (default: current directory) and\n\
                  writes a Nexlayer deployment descriptor for it. Unrecognized projects\n\
                  get a single nginx pod that can be edited by hand."
)]
pub struct InitArgs {
    /// Project directory to inspect.
    #[arg(default_value = ".")]
    directory: PathBuf,

    /// Application name (defaults to the detected project name).
    #[arg(long, short = 'n')]
    name: Option<String>,

    /// Name of the primary pod.
    #[arg(long)]
    pod_name: Option<String>,

    /// Image of the primary pod.
    #[arg(long)]
    pod_image: Option<String>,

    /// Service port of the primary pod.
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    pod_port: Option<u16>,

    /// HTTP route prefix of the primary pod.
    #[arg(long)]
    pod_path: Option<String>,

    /// Output file (relative paths are resolved against the project directory).
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Overwrite an existing descriptor.
    #[arg(long, short = 'f')]
    force: bool,
}

impl InitArgs {
    fn overrides(&self) -> PodOverrides {
        PodOverrides {
            name: self.pod_name.clone(),
            image: self.pod_image.clone(),
            port: self.pod_port,
            path: self.pod_path.clone(),
        }
    }
}

/// # Handle Init Command (`handle_init`)
///
/// Detects the project, generates the descriptor and writes it.
///
/// ## Returns
///
/// * `Ok(())` once the file is written.
/// * `Err` if the directory is invalid, the output exists without `--force`,
///   detection is cancelled or times out, or writing fails.
pub async fn handle_init(args: InitArgs, globals: &GlobalArgs) -> Result<()> {
    info!("Handling init command for {}", args.directory.display());

    let project_dir = io::resolve_project_dir(&args.directory)?;
    let cfg = config::load_config(globals.config.as_deref(), &project_dir)
        .context("Failed to load Nexlayer configuration")?;

    let output = output_path(&args, &cfg, &project_dir);
    if output.exists() && !args.force {
        return Err(NexlayerError::AlreadyExists {
            path: display_path(&output),
        }
        .into());
    }

    let mut info = detect_or_fallback(&project_dir, &cfg).await?;
    if let Some(name) = &args.name {
        info.name = name.clone();
    }
    debug!("Project info: {:?}", info);

    let generator = YamlGenerator::from_config(&cfg.generator).with_overrides(args.overrides());
    let yaml = generator.generate(&info)?;
    // Read back what will be written so the summary reflects the file.
    let descriptor = crate::generator::parse(&yaml)?;
    io::write_string_to_file(&output, &yaml)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    let pods = &descriptor.application.pods;
    if globals.json {
        let pod_summary: Vec<_> = pods
            .iter()
            .map(|p| serde_json::json!({"name": p.name, "type": p.pod_type, "port": p.primary_port()}))
            .collect();
        println!(
            "{}",
            serde_json::json!({
                "output": output,
                "type": info.project_type,
                "application": descriptor.application.name,
                "pods": pod_summary,
            })
        );
    } else {
        println!(
            "✅ Created {} for {} ({} pod{})",
            display_path(&output),
            info.project_type.label(),
            pods.len(),
            if pods.len() == 1 { "" } else { "s" }
        );
        for pod in pods {
            match pod.primary_port() {
                Some(port) => println!("   {} ({}) on port {}", pod.name, pod.pod_type, port),
                None => println!("   {} ({})", pod.name, pod.pod_type),
            }
        }
        println!("   Review the image references before deploying.");
    }
    Ok(())
}

fn output_path(args: &InitArgs, cfg: &Config, project_dir: &Path) -> PathBuf {
    let file = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&cfg.generator.output_file));
    if file.is_absolute() {
        file
    } else {
        project_dir.join(file)
    }
}

/// `path` relative to the working directory when that is shorter to read.
fn display_path(path: &Path) -> String {
    std::env::current_dir()
        .ok()
        .and_then(|cwd| pathdiff::diff_paths(path, cwd))
        .filter(|rel| !rel.starts_with(".."))
        .unwrap_or_else(|| path.to_path_buf())
        .display()
        .to_string()
}

/// Full detection pass; an unclassifiable project yields the generic fallback.
async fn detect_or_fallback(project_dir: &Path, cfg: &Config) -> Result<ProjectInfo> {
    let registry = DetectorRegistry::from_config(&cfg.detection);
    let outcome = run_detection(cfg.detection.overall_timeout(), |cancel| async move {
        registry.detect_project(project_dir, &cancel).await
    })
    .await;

    match outcome {
        Ok(info) => {
            info!(
                "Detected {} with {} confidence",
                info.project_type, info.confidence
            );
            Ok(info)
        }
        Err(NexlayerError::Detection { source })
            if source.is_not_found() || source.is_unsupported() =>
        {
            warn!("{}; using the generic template", source.message());
            eprintln!("⚠️  Could not detect the project type; writing a generic nginx template.");
            let name = project_dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "app".to_string());
            Ok(ProjectInfo::fallback(name))
        }
        Err(e) => Err(e.into()),
    }
}
