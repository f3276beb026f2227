//! # Nexlayer Main Entry Point
//!
//! File: cli/src/main.rs
//!
//! ## Overview
//!
//! This file serves as the main entry point for the Nexlayer CLI.
//! It handles:
//! - Command-line argument parsing using Clap
//! - Setting up the logging system based on verbosity flags
//! - Routing execution to the command handlers
//! - Rendering errors as text or, with `--json`, as a JSON object
//!
//! ## Architecture
//!
//! - `commands`: `init` and `detect`, plus the flags shared by both
//! - `detection`: the detector set, registry, cache and stack catalog
//! - `generator`: the `nexlayer.yaml` schema and pod templates
//! - `common` / `core`: filesystem helpers, configuration and errors
//!
//! ## Examples
//!
//! ```bash
//! # Generate nexlayer.yaml for the current directory
//! nexlayer init
//!
//! # Inspect another project with debug logging and JSON output
//! nexlayer -vv detect ../shop --json
//! ```
//!
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod common;
mod core;
mod detection;
mod generator;

use commands::GlobalArgs;

/// Defines the top-level command-line arguments structure using Clap's derive macros.
#[derive(Parser, Debug)]
#[command(
    name = "nexlayer",
    about = "Nexlayer CLI: detect your project and generate its deployment descriptor",
    long_about = "Detects the framework, stack and AI integrations of a project and\n\
                  generates a nexlayer.yaml deployment descriptor for it.",
    propagate_version = true,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[command(flatten)]
    globals: GlobalArgs,
}

#[derive(Parser, Debug)]
enum Commands {
    #[command(alias = "i")]
    Init(commands::init::InitArgs),
    #[command(alias = "d")]
    Detect(commands::detect::DetectArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.globals.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    let globals = &cli.globals;
    let command_result = match cli.command {
        Commands::Init(args) => commands::init::handle_init(args, globals).await,
        Commands::Detect(args) => commands::detect::handle_detect(args, globals).await,
    };

    if let Err(e) = command_result {
        tracing::error!("Command execution failed: {:?}", e);
        if globals.json {
            let body = crate::core::error::to_json(&e);
            match serde_json::to_string_pretty(&body) {
                Ok(text) => println!("{}", text),
                Err(_) => eprintln!("Error: {}", crate::core::error::describe(&e)),
            }
        } else {
            let message = crate::core::error::describe(&e);
            eprintln!("Error: {}", message);
            for cause in e.chain().skip(1).map(|c| c.to_string()) {
                if !message.contains(&cause) {
                    eprintln!("  Caused by: {}", cause);
                }
            }
        }
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_cmd::Command;
    use predicates::prelude::*;

    fn nexlayer_cmd() -> Command {
        Command::cargo_bin("nexlayer").expect("Failed to find nexlayer binary for testing")
    }

    #[test]
    fn test_main_help_flag() {
        nexlayer_cmd()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("init").and(predicate::str::contains("detect")));
    }

    #[test]
    fn test_main_version_flag() {
        nexlayer_cmd()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["nexlayer", "detect", "web", "--json", "-vv"]).unwrap();
        assert!(cli.globals.json);
        assert_eq!(cli.globals.verbose, 2);
        assert!(matches!(cli.command, Commands::Detect(_)));
    }
}
