//! # Nexlayer Command Modules
//!
//! File: cli/src/commands/mod.rs
//!
//! ## Overview
//!
//! The subcommands of the `nexlayer` CLI:
//!
//! - `init`: detect the project and write `nexlayer.yaml`.
//! - `detect`: print what the detection engine sees.
//!
//! Each command defines its own `clap` arguments struct and an async
//! `handle_*` function. Flags shared by every command live in `GlobalArgs`.
//!
//! ## Architecture
//!
//! Both commands run detection through `run_detection`, which races the pass
//! against Ctrl-C and bounds it with the configured overall timeout. An
//! interrupt cancels the pass token and drops the pass. Cancellation and timeouts surface as
//! `NexlayerError::Cancelled` and `NexlayerError::TimedOut`.
//!
pub mod detect;
pub mod init;

use crate::core::error::{DetectionError, NexlayerError};
use clap::Args;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Flags accepted by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit machine-readable JSON (results and errors).
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file to use instead of the user config file.
    #[arg(long, global = true, env = "NEXLAYER_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Runs a detection future under Ctrl-C cancellation and a time limit.
pub(crate) async fn run_detection<T, F>(
    limit: Duration,
    detect: impl FnOnce(CancellationToken) -> F,
) -> Result<T, NexlayerError>
where
    F: Future<Output = Result<T, DetectionError>>,
{
    let cancel = CancellationToken::new();
    let detection = tokio::time::timeout(limit, detect(cancel.clone()));
    tokio::pin!(detection);

    // The Ctrl-C listener lives only as long as this select.
    let outcome = tokio::select! {
        outcome = &mut detection => outcome,
        Ok(()) = tokio::signal::ctrl_c() => {
            warn!("Interrupted, cancelling detection");
            cancel.cancel();
            return Err(NexlayerError::Cancelled);
        }
    };

    match outcome {
        Err(_) => {
            debug!("Detection exceeded {:?}", limit);
            cancel.cancel();
            Err(NexlayerError::TimedOut)
        }
        Ok(Err(e)) if e.is_cancelled() => Err(NexlayerError::Cancelled),
        Ok(Err(e)) => Err(NexlayerError::Detection { source: e }),
        Ok(Ok(value)) => Ok(value),
    }
}
