//! # Nexlayer Filesystem I/O Operations
//!
//! File: cli/src/common/fs/io.rs
//!
//! ## Overview
//!
//! Small wrappers around `std::fs` used by the command layer: resolving the
//! project directory a command targets, reading configuration files and
//! writing the generated deployment descriptor.
//!
//! Detection itself never writes to disk and reads through the cached
//! `FileProbe` (see `common::fs::probe`) instead of these helpers.
//!
//! ## Architecture
//!
//! - **`resolve_project_dir`**: canonicalizes the target directory and checks
//!   that it exists and is a directory.
//! - **`ensure_dir_exists`**: `mkdir -p` that rejects paths occupied by files.
//! - **`read_file_to_string`**: `fs::read_to_string` with path context.
//! - **`write_string_to_file`**: writes content, creating parent directories.
//!
//! ## Usage
//!
//! ```rust
//! use crate::common::fs::io;
//!
//! let project = io::resolve_project_dir(Path::new("."))?;
//! io::write_string_to_file(&project.join("nexlayer.yaml"), &yaml)?;
//! ```
//!
use crate::core::error::{NexlayerError, Result};
use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Resolves `path` to an absolute, canonical project directory.
///
/// # Errors
///
/// Returns `NexlayerError::FileSystem` when the path does not exist or is not
/// a directory.
pub fn resolve_project_dir(path: &Path) -> Result<PathBuf> {
    if !path.exists() {
        anyhow::bail!(NexlayerError::FileSystem(format!(
            "Project directory does not exist: {}",
            path.display()
        )));
    }
    if !path.is_dir() {
        anyhow::bail!(NexlayerError::FileSystem(format!(
            "Project path is not a directory: {}",
            path.display()
        )));
    }
    path.canonicalize()
        .with_context(|| format!("Failed to resolve project directory {:?}", path))
}

/// Ensures that a directory exists at the specified path, creating parents.
///
/// # Errors
///
/// Returns an `Err` if the path exists but is not a directory, or if creating
/// it fails.
pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory {:?}", path))?;
        info!("Created directory: {:?}", path);
    } else if !path.is_dir() {
        anyhow::bail!(NexlayerError::FileSystem(format!(
            "Path exists but is not a directory: {:?}",
            path
        )));
    } else {
        debug!("Directory already exists: {:?}", path);
    }
    Ok(())
}

/// Reads the entire content of a file into a string.
pub fn read_file_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read file {:?}", path))
}

/// Writes string content to `path`, overwriting any existing file.
pub fn write_string_to_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir_exists(parent)?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write to file {:?}", path))?;
    info!("Wrote content to file: {:?}", path);
    Ok(())
}
