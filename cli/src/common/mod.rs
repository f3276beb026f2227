//! # Nexlayer Common Utilities (`common`)
//!
//! File: cli/src/common/mod.rs
//!
//! ## Overview
//!
//! Shared utilities used by the commands and the detection engine. Only
//! filesystem concerns live here today:
//!
//! - **`fs::io`**: project directory resolution and file reads/writes.
//! - **`fs::glob`**: glob expansion relative to a project root.
//! - **`fs::probe`**: the cached, read-only file probe detectors share.
//!
//! ```rust
//! use crate::common::fs::io;
//!
//! let project = io::resolve_project_dir(Path::new("."))?;
//! ```
//!
/// Filesystem helpers (I/O, globbing, cached probing).
pub mod fs;
