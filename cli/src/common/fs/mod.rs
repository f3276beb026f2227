//! # Nexlayer Filesystem Utilities (`common::fs`)
//!
//! File: cli/src/common/fs/mod.rs
//!
//! ## Overview
//!
//! Filesystem helpers shared by the detection engine and the commands.
//!
//! - **`glob`**: brace-expanding glob walks that skip dependency and build
//!   directories.
//! - **`io`**: directory checks, config reads and writing the generated
//!   descriptor.
//! - **`probe`**: the per-pass cached `FileProbe` every detector reads
//!   through.
//!
//! ## Usage
//!
//! ```rust
//! use crate::common::fs::{io, probe::FileProbe};
//!
//! let project = io::resolve_project_dir(Path::new("."))?;
//! let probe = FileProbe::new();
//! let has_manifest = probe.exists(&project.join("package.json"));
//! ```
//!

/// Brace-expanding glob matching over project trees.
pub mod glob;
/// Basic file I/O operations (e.g., `resolve_project_dir`, `write_string_to_file`).
pub mod io;
/// Cached file existence and content lookups for one detection pass.
pub mod probe;
