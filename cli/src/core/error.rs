//! # Nexlayer Error Types
//!
//! File: cli/src/core/error.rs
//!
//! ## Overview
//!
//! This module defines the error types used throughout the Nexlayer CLI.
//! Two layers exist:
//!
//! - `DetectionError`: a tagged error produced by the detection engine. It
//!   carries a kind (`NotFound`, `Invalid`, `Unsupported`, `Internal`), a
//!   message and an optional wrapped cause.
//! - `NexlayerError`: the application-level enum surfaced by commands
//!   (configuration, filesystem, detection, generation, cancellation).
//!
//! Command code returns `Result<T>` (an alias for `anyhow::Result<T>`) so
//! context can be attached freely with `.context(...)`.
//!
//! ## Architecture
//!
//! `describe` and `to_json` turn any `anyhow::Error` into the text shown to
//! the user. Cancellation and timeouts are mapped to the fixed messages
//! "operation cancelled" and "operation timed out" regardless of where in the
//! chain they occur.
//!
//! ## Examples
//!
//! ```rust
//! use crate::core::error::{DetectionError, NexlayerError, Result};
//!
//! fn classify(found: bool) -> std::result::Result<(), DetectionError> {
//!     if !found {
//!         return Err(DetectionError::not_found("project type could not be detected"));
//!     }
//!     Ok(())
//! }
//!
//! // At the command layer:
//! // classify(false).map_err(NexlayerError::from)?;
//! ```
//!
use std::fmt;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use thiserror::Error;

/// Boxed cause attached to a `DetectionError`.
pub type BoxedCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The category of a detection failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionErrorKind {
    /// No detector produced a confident classification.
    NotFound,
    /// The input (e.g. the directory) is not usable.
    Invalid,
    /// The project uses something the engine does not handle.
    Unsupported,
    /// A failure inside the engine itself (cancellation, join failures).
    Internal,
}

impl fmt::Display for DetectionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotFound => "not found",
            Self::Invalid => "invalid",
            Self::Unsupported => "unsupported",
            Self::Internal => "internal",
        };
        f.write_str(label)
    }
}

/// Error produced by the detection engine.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct DetectionError {
    kind: DetectionErrorKind,
    message: String,
    #[source]
    cause: Option<BoxedCause>,
}

impl DetectionError {
    pub fn new(kind: DetectionErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            cause: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(DetectionErrorKind::NotFound, message)
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(DetectionErrorKind::Invalid, message)
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::new(DetectionErrorKind::Unsupported, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(DetectionErrorKind::Internal, message)
    }

    /// Attaches an underlying cause, preserved in the `source()` chain.
    pub fn with_cause<E>(mut self, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.cause = Some(Box::new(cause));
        self
    }

    pub fn kind(&self) -> DetectionErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == DetectionErrorKind::NotFound
    }

    pub fn is_unsupported(&self) -> bool {
        self.kind == DetectionErrorKind::Unsupported
    }

    /// True when the error records a cancelled detection pass.
    pub fn is_cancelled(&self) -> bool {
        self.kind == DetectionErrorKind::Internal && self.message == CANCELLED_MESSAGE
    }
}

/// Message carried by the `Internal` error returned on cancellation.
pub const CANCELLED_MESSAGE: &str = "detection cancelled";

/// Custom error type for the Nexlayer application.
#[derive(Error, Debug)]
pub enum NexlayerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Filesystem error: {0}")]
    FileSystem(String),

    #[error("Detection failed ({}): {source}", .source.kind())]
    Detection {
        #[from]
        source: DetectionError,
    },

    #[error("YAML generation error: {0}")]
    Generation(String),

    #[error("'{path}' already exists. Use --force to overwrite it.")]
    AlreadyExists { path: String },

    #[error("operation cancelled")]
    Cancelled,

    #[error("operation timed out")]
    TimedOut,
}

/// Type alias for Result using anyhow::Error for broad compatibility.
pub type Result<T> = anyhow::Result<T>;

/// Returns the user-facing message for an error chain.
///
/// Cancellation and timeouts anywhere in the chain win over the outer
/// context so the user always sees the explicit wording.
pub fn describe(err: &anyhow::Error) -> String {
    match classify(err) {
        ErrorClass::Cancelled => "operation cancelled".to_string(),
        ErrorClass::TimedOut => "operation timed out".to_string(),
        _ => err.to_string(),
    }
}

/// Structured error object printed in JSON output mode.
#[derive(Debug, Serialize)]
pub struct JsonError {
    pub error: String,
    pub kind: &'static str,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<String>,
}

/// Builds the JSON error object for `err`.
pub fn to_json(err: &anyhow::Error) -> JsonError {
    JsonError {
        error: describe(err),
        kind: classify(err).label(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        causes: err.chain().skip(1).map(|c| c.to_string()).collect(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ErrorClass {
    Cancelled,
    TimedOut,
    Detection(DetectionErrorKind),
    Config,
    FileSystem,
    Other,
}

impl ErrorClass {
    fn label(self) -> &'static str {
        match self {
            Self::Cancelled => "cancelled",
            Self::TimedOut => "timeout",
            Self::Detection(DetectionErrorKind::NotFound) => "detection_not_found",
            Self::Detection(DetectionErrorKind::Invalid) => "detection_invalid",
            Self::Detection(DetectionErrorKind::Unsupported) => "detection_unsupported",
            Self::Detection(DetectionErrorKind::Internal) => "detection_internal",
            Self::Config => "config",
            Self::FileSystem => "filesystem",
            Self::Other => "error",
        }
    }
}

fn classify(err: &anyhow::Error) -> ErrorClass {
    let mut class = ErrorClass::Other;
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<NexlayerError>() {
            match e {
                NexlayerError::Cancelled => return ErrorClass::Cancelled,
                NexlayerError::TimedOut => return ErrorClass::TimedOut,
                NexlayerError::Config(_) if class == ErrorClass::Other => {
                    class = ErrorClass::Config
                }
                NexlayerError::FileSystem(_) if class == ErrorClass::Other => {
                    class = ErrorClass::FileSystem
                }
                _ => {}
            }
        }
        if let Some(e) = cause.downcast_ref::<DetectionError>() {
            if e.is_cancelled() {
                return ErrorClass::Cancelled;
            }
            if class == ErrorClass::Other {
                class = ErrorClass::Detection(e.kind());
            }
        }
        if cause.downcast_ref::<tokio::time::error::Elapsed>().is_some() {
            return ErrorClass::TimedOut;
        }
    }
    class
}
