//! # Detectors
//!
//! File: cli/src/detection/detectors/mod.rs
//!
//! ## Overview
//!
//! A detector inspects a project through a `DetectionContext` and either
//! proposes a `ProjectInfo` (with a confidence) or has no opinion. Detectors
//! are stateless; all caching happens in the pass-wide `FileProbe`.
//!
//! ## Architecture
//!
//! Every detector belongs to one `DetectorKind`, which decides how the
//! registry merges its output:
//!
//! - **`framework`**: single-technology classifiers (Next.js, React, Vue,
//!   Svelte, Bun, Node, Python, Go, Docker).
//! - **`composite`**: full-stack combinations (MERN, PERN, MEAN).
//! - **`stack`**: the catalog-driven `StackDetector`.
//! - **`integration`**: services and libraries used by a project (OpenAI,
//!   LangChain, Supabase, Stripe, Gemini, PostgreSQL, pgvector, Tailwind).
//!   They never classify the project; they enrich the result.
//! - **`editor`**: the AI-assistant/editor detector.
//!
//! Framework, composite and stack detectors compete for the project type.
//! `builtin()` returns the default set in registration order.
//!
//! ## Examples
//!
//! ```rust
//! let ctx = DetectionContext::for_root("/path/to/project");
//! for detector in detectors::builtin() {
//!     if let Some(info) = detector.detect(&ctx)? {
//!         println!("{} -> {} ({})", detector.name(), info.project_type, info.confidence);
//!     }
//! }
//! ```
//!
pub mod composite;
pub mod editor;
pub mod framework;
pub mod integration;
pub mod stack;

use crate::core::error::DetectionError;
use crate::detection::context::DetectionContext;
use crate::detection::types::ProjectInfo;
use std::fmt;
use std::sync::Arc;

/// How a detector's output is merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetectorKind {
    Framework,
    Composite,
    Stack,
    Integration,
    Editor,
}

impl DetectorKind {
    /// True for kinds whose output competes for the project type.
    pub fn classifies(self) -> bool {
        matches!(self, Self::Framework | Self::Composite | Self::Stack)
    }
}

impl fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Framework => "framework",
            Self::Composite => "composite",
            Self::Stack => "stack",
            Self::Integration => "integration",
            Self::Editor => "editor",
        })
    }
}

pub type DetectResult = Result<Option<ProjectInfo>, DetectionError>;

pub trait Detector: Send + Sync {
    /// Stable identifier used in logs and metadata.
    fn name(&self) -> &'static str;

    /// Higher runs earlier in priority scans and wins confidence ties.
    fn priority(&self) -> i32;

    fn kind(&self) -> DetectorKind;

    /// `Ok(None)` means "no opinion".
    fn detect(&self, ctx: &DetectionContext) -> DetectResult;
}

/// The built-in detector set.
pub fn builtin() -> Vec<Arc<dyn Detector>> {
    let mut all: Vec<Arc<dyn Detector>> = vec![
        Arc::new(editor::EditorDetector::from_process_env()),
        Arc::new(composite::MernDetector),
        Arc::new(stack::StackDetector),
        Arc::new(composite::PernDetector),
        Arc::new(composite::MeanDetector),
    ];
    all.extend(framework::all());
    all.extend(integration::all());
    all
}
