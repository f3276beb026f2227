//! # Detection Patterns
//!
//! File: cli/src/detection/pattern.rs
//!
//! ## Overview
//!
//! A `DetectionPattern` is one weighted rule of a stack definition. It is
//! evaluated against a `DetectionContext`:
//!
//! | Kind | Matches when |
//! |---|---|
//! | `Dependency` | the manifest at `path` mentions the dependency |
//! | `FileExists` | the literal path exists, or the glob matches a file |
//! | `ImportStatement` / `ContentRegex` | the regex matches a file selected by `path` |
//! | `EnvironmentVariable` | a standard env file assigns the variable |
//!
//! Regexes are compiled when the pattern is built. A malformed regex is
//! logged once and the pattern never matches.
//!
use crate::detection::context::DetectionContext;
use regex::Regex;
use std::fmt;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    Dependency,
    FileExists,
    ImportStatement,
    ContentRegex,
    EnvironmentVariable,
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Dependency => "dependency",
            Self::FileExists => "file",
            Self::ImportStatement => "import",
            Self::ContentRegex => "content",
            Self::EnvironmentVariable => "env",
        })
    }
}

#[derive(Debug, Clone)]
pub struct DetectionPattern {
    kind: PatternKind,
    pattern: String,
    path: String,
    weight: f64,
    regex: Option<Regex>,
}

impl DetectionPattern {
    fn build(kind: PatternKind, pattern: &str, path: &str, weight: f64) -> Self {
        let regex = match kind {
            PatternKind::ImportStatement | PatternKind::ContentRegex => match Regex::new(pattern) {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!("Disabling malformed {} pattern '{}': {}", kind, pattern, e);
                    None
                }
            },
            _ => None,
        };
        Self {
            kind,
            pattern: pattern.to_string(),
            path: path.to_string(),
            weight: weight.clamp(0.0, 1.0),
            regex,
        }
    }

    /// `name` listed in `manifest` (e.g. `package.json`, `requirements.txt`).
    pub fn dependency(name: &str, manifest: &str, weight: f64) -> Self {
        Self::build(PatternKind::Dependency, name, manifest, weight)
    }

    /// A literal path or glob relative to the project root.
    pub fn file(path: &str, weight: f64) -> Self {
        Self::build(PatternKind::FileExists, path, path, weight)
    }

    pub fn import(regex: &str, files: &str, weight: f64) -> Self {
        Self::build(PatternKind::ImportStatement, regex, files, weight)
    }

    pub fn content(regex: &str, files: &str, weight: f64) -> Self {
        Self::build(PatternKind::ContentRegex, regex, files, weight)
    }

    pub fn env_var(name: &str, weight: f64) -> Self {
        Self::build(PatternKind::EnvironmentVariable, name, "", weight)
    }

    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// False for regex patterns whose expression failed to compile.
    pub fn is_usable(&self) -> bool {
        !matches!(
            self.kind,
            PatternKind::ImportStatement | PatternKind::ContentRegex
        ) || self.regex.is_some()
    }

    pub fn matches(&self, ctx: &DetectionContext) -> bool {
        match self.kind {
            PatternKind::Dependency => {
                let manifest = if self.path.is_empty() {
                    "package.json"
                } else {
                    &self.path
                };
                ctx.has_dependency(&self.pattern, manifest)
            }
            PatternKind::FileExists => ctx.file_matches(&self.pattern),
            PatternKind::ImportStatement | PatternKind::ContentRegex => self
                .regex
                .as_ref()
                .is_some_and(|re| ctx.content_matches(re, &self.path)),
            PatternKind::EnvironmentVariable => ctx.has_env_var(&self.pattern),
        }
    }
}
