//! # Nexlayer Glob Matching
//!
//! File: cli/src/common/fs/glob.rs
//!
//! ## Overview
//!
//! Glob walks over a project tree. Patterns are relative to the project root
//! and use `/` as the separator on every platform. Supported syntax is that of
//! `glob::Pattern` (`*`, `?`, `[...]`, `**`) plus brace alternatives
//! (`**/*.{js,ts}`), which are expanded before matching.
//!
//! Dependency and build output directories (`node_modules`, `.git`, `target`,
//! virtualenvs, ...) are never descended into, and walks stop at a fixed
//! depth so a stray glob cannot scan an entire home directory.
//!
use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};
use walkdir::WalkDir;

/// Directory names skipped during every walk.
pub const IGNORED_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    "vendor",
    "dist",
    "build",
    ".next",
    ".nuxt",
    ".svelte-kit",
    "target",
    "venv",
    ".venv",
    "__pycache__",
];

/// Maximum depth of a recursive (`**`) walk.
pub const MAX_DEPTH: usize = 8;

/// Maximum number of matches returned by a single walk.
pub const MAX_MATCHES: usize = 2_000;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Returns true when `pattern` needs a directory walk rather than a stat.
pub fn has_glob_meta(pattern: &str) -> bool {
    pattern.contains(['*', '?', '[', '{'])
}

/// Expands `{a,b}` groups into one pattern per alternative.
///
/// Groups are expanded left to right; an unterminated `{` is kept literally.
pub fn expand_braces(pattern: &str) -> Vec<String> {
    let Some(open) = pattern.find('{') else {
        return vec![pattern.to_string()];
    };
    let Some(close) = pattern[open..].find('}').map(|i| open + i) else {
        return vec![pattern.to_string()];
    };
    let (prefix, suffix) = (&pattern[..open], &pattern[close + 1..]);
    pattern[open + 1..close]
        .split(',')
        .flat_map(|alt| expand_braces(&format!("{prefix}{alt}{suffix}")))
        .collect()
}

/// A compiled, brace-expanded glob.
#[derive(Debug, Clone)]
pub struct GlobMatcher {
    patterns: Vec<Pattern>,
    max_depth: usize,
}

impl GlobMatcher {
    /// Compiles `pattern`; returns `None` if any alternative is malformed.
    pub fn new(pattern: &str) -> Option<Self> {
        let alternatives = expand_braces(pattern.trim_start_matches("./"));
        let mut patterns = Vec::with_capacity(alternatives.len() * 2);
        let mut max_depth = 1;
        for alt in &alternatives {
            patterns.push(Pattern::new(alt).ok()?);
            // `**/x` should also match `x` at the root.
            if let Some(stripped) = alt.strip_prefix("**/") {
                patterns.push(Pattern::new(stripped).ok()?);
            }
            let depth = if alt.contains("**") {
                MAX_DEPTH
            } else {
                alt.split('/').count()
            };
            max_depth = max_depth.max(depth);
        }
        Some(Self {
            patterns,
            max_depth,
        })
    }

    /// Tests a root-relative, `/`-separated path.
    pub fn matches(&self, relative: &str) -> bool {
        self.patterns
            .iter()
            .any(|p| p.matches_with(relative, MATCH_OPTIONS))
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

/// Returns the files under `root` matching `pattern`, sorted by path.
///
/// Walk errors (permissions, races) are skipped. The walk stops early when
/// `cancel` fires, returning what was found so far.
pub fn find_matches(root: &Path, pattern: &str, cancel: &CancellationToken) -> Vec<PathBuf> {
    let Some(matcher) = GlobMatcher::new(pattern) else {
        debug!("Ignoring malformed glob pattern '{}'", pattern);
        return Vec::new();
    };

    let mut found = Vec::new();
    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(matcher.max_depth())
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_ignored_dir(entry));

    for entry in walker.filter_map(|e| e.ok()) {
        if cancel.is_cancelled() {
            debug!("Glob walk for '{}' cancelled", pattern);
            break;
        }
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(relative) = relative_slash_path(root, entry.path()) else {
            continue;
        };
        if matcher.matches(&relative) {
            trace!("Glob '{}' matched {}", pattern, relative);
            found.push(entry.into_path());
            if found.len() >= MAX_MATCHES {
                debug!("Glob '{}' hit the match limit", pattern);
                break;
            }
        }
    }
    found
}

fn is_ignored_dir(entry: &walkdir::DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| IGNORED_DIRS.contains(&name))
}

fn relative_slash_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Option<Vec<&str>> = relative.components().map(|c| c.as_os_str().to_str()).collect();
    Some(parts?.join("/"))
}
