//! # Detection Context
//!
//! File: cli/src/detection/context.rs
//!
//! ## Overview
//!
//! A `DetectionContext` is what every detector receives: the canonical
//! project root, the pass-wide `FileProbe` and a cancellation token. All
//! paths given to its helpers are relative to the project root.
//!
//! The helpers here implement the primitive checks shared by the pattern
//! matcher, the component heuristics and the detectors: dependency presence
//! in a manifest, file or glob existence, content search and env-file
//! variables.
//!
use crate::common::fs::glob;
use crate::common::fs::probe::FileProbe;
use crate::detection::manifest::{self, GoMod, PackageJson};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Env files consulted by environment-variable checks.
pub const ENV_FILES: &[&str] = &[".env", ".env.local", ".env.development", ".env.production"];

/// Container build files that set `ProjectInfo::has_docker`.
pub const DOCKER_FILES: &[&str] = &["Dockerfile", "docker-compose.yml", "docker-compose.yaml"];

#[derive(Debug, Clone)]
pub struct DetectionContext {
    root: Arc<Path>,
    probe: FileProbe,
    cancel: CancellationToken,
}

impl DetectionContext {
    pub fn new(root: impl Into<PathBuf>, probe: FileProbe, cancel: CancellationToken) -> Self {
        Self {
            root: Arc::from(root.into()),
            probe,
            cancel,
        }
    }

    /// Context with a fresh probe and its own token.
    #[cfg(test)]
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        Self::new(root, FileProbe::new(), CancellationToken::new())
    }

    /// Same root and probe, with a child token that can be cancelled on its own.
    pub fn child(&self) -> Self {
        Self {
            root: self.root.clone(),
            probe: self.probe.clone(),
            cancel: self.cancel.child_token(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn probe(&self) -> &FileProbe {
        &self.probe
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Last path component of the root, used as a fallback project name.
    pub fn dir_name(&self) -> String {
        self.root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "app".to_string())
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.probe.exists(&self.path(relative))
    }

    pub fn any_exists(&self, relatives: &[&str]) -> bool {
        relatives.iter().any(|r| self.exists(r))
    }

    pub fn read(&self, relative: &str) -> Option<Arc<str>> {
        self.probe.read(&self.path(relative))
    }

    /// Absolute paths of files matching `pattern` under the root.
    pub fn glob(&self, pattern: &str) -> Vec<PathBuf> {
        self.probe.glob(&self.root, pattern, &self.cancel)
    }

    /// Literal existence, or any glob match when `pattern` has metacharacters.
    pub fn file_matches(&self, pattern: &str) -> bool {
        if glob::has_glob_meta(pattern) {
            !self.glob(pattern).is_empty()
        } else {
            self.exists(pattern)
        }
    }

    /// Files selected by a literal path or a glob.
    fn select_files(&self, pattern: &str) -> Vec<PathBuf> {
        if glob::has_glob_meta(pattern) {
            self.glob(pattern)
        } else {
            vec![self.path(pattern)]
        }
    }

    /// True if `regex` matches the content of any selected file.
    pub fn content_matches(&self, regex: &Regex, pattern: &str) -> bool {
        self.select_files(pattern).iter().any(|file| {
            !self.is_cancelled()
                && self
                    .probe
                    .read(file)
                    .is_some_and(|content| regex.is_match(&content))
        })
    }

    /// True if any selected file contains `needle` literally.
    pub fn content_contains(&self, needle: &str, pattern: &str) -> bool {
        self.select_files(pattern).iter().any(|file| {
            !self.is_cancelled()
                && self
                    .probe
                    .read(file)
                    .is_some_and(|content| content.contains(needle))
        })
    }

    /// Textual dependency check against `manifest` (see `manifest::mentions_dependency`).
    pub fn has_dependency(&self, dependency: &str, manifest: &str) -> bool {
        self.read(manifest).is_some_and(|content| {
            manifest::mentions_dependency(&content, dependency, manifest::is_requirements_file(manifest))
        })
    }

    /// True if any of the standard env files assigns `name`.
    pub fn has_env_var(&self, name: &str) -> bool {
        let assignment = format!("{name}=");
        ENV_FILES.iter().any(|file| {
            self.read(file)
                .is_some_and(|content| content.contains(&assignment))
        })
    }

    pub fn has_docker(&self) -> bool {
        self.any_exists(DOCKER_FILES)
    }

    /// Parsed `package.json` at the root, if present and valid.
    pub fn package_json(&self) -> Option<PackageJson> {
        self.package_json_at("package.json")
    }

    pub fn package_json_at(&self, relative: &str) -> Option<PackageJson> {
        self.read(relative).and_then(|content| PackageJson::parse(&content))
    }

    pub fn go_mod(&self) -> Option<GoMod> {
        self.read("go.mod").map(|content| GoMod::parse(&content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_dependency_and_env_checks() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{"dependencies":{"next":"14.0.0"}}"#,
        )
        .unwrap();
        fs::write(dir.path().join("requirements.txt"), "Django>=4.2\npsycopg2\n").unwrap();
        fs::write(dir.path().join(".env.local"), "SUPABASE_URL=https://x\n").unwrap();

        let ctx = DetectionContext::for_root(dir.path());
        assert!(ctx.has_dependency("next", "package.json"));
        assert!(!ctx.has_dependency("react", "package.json"));
        assert!(ctx.has_dependency("Django", "requirements.txt"));
        assert!(ctx.has_dependency("psycopg2", "requirements.txt"));
        assert!(!ctx.has_dependency("next", "missing.json"));
        assert!(ctx.has_env_var("SUPABASE_URL"));
        assert!(!ctx.has_env_var("OPENAI_API_KEY"));
    }

    #[test]
    fn test_file_and_content_checks() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("db")).unwrap();
        fs::write(
            dir.path().join("db/init.sql"),
            "CREATE EXTENSION vector;\n",
        )
        .unwrap();

        let ctx = DetectionContext::for_root(dir.path());
        assert!(ctx.file_matches("**/*.sql"));
        assert!(ctx.file_matches("db/init.sql"));
        assert!(!ctx.file_matches("**/*.go"));
        assert!(ctx.content_contains("CREATE EXTENSION vector", "**/*.sql"));
        let re = Regex::new(r"(?i)create\s+extension").unwrap();
        assert!(ctx.content_matches(&re, "db/init.sql"));
        assert!(!ctx.content_matches(&re, "db/missing.sql"));
    }

    #[test]
    fn test_child_shares_probe() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("go.mod"), "module example.com/app\n").unwrap();
        let ctx = DetectionContext::for_root(dir.path());
        let child = ctx.child();
        assert!(ctx.read("go.mod").is_some());
        assert!(child.read("go.mod").is_some());
        assert_eq!(ctx.probe().stats().disk_reads(), 1);

        child.cancel_token().cancel();
        assert!(child.is_cancelled());
        assert!(!ctx.is_cancelled());
    }
}
