//! # Nexlayer CLI Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//!
//! ## Overview
//!
//! Shared helpers for the integration tests in `cli/tests/`. Every test
//! crate that declares `mod common;` gets a `nexlayer` command isolated from
//! the developer's machine: an empty configuration file, a throwaway home
//! directory and no editor environment variables, so detection results only
//! depend on the fixture project.
//!

// Different test files use different helpers.
#![allow(dead_code)]

pub use assert_cmd::Command;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Variables the editor detector reads.
const EDITOR_VARS: &[&str] = &[
    "CURSOR_TRACE_ID",
    "CURSOR_LLM_MODEL",
    "VSCODE_GIT_IPC_HANDLE",
    "VSCODE_PID",
    "VSCODE_LLM_MODEL",
    "WINDSURF",
    "WINDSURF_LLM",
    "WINDSURF_LLM_MODEL",
    "ZED_ROOT",
    "ZED_LLM",
    "AIDER_LLM",
    "AI_MODEL",
];

/// Isolated environment for one test: config file and fake home.
pub struct Sandbox {
    home: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        let home = tempfile::tempdir().expect("Failed to create sandbox home");
        fs::write(home.path().join("config.toml"), "").expect("Failed to write sandbox config");
        Self { home }
    }

    /// # Get Nexlayer Command (`cmd`)
    ///
    /// An `assert_cmd::Command` for the compiled `nexlayer` binary, running
    /// against the sandbox's configuration and home directory.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("nexlayer").expect("Failed to find nexlayer binary for testing");
        cmd.env("NEXLAYER_CONFIG", self.home.path().join("config.toml"))
            .env("HOME", self.home.path())
            .env_remove("RUST_LOG");
        for var in EDITOR_VARS {
            cmd.env_remove(var);
        }
        cmd
    }
}

/// Writes `content` to `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create fixture directory");
    }
    fs::write(path, content).expect("Failed to write fixture file");
}
