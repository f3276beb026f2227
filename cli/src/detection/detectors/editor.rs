//! # Editor Detector
//!
//! File: cli/src/detection/detectors/editor.rs
//!
//! ## Overview
//!
//! Identifies the editor or AI coding assistant the CLI is running under,
//! and the language model it is configured with.
//!
//! ## Architecture
//!
//! Detection is environment-first. Each editor exports marker variables into
//! the terminals it spawns:
//!
//! | Editor | Markers | Model variables |
//! |---|---|---|
//! | `cursor` | `CURSOR_TRACE_ID`, `CURSOR_LLM_MODEL` | `CURSOR_LLM_MODEL` |
//! | `vscode` | `VSCODE_GIT_IPC_HANDLE`, `VSCODE_PID` | `VSCODE_LLM_MODEL` |
//! | `windsurf` | `WINDSURF`, `WINDSURF_LLM` | `WINDSURF_LLM_MODEL`, `WINDSURF_LLM` |
//! | `zed` | `ZED_ROOT`, `ZED_LLM` | `ZED_LLM` |
//! | `aider` | `AIDER_LLM` | `AIDER_LLM` |
//!
//! `AI_MODEL` is the model of last resort. Cursor is checked before VS Code
//! because Cursor terminals also carry the VS Code markers.
//!
//! Without markers the detector looks for editor configuration under the
//! home directory. That is weak evidence (0.6) and stays below the default
//! editor threshold unless the threshold is lowered in configuration.
//!
//! The environment is captured once at construction so a detection pass
//! never races with changes to the process environment.
//!
use super::{DetectResult, Detector, DetectorKind};
use crate::detection::context::DetectionContext;
use crate::detection::types::{ProjectInfo, ProjectType};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

struct EditorMarkers {
    editor: &'static str,
    /// Marker variable and the confidence it carries.
    markers: &'static [(&'static str, f64)],
    model_vars: &'static [&'static str],
}

const EDITORS: &[EditorMarkers] = &[
    EditorMarkers {
        editor: "cursor",
        markers: &[("CURSOR_TRACE_ID", 0.95), ("CURSOR_LLM_MODEL", 0.9)],
        model_vars: &["CURSOR_LLM_MODEL"],
    },
    EditorMarkers {
        editor: "vscode",
        markers: &[("VSCODE_GIT_IPC_HANDLE", 0.9), ("VSCODE_PID", 0.9)],
        model_vars: &["VSCODE_LLM_MODEL"],
    },
    EditorMarkers {
        editor: "windsurf",
        markers: &[("WINDSURF", 0.95), ("WINDSURF_LLM", 0.9)],
        model_vars: &["WINDSURF_LLM_MODEL", "WINDSURF_LLM"],
    },
    EditorMarkers {
        editor: "zed",
        markers: &[("ZED_ROOT", 0.95), ("ZED_LLM", 0.9)],
        model_vars: &["ZED_LLM"],
    },
    EditorMarkers {
        editor: "aider",
        markers: &[("AIDER_LLM", 0.9)],
        model_vars: &["AIDER_LLM"],
    },
];

/// Home-relative configuration that hints at an installed editor.
const CONFIG_HINTS: &[(&str, &str)] = &[
    (".config/Cursor/User/settings.json", "cursor"),
    ("Library/Application Support/Cursor/User/settings.json", "cursor"),
    (".windsurf/config.json", "windsurf"),
    (".zed/settings.json", "zed"),
    (".vscode/extensions", "vscode"),
];

const CONFIG_CONFIDENCE: f64 = 0.6;

pub struct EditorDetector {
    env: HashMap<String, String>,
    home: Option<PathBuf>,
}

impl EditorDetector {
    /// Captures the current process environment and home directory.
    pub fn from_process_env() -> Self {
        Self::new(std::env::vars().collect(), dirs::home_dir())
    }

    pub fn new(env: HashMap<String, String>, home: Option<PathBuf>) -> Self {
        Self { env, home }
    }

    fn var(&self, name: &str) -> Option<&str> {
        self.env
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    fn model(&self, editor: &EditorMarkers) -> Option<String> {
        editor
            .model_vars
            .iter()
            .chain(std::iter::once(&"AI_MODEL"))
            .find_map(|name| self.var(name))
            .map(str::to_string)
    }

    fn from_env(&self) -> Option<(&'static str, f64, Option<String>)> {
        EDITORS.iter().find_map(|editor| {
            let confidence = editor
                .markers
                .iter()
                .filter(|(var, _)| self.var(var).is_some())
                .map(|(_, confidence)| *confidence)
                .reduce(f64::max)?;
            Some((editor.editor, confidence, self.model(editor)))
        })
    }

    fn from_config(&self, ctx: &DetectionContext) -> Option<&'static str> {
        let home = self.home.as_ref()?;
        CONFIG_HINTS
            .iter()
            .find(|(rel, _)| ctx.probe().exists(&home.join(rel)))
            .map(|(_, editor)| *editor)
    }
}

impl Detector for EditorDetector {
    fn name(&self) -> &'static str {
        "editor"
    }

    fn priority(&self) -> i32 {
        250
    }

    fn kind(&self) -> DetectorKind {
        DetectorKind::Editor
    }

    fn detect(&self, ctx: &DetectionContext) -> DetectResult {
        let (editor, confidence, model, source) = match self.from_env() {
            Some((editor, confidence, model)) => (editor, confidence, model, "env"),
            None => match self.from_config(ctx) {
                Some(editor) => (
                    editor,
                    CONFIG_CONFIDENCE,
                    self.var("AI_MODEL").map(str::to_string),
                    "config",
                ),
                None => return Ok(None),
            },
        };
        debug!(editor, confidence, ?model, source, "editor detected");

        let mut info = ProjectInfo::new(ProjectType::Unknown, ctx.dir_name(), confidence)
            .with_metadata("editor_source", source);
        info.editor = Some(editor.to_string());
        info.llm_model = model;
        Ok(Some(info))
    }
}
