//! # Nexlayer Configuration System
//!
//! File: cli/src/core/config.rs
//!
//! ## Overview
//!
//! This module loads, merges and validates the tunables of the Nexlayer CLI:
//! detection thresholds, cache lifetime and task timeouts used by the
//! detector registry, and the registry/tag/output settings used by the YAML
//! generator.
//!
//! ## Architecture
//!
//! Configuration sources (in order of precedence):
//! 1. Project-specific `.nexlayer.toml` in the target directory or its
//!    ancestors (the search stops at the first directory holding `.git`)
//! 2. The file named by `--config` / `NEXLAYER_CONFIG`, or else the user file
//!    `config.toml` in the platform config directory
//!    (e.g. `~/.config/nexlayer/config.toml`)
//! 3. Default values defined in the code
//!
//! After merging, `~` in the output path is expanded and every value is
//! validated (thresholds in `[0, 1]`, positive timeouts, non-empty names).
//!
//! ## Examples
//!
//! ```toml
//! [detection]
//! cache_ttl_secs = 120
//!
//! [detection.thresholds]
//! editor = 0.8
//!
//! [generator]
//! registry = "ghcr.io/acme"
//! default_tag = "v1"
//! ```
//!
//! ```rust
//! let cfg = config::load_config(None, Path::new("."))?;
//! let ttl = cfg.detection.cache_ttl();
//! ```
//!
use crate::common::fs::io;
use crate::core::error::{NexlayerError, Result};
use anyhow::{anyhow, Context};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::{debug, info, warn};

/// Represents the main configuration structure, loaded from TOML files.
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
}

/// Settings consumed by the detector registry.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DetectionConfig {
    #[serde(default)]
    pub thresholds: ThresholdConfig,
    /// How long an aggregated detection result stays valid, in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    /// Per-task timeout for project, stack and integration detectors.
    #[serde(default = "default_task_timeout_secs")]
    pub task_timeout_secs: u64,
    /// Per-task timeout for the editor/assistant detector.
    #[serde(default = "default_editor_timeout_secs")]
    pub editor_timeout_secs: u64,
    /// Upper bound for a whole detection pass.
    #[serde(default = "default_overall_timeout_secs")]
    pub overall_timeout_secs: u64,
}

/// Minimum merged confidence per category before a result is reported.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ThresholdConfig {
    #[serde(default = "default_editor_threshold")]
    pub editor: f64,
    #[serde(default = "default_project_type_threshold")]
    pub project_type: f64,
    #[serde(default = "default_language_threshold")]
    pub language: f64,
    #[serde(default = "default_integration_threshold")]
    pub integration: f64,
}

/// Settings consumed by the YAML generator and `nexlayer init`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Registry prefix for application images.
    #[serde(default = "default_registry")]
    pub registry: String,
    /// Image tag used when detection does not provide one.
    #[serde(default = "default_tag")]
    pub default_tag: String,
    /// Output file name (relative paths are resolved against the project).
    #[serde(default = "default_output_file")]
    pub output_file: String,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            thresholds: ThresholdConfig::default(),
            cache_ttl_secs: default_cache_ttl_secs(),
            task_timeout_secs: default_task_timeout_secs(),
            editor_timeout_secs: default_editor_timeout_secs(),
            overall_timeout_secs: default_overall_timeout_secs(),
        }
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            editor: default_editor_threshold(),
            project_type: default_project_type_threshold(),
            language: default_language_threshold(),
            integration: default_integration_threshold(),
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            registry: default_registry(),
            default_tag: default_tag(),
            output_file: default_output_file(),
        }
    }
}

impl DetectionConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn task_timeout(&self) -> Duration {
        Duration::from_secs(self.task_timeout_secs)
    }

    pub fn editor_timeout(&self) -> Duration {
        Duration::from_secs(self.editor_timeout_secs)
    }

    pub fn overall_timeout(&self) -> Duration {
        Duration::from_secs(self.overall_timeout_secs)
    }
}

fn default_cache_ttl_secs() -> u64 {
    300
}
fn default_task_timeout_secs() -> u64 {
    30
}
fn default_editor_timeout_secs() -> u64 {
    60
}
fn default_overall_timeout_secs() -> u64 {
    120
}
fn default_editor_threshold() -> f64 {
    0.9
}
fn default_project_type_threshold() -> f64 {
    0.7
}
fn default_language_threshold() -> f64 {
    0.8
}
fn default_integration_threshold() -> f64 {
    0.7
}
fn default_registry() -> String {
    "<% REGISTRY %>".to_string()
}
fn default_tag() -> String {
    "latest".to_string()
}
fn default_output_file() -> String {
    "nexlayer.yaml".to_string()
}

pub const PROJECT_CONFIG_FILENAME: &str = ".nexlayer.toml";

/// Loads the merged configuration for a command targeting `project_dir`.
///
/// `explicit` replaces the user-level file when given and must exist.
pub fn load_config(explicit: Option<&Path>, project_dir: &Path) -> Result<Config> {
    let user_config = match explicit {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            Some(load_config_from_path(path)?)
        }
        None => load_user_config()?,
    };
    let project_config = load_project_config(project_dir)?;
    let mut merged_config = merge_configs(user_config.unwrap_or_default(), project_config);
    expand_config_paths(&mut merged_config).context("Failed to expand paths in configuration")?;
    validate_config(&merged_config).context("Configuration validation failed")?;
    debug!("Final loaded configuration: {:?}", merged_config);
    Ok(merged_config)
}

fn load_user_config() -> Result<Option<Config>> {
    if let Some(proj_dirs) = ProjectDirs::from("io", "Nexlayer", "nexlayer") {
        let config_path = proj_dirs.config_dir().join("config.toml");
        if config_path.is_file() {
            info!("Loading user configuration from: {}", config_path.display());
            load_config_from_path(&config_path).map(Some)
        } else {
            debug!(
                "User configuration file not found at {}",
                config_path.display()
            );
            Ok(None)
        }
    } else {
        warn!("Could not determine user config directory.");
        Ok(None)
    }
}

fn load_project_config(project_dir: &Path) -> Result<Option<Config>> {
    if let Some(project_config_path) = find_project_config_path(project_dir) {
        info!(
            "Loading project configuration from: {}",
            project_config_path.display()
        );
        load_config_from_path(&project_config_path).map(Some)
    } else {
        debug!("No project configuration file (.nexlayer.toml) found.");
        Ok(None)
    }
}

/// Walks up from `start` looking for `.nexlayer.toml`, stopping at a `.git` root.
fn find_project_config_path(start: &Path) -> Option<PathBuf> {
    let start = start.canonicalize().unwrap_or_else(|_| start.to_path_buf());
    let mut path: &Path = &start;
    loop {
        let project_config = path.join(PROJECT_CONFIG_FILENAME);
        if project_config.is_file() {
            return Some(project_config);
        }
        if path.join(".git").is_dir() {
            debug!(
                "Found .git directory at {}, stopping project config search.",
                path.display()
            );
            return None;
        }
        path = path.parent()?;
    }
}

fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = io::read_file_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))
}

/// Field-by-field merge: a project value wins whenever it differs from the default.
fn merge_configs(user: Config, project: Option<Config>) -> Config {
    let project_cfg = match project {
        Some(p) => p,
        None => return user,
    };
    let defaults = Config::default();
    let pick_f64 = |project: f64, user: f64, default: f64| {
        if project != default {
            project
        } else {
            user
        }
    };
    let pick_u64 = |project: u64, user: u64, default: u64| {
        if project != default {
            project
        } else {
            user
        }
    };
    let pick_string = |project: String, user: String, default: &str| {
        if project != default {
            project
        } else {
            user
        }
    };

    let (pt, ut, dt) = (
        project_cfg.detection.thresholds,
        user.detection.thresholds,
        defaults.detection.thresholds,
    );
    let thresholds = ThresholdConfig {
        editor: pick_f64(pt.editor, ut.editor, dt.editor),
        project_type: pick_f64(pt.project_type, ut.project_type, dt.project_type),
        language: pick_f64(pt.language, ut.language, dt.language),
        integration: pick_f64(pt.integration, ut.integration, dt.integration),
    };

    let (pd, ud, dd) = (&project_cfg.detection, &user.detection, &defaults.detection);
    let detection = DetectionConfig {
        thresholds,
        cache_ttl_secs: pick_u64(pd.cache_ttl_secs, ud.cache_ttl_secs, dd.cache_ttl_secs),
        task_timeout_secs: pick_u64(
            pd.task_timeout_secs,
            ud.task_timeout_secs,
            dd.task_timeout_secs,
        ),
        editor_timeout_secs: pick_u64(
            pd.editor_timeout_secs,
            ud.editor_timeout_secs,
            dd.editor_timeout_secs,
        ),
        overall_timeout_secs: pick_u64(
            pd.overall_timeout_secs,
            ud.overall_timeout_secs,
            dd.overall_timeout_secs,
        ),
    };

    let generator = GeneratorConfig {
        registry: pick_string(
            project_cfg.generator.registry,
            user.generator.registry,
            &defaults.generator.registry,
        ),
        default_tag: pick_string(
            project_cfg.generator.default_tag,
            user.generator.default_tag,
            &defaults.generator.default_tag,
        ),
        output_file: pick_string(
            project_cfg.generator.output_file,
            user.generator.output_file,
            &defaults.generator.output_file,
        ),
    };

    Config {
        detection,
        generator,
    }
}

fn expand_config_paths(config: &mut Config) -> Result<()> {
    config.generator.output_file = shellexpand::tilde(&config.generator.output_file).into_owned();
    debug!("Expanded output file: {}", config.generator.output_file);
    Ok(())
}

fn validate_config(config: &Config) -> Result<()> {
    debug!("Validating final configuration...");
    let t = &config.detection.thresholds;
    for (name, value) in [
        ("editor", t.editor),
        ("project_type", t.project_type),
        ("language", t.language),
        ("integration", t.integration),
    ] {
        if !(0.0..=1.0).contains(&value) {
            return Err(anyhow!(NexlayerError::Config(format!(
                "Threshold '{}' must be between 0 and 1, got {}.",
                name, value
            ))));
        }
    }
    let d = &config.detection;
    for (name, value) in [
        ("task_timeout_secs", d.task_timeout_secs),
        ("editor_timeout_secs", d.editor_timeout_secs),
        ("overall_timeout_secs", d.overall_timeout_secs),
    ] {
        if value == 0 {
            return Err(anyhow!(NexlayerError::Config(format!(
                "'{}' must be greater than zero.",
                name
            ))));
        }
    }
    let g = &config.generator;
    if g.registry.trim().is_empty() {
        return Err(anyhow!(NexlayerError::Config(
            "Generator registry cannot be empty.".to_string()
        )));
    }
    if g.default_tag.trim().is_empty() || g.default_tag.contains(char::is_whitespace) {
        return Err(anyhow!(NexlayerError::Config(format!(
            "Invalid default image tag: '{}'.",
            g.default_tag
        ))));
    }
    if g.output_file.trim().is_empty() {
        return Err(anyhow!(NexlayerError::Config(
            "Output file name cannot be empty.".to_string()
        )));
    }
    debug!("Configuration validation successful.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_deserialize_basic_toml() {
        let toml_content = r#"
            [detection]
            cache_ttl_secs = 60

            [detection.thresholds]
            editor = 0.75

            [generator]
            registry = "ghcr.io/acme"
        "#;

        let config: Config = toml::from_str(toml_content).expect("Failed to parse TOML");

        assert_eq!(config.detection.cache_ttl_secs, 60);
        assert_eq!(config.detection.thresholds.editor, 0.75);
        assert_eq!(config.detection.thresholds.project_type, 0.7); // Default
        assert_eq!(config.detection.task_timeout_secs, 30); // Default
        assert_eq!(config.generator.registry, "ghcr.io/acme");
        assert_eq!(config.generator.default_tag, "latest"); // Default
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let result: std::result::Result<Config, _> = toml::from_str("[detection]\nfoo = 1\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_merge_prefers_non_default_project_values() {
        let user = Config {
            generator: GeneratorConfig {
                registry: "registry.user".into(),
                default_tag: "user-tag".into(),
                ..Default::default()
            },
            ..Default::default()
        };
        let project = Config {
            detection: DetectionConfig {
                cache_ttl_secs: 10,
                ..Default::default()
            },
            generator: GeneratorConfig {
                default_tag: "project-tag".into(),
                ..Default::default()
            },
        };

        let merged = merge_configs(user, Some(project));
        assert_eq!(merged.detection.cache_ttl_secs, 10);
        assert_eq!(merged.generator.registry, "registry.user");
        assert_eq!(merged.generator.default_tag, "project-tag");
    }

    #[test]
    fn test_path_expansion() {
        let mut config = Config {
            generator: GeneratorConfig {
                output_file: "~/deploy/nexlayer.yaml".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };

        expand_config_paths(&mut config).unwrap();

        let home_dir = dirs::home_dir().unwrap();
        assert_eq!(
            config.generator.output_file,
            home_dir.join("deploy/nexlayer.yaml").to_string_lossy()
        );
    }

    #[test]
    fn test_validate_config_rejects_bad_threshold() {
        let mut config = Config::default();
        config.detection.thresholds.language = 1.5;
        let result = validate_config(&config);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Threshold 'language'"));
    }

    #[test]
    fn test_validate_config_rejects_zero_timeout() {
        let mut config = Config::default();
        config.detection.task_timeout_secs = 0;
        assert!(validate_config(&config).is_err());
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_load_config_reads_project_file() -> Result<()> {
        let temp_dir = tempdir()?;
        fs::create_dir(temp_dir.path().join(".git"))?;
        let nested = temp_dir.path().join("services/api");
        fs::create_dir_all(&nested)?;
        fs::write(
            temp_dir.path().join(PROJECT_CONFIG_FILENAME),
            "[generator]\ndefault_tag = \"v2\"\n",
        )?;
        let explicit = temp_dir.path().join("user.toml");
        fs::write(&explicit, "[generator]\nregistry = \"reg.example\"\n")?;

        let config = load_config(Some(&explicit), &nested)?;
        assert_eq!(config.generator.default_tag, "v2");
        assert_eq!(config.generator.registry, "reg.example");
        Ok(())
    }

    #[test]
    fn test_project_search_stops_at_git_root() -> Result<()> {
        let temp_dir = tempdir()?;
        let repo = temp_dir.path().join("repo");
        fs::create_dir_all(repo.join(".git"))?;
        fs::write(temp_dir.path().join(PROJECT_CONFIG_FILENAME), "")?;
        assert!(find_project_config_path(&repo).is_none());
        Ok(())
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let temp_dir = tempdir().unwrap();
        let missing = temp_dir.path().join("nope.toml");
        assert!(load_config(Some(&missing), temp_dir.path()).is_err());
    }
}
