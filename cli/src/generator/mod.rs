//! # Nexlayer YAML Generator
//!
//! File: cli/src/generator/mod.rs
//!
//! ## Overview
//!
//! Turns a `ProjectInfo` into a `nexlayer.yaml` deployment descriptor.
//!
//! ## Architecture
//!
//! 1. The application name is sanitized (`naming::sanitize_name`).
//! 2. `templates::pods_for` picks the pods for the detected project type.
//! 3. Each pod gets its image: the template's fixed image, or a registry
//!    reference `<registry>/<app>:<tag>` (one pod) or
//!    `<registry>/<app>-<pod>:<tag>` (several pods).
//! 4. `PodOverrides` set with `with_overrides` are applied to the primary
//!    pod.
//! 5. The typed `NexlayerYaml` is serialized with `serde_yaml`.
//!
//! Unknown project types are not an error; they produce the nginx fallback.
//!
//! ## Examples
//!
//! ```rust
//! let generator = YamlGenerator::from_config(&config.generator);
//! let yaml = generator.generate(&info)?;
//! std::fs::write("nexlayer.yaml", yaml)?;
//! ```
//!
pub mod naming;
pub mod schema;
pub mod templates;

use crate::core::config::GeneratorConfig;
use crate::core::error::{NexlayerError, Result};
use crate::detection::types::ProjectInfo;
use anyhow::Context;
use naming::sanitize_name;
use schema::{Application, EnvVar, NexlayerYaml, Pod, ServicePort};
use tracing::debug;

/// Command-line adjustments to the primary pod.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PodOverrides {
    pub name: Option<String>,
    pub image: Option<String>,
    pub port: Option<u16>,
    pub path: Option<String>,
}

impl PodOverrides {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Applies the overrides to the first pod of `yaml`.
    fn apply(&self, yaml: &mut NexlayerYaml) {
        let Some(pod) = yaml.application.pods.first_mut() else {
            return;
        };
        if let Some(name) = &self.name {
            pod.name = sanitize_name(name);
        }
        if let Some(image) = &self.image {
            pod.image = image.clone();
        }
        if let Some(port) = self.port {
            pod.service_ports = vec![ServicePort::http(port)];
        }
        if let Some(path) = &self.path {
            pod.path = Some(if path.starts_with('/') {
                path.clone()
            } else {
                format!("/{}", path)
            });
        }
    }
}

#[derive(Debug, Clone)]
pub struct YamlGenerator {
    registry: String,
    tag: String,
    overrides: PodOverrides,
}

impl YamlGenerator {
    pub fn new(registry: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            registry: registry.into(),
            tag: tag.into(),
            overrides: PodOverrides::default(),
        }
    }

    /// Overrides applied to the primary pod of every built descriptor.
    pub fn with_overrides(mut self, overrides: PodOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self::new(config.registry.clone(), config.default_tag.clone())
    }

    fn image_for(&self, app: &str, pod: &str, tag: &str, multi_pod: bool) -> String {
        if multi_pod {
            format!("{}/{}-{}:{}", self.registry, app, pod, tag)
        } else {
            format!("{}/{}:{}", self.registry, app, tag)
        }
    }

    /// The typed descriptor for `info`.
    pub fn build(&self, info: &ProjectInfo) -> NexlayerYaml {
        let app = sanitize_name(&info.name);
        let tag = info.image_tag.as_deref().unwrap_or(&self.tag);
        let templates = templates::pods_for(info, &app);
        let multi_pod = templates.len() > 1;
        debug!(
            app = %app,
            project_type = %info.project_type,
            pods = templates.len(),
            "building descriptor"
        );

        let pods = templates
            .into_iter()
            .map(|t| Pod {
                name: t.name.to_string(),
                pod_type: t.pod_type.to_string(),
                image: match t.image {
                    Some(image) => image.to_string(),
                    None => self.image_for(&app, t.name, tag, multi_pod),
                },
                path: t.path.map(str::to_string),
                vars: t
                    .vars
                    .into_iter()
                    .map(|(key, value)| EnvVar::new(key, value))
                    .collect(),
                service_ports: vec![ServicePort::http(t.port)],
            })
            .collect();

        let mut yaml = NexlayerYaml {
            application: Application { name: app, pods },
        };
        if !self.overrides.is_empty() {
            debug!(overrides = ?self.overrides, "applying pod overrides");
            self.overrides.apply(&mut yaml);
        }
        yaml
    }

    /// Serializes `yaml`.
    pub fn render(&self, yaml: &NexlayerYaml) -> Result<String> {
        serde_yaml::to_string(yaml)
            .map_err(|e| NexlayerError::Generation(e.to_string()))
            .context("Failed to serialize nexlayer.yaml")
    }

    pub fn generate(&self, info: &ProjectInfo) -> Result<String> {
        self.render(&self.build(info))
    }
}

impl Default for YamlGenerator {
    fn default() -> Self {
        Self::from_config(&GeneratorConfig::default())
    }
}

/// Parses a descriptor back into its typed form.
pub fn parse(yaml: &str) -> Result<NexlayerYaml> {
    serde_yaml::from_str(yaml)
        .map_err(|e| NexlayerError::Generation(e.to_string()))
        .context("Failed to parse nexlayer.yaml")
}
