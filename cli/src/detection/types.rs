//! # Detection Result Types
//!
//! File: cli/src/detection/types.rs
//!
//! ## Overview
//!
//! Value types shared by every detector and by the YAML generator:
//!
//! - `Confidence`: a score clamped to `[0, 0.95]` on construction. No
//!   detector can claim certainty.
//! - `ProjectType`: the closed set of classifications the engine can emit,
//!   with the kebab-case names used on the command line and in JSON output.
//! - `ProjectInfo`: the result of a detection pass.
//!
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Ranking signal in `[0, 0.95]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Confidence(f64);

impl Confidence {
    /// Upper bound for every confidence value.
    pub const MAX: f64 = 0.95;
    pub const ZERO: Confidence = Confidence(0.0);

    /// Clamps `value` into `[0, MAX]`. NaN becomes zero.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        Self(value.clamp(0.0, Self::MAX))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Applies a task weight, re-clamping the result.
    pub fn weighted(self, weight: f64) -> Self {
        Self::new(self.0 * weight)
    }

    pub fn meets(self, threshold: f64) -> bool {
        self.0 >= threshold
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0}%", self.0 * 100.0)
    }
}

impl From<f64> for Confidence {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

/// Project classifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectType {
    #[default]
    Unknown,
    Nextjs,
    React,
    Vue,
    Nuxt,
    Svelte,
    Sveltekit,
    Bun,
    BunHono,
    Node,
    Python,
    Go,
    Docker,
    LangchainNextjs,
    #[serde(rename = "openai-node")]
    OpenAiNode,
    #[serde(rename = "llama-py")]
    LlamaPython,
    Mern,
    Pern,
    Mean,
    NextjsSupabaseLangchain,
    #[serde(rename = "nextjs-supabase-openai")]
    NextjsSupabaseOpenAi,
    DjangoReact,
    ExpressMongodb,
}

impl ProjectType {
    pub const ALL: &'static [ProjectType] = &[
        Self::Unknown,
        Self::Nextjs,
        Self::React,
        Self::Vue,
        Self::Nuxt,
        Self::Svelte,
        Self::Sveltekit,
        Self::Bun,
        Self::BunHono,
        Self::Node,
        Self::Python,
        Self::Go,
        Self::Docker,
        Self::LangchainNextjs,
        Self::OpenAiNode,
        Self::LlamaPython,
        Self::Mern,
        Self::Pern,
        Self::Mean,
        Self::NextjsSupabaseLangchain,
        Self::NextjsSupabaseOpenAi,
        Self::DjangoReact,
        Self::ExpressMongodb,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Nextjs => "nextjs",
            Self::React => "react",
            Self::Vue => "vue",
            Self::Nuxt => "nuxt",
            Self::Svelte => "svelte",
            Self::Sveltekit => "sveltekit",
            Self::Bun => "bun",
            Self::BunHono => "bun-hono",
            Self::Node => "node",
            Self::Python => "python",
            Self::Go => "go",
            Self::Docker => "docker",
            Self::LangchainNextjs => "langchain-nextjs",
            Self::OpenAiNode => "openai-node",
            Self::LlamaPython => "llama-py",
            Self::Mern => "mern",
            Self::Pern => "pern",
            Self::Mean => "mean",
            Self::NextjsSupabaseLangchain => "nextjs-supabase-langchain",
            Self::NextjsSupabaseOpenAi => "nextjs-supabase-openai",
            Self::DjangoReact => "django-react",
            Self::ExpressMongodb => "express-mongodb",
        }
    }

    pub fn is_known(self) -> bool {
        self != Self::Unknown
    }

    /// Human-readable label for terminal output.
    pub fn label(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Nextjs => "Next.js",
            Self::React => "React",
            Self::Vue => "Vue",
            Self::Nuxt => "Nuxt",
            Self::Svelte => "Svelte",
            Self::Sveltekit => "SvelteKit",
            Self::Bun => "Bun",
            Self::BunHono => "Bun + Hono",
            Self::Node => "Node.js",
            Self::Python => "Python",
            Self::Go => "Go",
            Self::Docker => "Docker",
            Self::LangchainNextjs => "LangChain + Next.js",
            Self::OpenAiNode => "OpenAI + Node.js",
            Self::LlamaPython => "Llama + Python",
            Self::Mern => "MERN (MongoDB, Express, React, Node.js)",
            Self::Pern => "PERN (PostgreSQL, Express, React, Node.js)",
            Self::Mean => "MEAN (MongoDB, Express, Angular, Node.js)",
            Self::NextjsSupabaseLangchain => "Next.js + Supabase + LangChain",
            Self::NextjsSupabaseOpenAi => "Next.js + Supabase + OpenAI",
            Self::DjangoReact => "Django + React",
            Self::ExpressMongodb => "Express + MongoDB",
        }
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == needle)
            .ok_or_else(|| format!("unknown project type '{}'", s))
    }
}

/// Result of a detection pass.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProjectInfo {
    #[serde(rename = "type")]
    pub project_type: ProjectType,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dependencies: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub scripts: BTreeMap<String, String>,
    /// Default network port, 0 when unknown.
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub has_docker: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_tag: Option<String>,
    pub confidence: Confidence,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl ProjectInfo {
    pub fn new(project_type: ProjectType, name: impl Into<String>, confidence: f64) -> Self {
        Self {
            project_type,
            name: name.into(),
            confidence: Confidence::new(confidence),
            ..Default::default()
        }
    }

    /// The generic result used when nothing could be detected.
    pub fn fallback(name: impl Into<String>) -> Self {
        Self::new(ProjectType::Unknown, name, 0.0)
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_metadata(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    /// Port to use, falling back to `default` when detection found none.
    pub fn port_or(&self, default: u16) -> u16 {
        if self.port == 0 {
            default
        } else {
            self.port
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_is_clamped() {
        assert_eq!(Confidence::new(1.4).value(), Confidence::MAX);
        assert_eq!(Confidence::new(-0.2).value(), 0.0);
        assert_eq!(Confidence::new(f64::NAN).value(), 0.0);
        assert_eq!(Confidence::new(0.42).value(), 0.42);
        assert_eq!(Confidence::new(0.9).weighted(0.5).value(), 0.45);
        assert!(Confidence::new(0.7).meets(0.7));
        assert_eq!(Confidence::new(0.856).to_string(), "86%");
    }

    #[test]
    fn test_project_type_names_round_trip() {
        for t in ProjectType::ALL {
            assert_eq!(t.as_str().parse::<ProjectType>().unwrap(), *t);
            let json = serde_json::to_string(t).unwrap();
            assert_eq!(json, format!("\"{}\"", t.as_str()));
        }
        assert!("rails".parse::<ProjectType>().is_err());
    }

    #[test]
    fn test_project_info_json_uses_type_key() {
        let info = ProjectInfo::new(ProjectType::Go, "example.com/app", 0.85).with_port(9090);
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["type"], "go");
        assert_eq!(json["port"], 9090);
        assert!(json.get("editor").is_none());
        assert_eq!(info.port_or(8080), 9090);
        assert_eq!(ProjectInfo::fallback("app").port_or(80), 80);
    }
}
