//! # Manifest Parsing
//!
//! File: cli/src/detection/manifest.rs
//!
//! ## Overview
//!
//! Typed views over the manifests detectors care about:
//!
//! - `PackageJson`: name, version, dependencies, devDependencies, scripts
//!   (via `serde_json`; non-string values are ignored).
//! - `GoMod`: module path, Go version and required modules.
//! - requirements-style files: normalized package names.
//! - docker-compose files: service names and images (via `serde_yaml`).
//!
//! `mentions_dependency` is the textual dependency rule used by detection
//! patterns, which deliberately works on raw text so it applies to any
//! manifest format.
//!
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageJson {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    dependencies: BTreeMap<String, Value>,
    #[serde(default)]
    dev_dependencies: BTreeMap<String, Value>,
    #[serde(default)]
    scripts: BTreeMap<String, Value>,
    #[serde(default)]
    bun: Option<Value>,
}

impl PackageJson {
    /// Parses package.json text; invalid JSON yields `None`.
    pub fn parse(content: &str) -> Option<Self> {
        serde_json::from_str(content).ok()
    }

    /// True if `name` is listed in dependencies or devDependencies.
    pub fn has(&self, name: &str) -> bool {
        self.dependencies.contains_key(name) || self.dev_dependencies.contains_key(name)
    }

    pub fn has_any(&self, names: &[&str]) -> bool {
        names.iter().any(|n| self.has(n))
    }

    pub fn version_of(&self, name: &str) -> Option<String> {
        self.dependencies
            .get(name)
            .or_else(|| self.dev_dependencies.get(name))
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    /// Runtime and dev dependencies merged, runtime versions winning.
    pub fn all_dependencies(&self) -> BTreeMap<String, String> {
        self.dev_dependencies
            .iter()
            .chain(self.dependencies.iter())
            .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
            .collect()
    }

    pub fn scripts(&self) -> BTreeMap<String, String> {
        self.scripts
            .iter()
            .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
            .collect()
    }

    /// True if any script invokes `needle`.
    pub fn script_mentions(&self, needle: &str) -> bool {
        self.scripts
            .values()
            .filter_map(Value::as_str)
            .any(|s| s.contains(needle))
    }

    pub fn has_bun_section(&self) -> bool {
        self.bun.as_ref().is_some_and(|v| !v.is_null())
    }
}

/// Parsed `go.mod`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoMod {
    pub module: Option<String>,
    pub go_version: Option<String>,
    /// Required module path to version.
    pub requires: BTreeMap<String, String>,
}

impl GoMod {
    pub fn parse(content: &str) -> Self {
        let mut parsed = GoMod::default();
        let mut in_require_block = false;
        for line in content.lines() {
            let line = line.split("//").next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            if in_require_block {
                if line == ")" {
                    in_require_block = false;
                } else {
                    parsed.add_require(line.split_whitespace());
                }
                continue;
            }
            let mut parts = line.split_whitespace();
            match (parts.next(), parts.next()) {
                (Some("module"), Some(path)) => parsed.module = Some(path.trim_matches('"').to_string()),
                (Some("go"), Some(version)) => parsed.go_version = Some(version.to_string()),
                (Some("require"), Some("(")) => in_require_block = true,
                (Some("require"), Some(path)) => {
                    parsed.add_require(std::iter::once(path).chain(parts))
                }
                _ => {}
            }
        }
        parsed
    }

    fn add_require<'a>(&mut self, mut fields: impl Iterator<Item = &'a str>) {
        if let Some(path) = fields.next() {
            let version = fields.next().unwrap_or("").to_string();
            self.requires.insert(path.to_string(), version);
        }
    }

    pub fn requires_prefix(&self, prefix: &str) -> bool {
        self.requires.keys().any(|r| r.starts_with(prefix))
    }
}

/// True for pip-style requirement files (`requirements.txt`, `requirements-dev.txt`, ...).
pub fn is_requirements_file(manifest: &str) -> bool {
    manifest.ends_with(".txt")
}

/// Package name declared on a requirements line, if any.
pub fn requirement_name(line: &str) -> Option<&str> {
    let line = line.split('#').next().unwrap_or("").trim();
    if line.is_empty() || line.starts_with('-') {
        return None;
    }
    let end = line
        .find(|c: char| matches!(c, '=' | '<' | '>' | '~' | '!' | ';' | '[' | ' ' | '@'))
        .unwrap_or(line.len());
    let name = line[..end].trim();
    (!name.is_empty()).then_some(name)
}

/// Textual dependency rule.
///
/// Matches the name quoted (`"dep"`, `'dep'`) or followed by a pin operator
/// (`dep==`, `dep>=`). For requirements files a bare requirement line naming
/// the package (case-insensitive) also matches.
pub fn mentions_dependency(content: &str, dependency: &str, requirements_style: bool) -> bool {
    if content.contains(&format!("\"{dependency}\""))
        || content.contains(&format!("'{dependency}'"))
        || content.contains(&format!("{dependency}=="))
        || content.contains(&format!("{dependency}>="))
    {
        return true;
    }
    requirements_style
        && content
            .lines()
            .filter_map(requirement_name)
            .any(|name| name.eq_ignore_ascii_case(dependency))
}

#[derive(Debug, Deserialize)]
struct ComposeFile {
    #[serde(default)]
    services: BTreeMap<String, Option<ComposeService>>,
}

#[derive(Debug, Default, Deserialize)]
struct ComposeService {
    #[serde(default)]
    image: Option<String>,
}

/// Service names and images of a docker-compose file, sorted by name.
pub fn compose_services(content: &str) -> Vec<(String, Option<String>)> {
    serde_yaml::from_str::<ComposeFile>(content)
        .map(|file| {
            file.services
                .into_iter()
                .map(|(name, svc)| (name, svc.and_then(|s| s.image)))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_json_views() {
        let pkg = PackageJson::parse(
            r#"{
                "name": "shop",
                "version": "1.2.0",
                "dependencies": {"react": "^18.2.0", "express": "^4.18.2", "odd": 3},
                "devDependencies": {"vite": "^5.0.0", "react": "^17.0.0"},
                "scripts": {"dev": "vite --port 5174", "start": "node server.js"}
            }"#,
        )
        .unwrap();

        assert_eq!(pkg.name.as_deref(), Some("shop"));
        assert!(pkg.has("vite"));
        assert!(pkg.has_any(&["angular", "express"]));
        assert_eq!(pkg.version_of("react").as_deref(), Some("^18.2.0"));
        let deps = pkg.all_dependencies();
        assert_eq!(deps.get("react").map(String::as_str), Some("^18.2.0"));
        assert!(!deps.contains_key("odd"));
        assert_eq!(pkg.scripts().len(), 2);
        assert!(pkg.script_mentions("vite"));
        assert!(PackageJson::parse("{not json").is_none());
    }

    #[test]
    fn test_go_mod_parse() {
        let go_mod = GoMod::parse(
            "module example.com/app // service\n\ngo 1.22\n\nrequire (\n\tgithub.com/gin-gonic/gin v1.9.1\n)\nrequire golang.org/x/net v0.1.0\n",
        );
        assert_eq!(go_mod.module.as_deref(), Some("example.com/app"));
        assert_eq!(go_mod.go_version.as_deref(), Some("1.22"));
        assert_eq!(go_mod.requires.len(), 2);
        assert_eq!(
            go_mod.requires.get("github.com/gin-gonic/gin").map(String::as_str),
            Some("v1.9.1")
        );
        assert_eq!(
            go_mod.requires.get("golang.org/x/net").map(String::as_str),
            Some("v0.1.0")
        );
        assert!(go_mod.requires_prefix("github.com/gin-gonic"));
    }

    #[test]
    fn test_requirement_name() {
        assert_eq!(requirement_name("Flask==2.3.0"), Some("Flask"));
        assert_eq!(requirement_name("uvicorn[standard]>=0.23"), Some("uvicorn"));
        assert_eq!(
            requirement_name("psycopg2-binary ; python_version > '3'"),
            Some("psycopg2-binary")
        );
        assert_eq!(requirement_name("# web"), None);
        assert_eq!(requirement_name("-r base.txt"), None);
    }

    #[test]
    fn test_mentions_dependency() {
        assert!(mentions_dependency(r#"{"next": "14"}"#, "next", false));
        assert!(!mentions_dependency(r#"{"nextra": "2"}"#, "next", false));
        assert!(mentions_dependency("flask==2.0\n", "flask", true));
        assert!(mentions_dependency("django\n", "django", true));
        assert!(!mentions_dependency("django\n", "django", false));
        assert!(mentions_dependency("langchain>=0.1\n", "langchain", false));
    }

    #[test]
    fn test_compose_services() {
        let services = compose_services(
            "services:\n  web:\n    build: .\n  db:\n    image: postgres:16\n",
        );
        assert_eq!(
            services,
            vec![
                ("db".to_string(), Some("postgres:16".to_string())),
                ("web".to_string(), None)
            ]
        );
        assert!(compose_services(": not yaml :").is_empty());
    }
}
