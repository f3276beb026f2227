//! # Framework Detectors
//!
//! File: cli/src/detection/detectors/framework.rs
//!
//! ## Overview
//!
//! Single-technology classifiers. Each one looks for the manifest or config
//! file that defines its framework and builds a `ProjectInfo` carrying the
//! manifest's name, version, dependencies and scripts plus a default port.
//!
//! | Detector | Priority | Confidence | Default port |
//! |---|---|---|---|
//! | `nextjs` | 100 | 0.9 (`next` dependency) / 0.7 (config only) | 3000 |
//! | `react` | 90 | 0.85 | 3000, 5173 with Vite |
//! | `vue` | 88 | 0.85 | 8080, 5173 with Vite, 3000 for Nuxt |
//! | `svelte` | 86 | 0.85 | 5173 |
//! | `bun` | 85 | 0.8 (lockfile) / 0.78 | 3000 |
//! | `node` | 80 | 0.75, 0.8 with `openai` | 3000 |
//! | `python` | 70 | 0.8 with an entry file / 0.7 | 8000 |
//! | `go` | 60 | 0.85 | 8080 |
//! | `docker` | 50 | 0.6 | 80 |
//!
//! Overlaps are resolved by confidence in the registry: a Next.js project is
//! also a Node project, but the Next.js detector reports higher confidence.
//!
use super::{DetectResult, Detector, DetectorKind};
use crate::detection::context::DetectionContext;
use crate::detection::manifest::{self, PackageJson};
use crate::detection::ports;
use crate::detection::types::{ProjectInfo, ProjectType};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::trace;

/// All framework detectors.
pub fn all() -> Vec<Arc<dyn Detector>> {
    vec![
        Arc::new(NextjsDetector),
        Arc::new(ReactDetector),
        Arc::new(VueDetector),
        Arc::new(SvelteDetector),
        Arc::new(BunDetector),
        Arc::new(NodeDetector),
        Arc::new(PythonDetector),
        Arc::new(GoDetector),
        Arc::new(DockerDetector),
    ]
}

/// `typescript` when the project carries a tsconfig or the compiler, else `javascript`.
pub(crate) fn js_language(ctx: &DetectionContext, pkg: &PackageJson) -> &'static str {
    if ctx.exists("tsconfig.json") || pkg.has("typescript") {
        "typescript"
    } else {
        "javascript"
    }
}

/// A `ProjectInfo` seeded from `package.json`.
pub(crate) fn node_info(
    ctx: &DetectionContext,
    pkg: &PackageJson,
    project_type: ProjectType,
    confidence: f64,
) -> ProjectInfo {
    let name = pkg.name.clone().unwrap_or_else(|| ctx.dir_name());
    let mut info = ProjectInfo::new(project_type, name, confidence)
        .with_language(js_language(ctx, pkg));
    info.version = pkg.version.clone();
    info.dependencies = pkg.all_dependencies();
    info.scripts = pkg.scripts();
    info
}

fn script_port_or(info: &ProjectInfo, names: &[&str], default: u16) -> u16 {
    ports::port_from_scripts(&info.scripts, names).unwrap_or(default)
}

pub struct NextjsDetector;

impl Detector for NextjsDetector {
    fn name(&self) -> &'static str {
        "nextjs"
    }

    fn priority(&self) -> i32 {
        100
    }

    fn kind(&self) -> DetectorKind {
        DetectorKind::Framework
    }

    fn detect(&self, ctx: &DetectionContext) -> DetectResult {
        let pkg = ctx.package_json().unwrap_or_default();
        let has_config = ctx.any_exists(&["next.config.js", "next.config.mjs", "next.config.ts"]);
        let confidence = if pkg.has("next") {
            0.9
        } else if has_config {
            0.7
        } else {
            return Ok(None);
        };

        let project_type = if pkg.has_any(&["langchain", "@langchain/core", "@langchain/openai"]) {
            ProjectType::LangchainNextjs
        } else {
            ProjectType::Nextjs
        };
        let mut info = node_info(ctx, &pkg, project_type, confidence);
        info.port = script_port_or(&info, &["dev", "start"], 3000);

        let router = if ctx.any_exists(&["app", "src/app"]) {
            Some("app")
        } else if ctx.any_exists(&["pages", "src/pages"]) {
            Some("pages")
        } else {
            None
        };
        if let Some(router) = router {
            info = info.with_metadata("router", router);
        }
        if let Some(version) = pkg.version_of("next") {
            info = info.with_metadata("next_version", version);
        }
        Ok(Some(info))
    }
}

pub struct ReactDetector;

impl Detector for ReactDetector {
    fn name(&self) -> &'static str {
        "react"
    }

    fn priority(&self) -> i32 {
        90
    }

    fn kind(&self) -> DetectorKind {
        DetectorKind::Framework
    }

    fn detect(&self, ctx: &DetectionContext) -> DetectResult {
        let Some(pkg) = ctx.package_json() else {
            return Ok(None);
        };
        if !pkg.has("react") || pkg.has_any(&["next", "react-native", "expo"]) {
            return Ok(None);
        }
        let confidence = if pkg.has("react-dom") { 0.85 } else { 0.75 };
        let mut info = node_info(ctx, &pkg, ProjectType::React, confidence);

        let (bundler, default_port) = if pkg.has("vite") {
            ("vite", 5173)
        } else if pkg.has("react-scripts") {
            ("react-scripts", 3000)
        } else {
            ("unknown", 3000)
        };
        info.port = script_port_or(&info, &["dev", "start"], default_port);
        Ok(Some(info.with_metadata("bundler", bundler)))
    }
}

pub struct VueDetector;

impl Detector for VueDetector {
    fn name(&self) -> &'static str {
        "vue"
    }

    fn priority(&self) -> i32 {
        88
    }

    fn kind(&self) -> DetectorKind {
        DetectorKind::Framework
    }

    fn detect(&self, ctx: &DetectionContext) -> DetectResult {
        let pkg = ctx.package_json().unwrap_or_default();
        let is_nuxt = pkg.has_any(&["nuxt", "nuxt3", "@nuxt/core"])
            || ctx.any_exists(&["nuxt.config.js", "nuxt.config.ts"]);
        if is_nuxt {
            let mut info = node_info(ctx, &pkg, ProjectType::Nuxt, 0.85);
            info.port = script_port_or(&info, &["dev", "start"], 3000);
            return Ok(Some(info));
        }

        if !pkg.has("vue") && !ctx.exists("vue.config.js") {
            return Ok(None);
        }
        let mut info = node_info(ctx, &pkg, ProjectType::Vue, 0.85);
        let default_port = if pkg.has("vite") { 5173 } else { 8080 };
        info.port = script_port_or(&info, &["dev", "serve", "start"], default_port);
        Ok(Some(info))
    }
}

pub struct SvelteDetector;

impl Detector for SvelteDetector {
    fn name(&self) -> &'static str {
        "svelte"
    }

    fn priority(&self) -> i32 {
        86
    }

    fn kind(&self) -> DetectorKind {
        DetectorKind::Framework
    }

    fn detect(&self, ctx: &DetectionContext) -> DetectResult {
        let pkg = ctx.package_json().unwrap_or_default();
        let project_type = if pkg.has("@sveltejs/kit") {
            ProjectType::Sveltekit
        } else if pkg.has("svelte") || ctx.any_exists(&["svelte.config.js", "svelte.config.mjs"]) {
            ProjectType::Svelte
        } else {
            return Ok(None);
        };
        let mut info = node_info(ctx, &pkg, project_type, 0.85);
        info.port = script_port_or(&info, &["dev", "preview"], 5173);
        Ok(Some(info))
    }
}

pub struct BunDetector;

impl Detector for BunDetector {
    fn name(&self) -> &'static str {
        "bun"
    }

    fn priority(&self) -> i32 {
        85
    }

    fn kind(&self) -> DetectorKind {
        DetectorKind::Framework
    }

    fn detect(&self, ctx: &DetectionContext) -> DetectResult {
        let pkg = ctx.package_json().unwrap_or_default();
        let has_lockfile = ctx.any_exists(&["bun.lockb", "bun.lock", "bunfig.toml"]);
        let uses_bun = has_lockfile
            || pkg.has_any(&["bun-types", "@types/bun"])
            || pkg.script_mentions("bun ")
            || pkg.script_mentions("bunx")
            || pkg.has_bun_section();
        if !uses_bun {
            return Ok(None);
        }

        let project_type = if pkg.has("hono") {
            ProjectType::BunHono
        } else {
            ProjectType::Bun
        };
        let confidence = if has_lockfile { 0.8 } else { 0.78 };
        let mut info = node_info(ctx, &pkg, project_type, confidence);
        info.port = script_port_or(&info, &["dev", "start"], 3000);
        Ok(Some(info.with_metadata("runtime", "bun")))
    }
}

pub struct NodeDetector;

impl Detector for NodeDetector {
    fn name(&self) -> &'static str {
        "node"
    }

    fn priority(&self) -> i32 {
        80
    }

    fn kind(&self) -> DetectorKind {
        DetectorKind::Framework
    }

    fn detect(&self, ctx: &DetectionContext) -> DetectResult {
        let Some(pkg) = ctx.package_json() else {
            return Ok(None);
        };
        let mut info = if pkg.has("openai") {
            node_info(ctx, &pkg, ProjectType::OpenAiNode, 0.8)
        } else {
            node_info(ctx, &pkg, ProjectType::Node, 0.75)
        };
        info.port = ports::port_from_scripts(&info.scripts, &["start", "dev"])
            .or_else(|| env_file_port(ctx))
            .unwrap_or(3000);
        if pkg.has("openai") {
            info.llm_provider = Some("openai".to_string());
        }
        Ok(Some(info))
    }
}

/// `PORT=` assigned in `.env`.
fn env_file_port(ctx: &DetectionContext) -> Option<u16> {
    let content = ctx.read(".env")?;
    content
        .lines()
        .find_map(|line| line.trim().strip_prefix("PORT="))
        .and_then(ports::parse_port)
}

const PYTHON_MANIFESTS: &[&str] = &["requirements.txt", "pyproject.toml", "setup.py", "Pipfile"];
const PYTHON_ENTRY_FILES: &[&str] = &[
    "main.py",
    "app.py",
    "manage.py",
    "wsgi.py",
    "asgi.py",
    "server.py",
    "src/main.py",
    "app/main.py",
];
const LLAMA_PACKAGES: &[&str] = &["llama-index", "llama_index", "llama-cpp-python", "llama-parse"];

pub struct PythonDetector;

impl PythonDetector {
    /// `name = "..."` from pyproject.toml.
    fn pyproject_name(ctx: &DetectionContext) -> Option<String> {
        let content = ctx.read("pyproject.toml")?;
        let value: toml::Value = toml::from_str(&content).ok()?;
        value
            .get("project")
            .or_else(|| value.get("tool").and_then(|t| t.get("poetry")))
            .and_then(|p| p.get("name"))
            .and_then(toml::Value::as_str)
            .map(str::to_string)
    }

    /// Requirement name to version spec ("" when unpinned).
    fn requirements(content: &str) -> BTreeMap<String, String> {
        content
            .lines()
            .filter_map(|line| {
                let name = manifest::requirement_name(line)?;
                let rest = line.split('#').next().unwrap_or("").trim()[name.len()..].trim();
                Some((name.to_ascii_lowercase(), rest.to_string()))
            })
            .collect()
    }

    fn framework(deps: &BTreeMap<String, String>, ctx: &DetectionContext) -> Option<&'static str> {
        if deps.contains_key("django") || ctx.exists("manage.py") {
            Some("django")
        } else if deps.contains_key("fastapi") {
            Some("fastapi")
        } else if deps.contains_key("flask") {
            Some("flask")
        } else {
            None
        }
    }
}

impl Detector for PythonDetector {
    fn name(&self) -> &'static str {
        "python"
    }

    fn priority(&self) -> i32 {
        70
    }

    fn kind(&self) -> DetectorKind {
        DetectorKind::Framework
    }

    fn detect(&self, ctx: &DetectionContext) -> DetectResult {
        if !ctx.any_exists(PYTHON_MANIFESTS) {
            return Ok(None);
        }
        let deps = ctx
            .read("requirements.txt")
            .map(|content| Self::requirements(&content))
            .unwrap_or_default();
        let entry = PYTHON_ENTRY_FILES.iter().find(|f| ctx.exists(f));

        let uses_llama = LLAMA_PACKAGES.iter().any(|p| deps.contains_key(*p));
        let (project_type, confidence) = match (uses_llama, entry.is_some()) {
            (true, _) => (ProjectType::LlamaPython, 0.85),
            (false, true) => (ProjectType::Python, 0.8),
            (false, false) => (ProjectType::Python, 0.7),
        };
        let name = Self::pyproject_name(ctx).unwrap_or_else(|| ctx.dir_name());
        let framework = Self::framework(&deps, ctx);

        let parsed_port = entry
            .and_then(|f| ctx.read(f))
            .and_then(|source| ports::python_port(&source));
        let port = match (parsed_port, framework) {
            (Some(port), _) => port,
            (None, Some("flask")) => 5000,
            _ => 8000,
        };
        trace!(?entry, ?framework, port, "python project");

        let mut info = ProjectInfo::new(project_type, name, confidence)
            .with_port(port)
            .with_language("python");
        info.dependencies = deps;
        if let Some(entry) = entry {
            info = info.with_metadata("entrypoint", *entry);
        }
        if let Some(framework) = framework {
            info = info.with_metadata("framework", framework);
        }
        if uses_llama {
            info.llm_provider = Some("llama".to_string());
        }
        Ok(Some(info))
    }
}

const GO_MAIN_FILES: &[&str] = &["main.go", "server.go", "cmd/main.go", "cmd/server.go"];

pub struct GoDetector;

impl Detector for GoDetector {
    fn name(&self) -> &'static str {
        "go"
    }

    fn priority(&self) -> i32 {
        60
    }

    fn kind(&self) -> DetectorKind {
        DetectorKind::Framework
    }

    fn detect(&self, ctx: &DetectionContext) -> DetectResult {
        let Some(go_mod) = ctx.go_mod() else {
            return Ok(None);
        };
        let name = go_mod.module.clone().unwrap_or_else(|| ctx.dir_name());
        let port = GO_MAIN_FILES
            .iter()
            .filter_map(|f| ctx.read(f))
            .find_map(|source| ports::go_listen_port(&source))
            .unwrap_or(8080);

        let mut info = ProjectInfo::new(ProjectType::Go, name, 0.85)
            .with_port(port)
            .with_language("go");
        info.version = go_mod.go_version.clone();
        info.dependencies = go_mod.requires;
        Ok(Some(info))
    }
}

pub struct DockerDetector;

impl Detector for DockerDetector {
    fn name(&self) -> &'static str {
        "docker"
    }

    fn priority(&self) -> i32 {
        50
    }

    fn kind(&self) -> DetectorKind {
        DetectorKind::Framework
    }

    fn detect(&self, ctx: &DetectionContext) -> DetectResult {
        if !ctx.has_docker() {
            return Ok(None);
        }
        let port = ctx
            .read("Dockerfile")
            .and_then(|content| ports::dockerfile_expose(&content))
            .unwrap_or(80);

        let services: Vec<String> = ["docker-compose.yml", "docker-compose.yaml"]
            .iter()
            .find_map(|f| ctx.read(f))
            .map(|content| {
                manifest::compose_services(&content)
                    .into_iter()
                    .map(|(name, _)| name)
                    .collect()
            })
            .unwrap_or_default();

        let mut info = ProjectInfo::new(ProjectType::Docker, ctx.dir_name(), 0.6).with_port(port);
        info.has_docker = true;
        if !services.is_empty() {
            info = info.with_metadata("compose_services", services);
        }
        Ok(Some(info))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn run(detector: &dyn Detector, root: &Path) -> Option<ProjectInfo> {
        detector.detect(&DetectionContext::for_root(root)).unwrap()
    }

    #[test]
    fn test_nextjs_from_package_json_only() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "package.json",
            r#"{"name":"site","version":"0.2.0","dependencies":{"next":"14.1.0","react":"18"},"scripts":{"dev":"next dev"}}"#,
        );
        let info = run(&NextjsDetector, dir.path()).unwrap();
        assert_eq!(info.project_type, ProjectType::Nextjs);
        assert!(info.confidence.meets(0.7));
        assert_eq!(info.port, 3000);
        assert_eq!(info.name, "site");
        assert_eq!(info.version.as_deref(), Some("0.2.0"));
        assert_eq!(info.language.as_deref(), Some("javascript"));
        assert_eq!(
            info.metadata.get("next_version"),
            Some(&serde_json::json!("14.1.0"))
        );
        assert!(run(&ReactDetector, dir.path()).is_none());
    }

    #[test]
    fn test_nextjs_langchain_and_script_port() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "package.json",
            r#"{"dependencies":{"next":"14","langchain":"0.1","typescript":"5"},"scripts":{"dev":"next dev -p 4000"}}"#,
        );
        fs::create_dir_all(dir.path().join("app")).unwrap();
        let info = run(&NextjsDetector, dir.path()).unwrap();
        assert_eq!(info.project_type, ProjectType::LangchainNextjs);
        assert_eq!(info.port, 4000);
        assert_eq!(info.language.as_deref(), Some("typescript"));
        assert_eq!(info.metadata.get("router"), Some(&serde_json::json!("app")));
    }

    #[test]
    fn test_react_with_vite() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "package.json",
            r#"{"dependencies":{"react":"18","react-dom":"18"},"devDependencies":{"vite":"5"}}"#,
        );
        let info = run(&ReactDetector, dir.path()).unwrap();
        assert_eq!(info.project_type, ProjectType::React);
        assert_eq!(info.port, 5173);
        assert!((info.confidence.value() - 0.85).abs() < 1e-9);
    }

    #[test]
    fn test_vue_and_nuxt_ports() {
        let dir = tempdir().unwrap();
        write(dir.path(), "package.json", r#"{"dependencies":{"vue":"3"}}"#);
        let vue = run(&VueDetector, dir.path()).unwrap();
        assert_eq!(vue.project_type, ProjectType::Vue);
        assert_eq!(vue.port, 8080);

        write(dir.path(), "package.json", r#"{"dependencies":{"nuxt":"3","vue":"3"}}"#);
        let nuxt = run(&VueDetector, dir.path()).unwrap();
        assert_eq!(nuxt.project_type, ProjectType::Nuxt);
        assert_eq!(nuxt.port, 3000);
    }

    #[test]
    fn test_sveltekit() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "package.json",
            r#"{"devDependencies":{"@sveltejs/kit":"2","svelte":"4"}}"#,
        );
        let info = run(&SvelteDetector, dir.path()).unwrap();
        assert_eq!(info.project_type, ProjectType::Sveltekit);
        assert_eq!(info.port, 5173);
    }

    #[test]
    fn test_bun_hono() {
        let dir = tempdir().unwrap();
        write(dir.path(), "package.json", r#"{"dependencies":{"hono":"4"}}"#);
        write(dir.path(), "bun.lockb", "");
        let info = run(&BunDetector, dir.path()).unwrap();
        assert_eq!(info.project_type, ProjectType::BunHono);
        let node = run(&NodeDetector, dir.path()).unwrap();
        assert!(info.confidence > node.confidence);
    }

    #[test]
    fn test_node_port_and_openai() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "package.json",
            r#"{"dependencies":{"express":"4","openai":"4"},"scripts":{"start":"node index.js"}}"#,
        );
        write(dir.path(), ".env", "PORT=4100\n");
        let info = run(&NodeDetector, dir.path()).unwrap();
        assert_eq!(info.project_type, ProjectType::OpenAiNode);
        assert_eq!(info.port, 4100);
        assert_eq!(info.llm_provider.as_deref(), Some("openai"));
    }

    #[test]
    fn test_python_is_not_javascript() {
        let dir = tempdir().unwrap();
        write(dir.path(), "requirements.txt", "flask==3.0\n");
        write(dir.path(), "app.py", "app.run(host='0.0.0.0', port=5050)\n");
        for js in [&NextjsDetector as &dyn Detector, &ReactDetector, &NodeDetector] {
            assert!(run(js, dir.path()).is_none(), "{} matched python", js.name());
        }
        let info = run(&PythonDetector, dir.path()).unwrap();
        assert_eq!(info.project_type, ProjectType::Python);
        assert_eq!(info.port, 5050);
        assert_eq!(info.language.as_deref(), Some("python"));
        assert_eq!(info.dependencies.get("flask").map(String::as_str), Some("==3.0"));
        assert_eq!(info.metadata.get("framework"), Some(&serde_json::json!("flask")));
    }

    #[test]
    fn test_python_defaults_and_llama() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "pyproject.toml",
            "[project]\nname = \"ragbot\"\n",
        );
        write(dir.path(), "requirements.txt", "llama-index>=0.10\n");
        let info = run(&PythonDetector, dir.path()).unwrap();
        assert_eq!(info.project_type, ProjectType::LlamaPython);
        assert_eq!(info.name, "ragbot");
        assert_eq!(info.port, 8000);
    }

    #[test]
    fn test_go_port_and_module_name() {
        let dir = tempdir().unwrap();
        write(dir.path(), "go.mod", "module example.com/app\n\ngo 1.22\n");
        write(
            dir.path(),
            "main.go",
            "package main\n\nfunc main() {\n\thttp.ListenAndServe(\":9090\", nil)\n}\n",
        );
        let info = run(&GoDetector, dir.path()).unwrap();
        assert_eq!(info.project_type, ProjectType::Go);
        assert_eq!(info.name, "example.com/app");
        assert_eq!(info.port, 9090);
        assert_eq!(info.version.as_deref(), Some("1.22"));
    }

    #[test]
    fn test_go_default_port() {
        let dir = tempdir().unwrap();
        write(dir.path(), "go.mod", "module svc\n");
        assert_eq!(run(&GoDetector, dir.path()).unwrap().port, 8080);
    }

    #[test]
    fn test_docker_expose_and_compose() {
        let dir = tempdir().unwrap();
        write(dir.path(), "Dockerfile", "FROM nginx\nEXPOSE 8081\n");
        write(
            dir.path(),
            "docker-compose.yml",
            "services:\n  web:\n    build: .\n  db:\n    image: postgres:16\n",
        );
        let info = run(&DockerDetector, dir.path()).unwrap();
        assert_eq!(info.project_type, ProjectType::Docker);
        assert_eq!(info.port, 8081);
        assert!(info.has_docker);
        assert_eq!(
            info.metadata.get("compose_services"),
            Some(&serde_json::json!(["db", "web"]))
        );
    }

    #[test]
    fn test_empty_directory_has_no_opinions() {
        let dir = tempdir().unwrap();
        for detector in all() {
            assert!(run(detector.as_ref(), dir.path()).is_none(), "{}", detector.name());
        }
    }
}
