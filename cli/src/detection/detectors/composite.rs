//! # Composite Detectors
//!
//! File: cli/src/detection/detectors/composite.rs
//!
//! ## Overview
//!
//! Full-stack combinations that are usually split across a root manifest and
//! `client/`, `server/`, `frontend/` or `backend/` sub-packages. The
//! dependencies of every manifest found are merged before the combination
//! is checked.
//!
//! | Detector | Requires | Port |
//! |---|---|---|
//! | `mern` | mongodb or mongoose, express, react | 3000 |
//! | `pern` | pg, express, react | 3000 |
//! | `mean` | mongodb or mongoose, express, @angular/core | 4200 |
//!
//! A match reports 0.95 so a full stack outranks every single-framework
//! detector that sees one of its halves.
//!
use super::framework::js_language;
use super::{DetectResult, Detector, DetectorKind};
use crate::detection::context::DetectionContext;
use crate::detection::manifest::PackageJson;
use crate::detection::types::{ProjectInfo, ProjectType};
use std::collections::BTreeMap;
use tracing::trace;

const SUB_PACKAGES: &[&str] = &[
    "client/package.json",
    "server/package.json",
    "frontend/package.json",
    "backend/package.json",
];

const COMPOSITE_CONFIDENCE: f64 = 0.95;

/// Dependencies of the root and sub-package manifests.
struct MergedPackages {
    root: Option<PackageJson>,
    dependencies: BTreeMap<String, String>,
    layout: Vec<&'static str>,
}

impl MergedPackages {
    fn load(ctx: &DetectionContext) -> Option<Self> {
        let root = ctx.package_json();
        let mut dependencies = root
            .as_ref()
            .map(PackageJson::all_dependencies)
            .unwrap_or_default();
        let mut layout = Vec::new();
        for &sub in SUB_PACKAGES {
            if let Some(pkg) = ctx.package_json_at(sub) {
                for (name, version) in pkg.all_dependencies() {
                    dependencies.entry(name).or_insert(version);
                }
                if let Some((dir, _)) = sub.split_once('/') {
                    layout.push(dir);
                }
            }
        }
        if root.is_none() && layout.is_empty() {
            return None;
        }
        Some(Self {
            root,
            dependencies,
            layout,
        })
    }

    fn has(&self, name: &str) -> bool {
        self.dependencies.contains_key(name)
    }

    fn has_any(&self, names: &[&str]) -> bool {
        names.iter().any(|n| self.has(n))
    }

    fn into_info(self, ctx: &DetectionContext, project_type: ProjectType, port: u16) -> ProjectInfo {
        let root = self.root.unwrap_or_default();
        let name = root.name.clone().unwrap_or_else(|| ctx.dir_name());
        let mut info = ProjectInfo::new(project_type, name, COMPOSITE_CONFIDENCE)
            .with_port(port)
            .with_language(js_language(ctx, &root));
        info.version = root.version.clone();
        info.scripts = root.scripts();
        info.dependencies = self.dependencies;
        if !self.layout.is_empty() {
            info = info.with_metadata("layout", self.layout);
        }
        info
    }
}

fn detect_combination(
    ctx: &DetectionContext,
    project_type: ProjectType,
    database: &[&str],
    frontend: &str,
    port: u16,
) -> DetectResult {
    let Some(packages) = MergedPackages::load(ctx) else {
        return Ok(None);
    };
    let matched =
        packages.has_any(database) && packages.has("express") && packages.has(frontend);
    trace!(%project_type, matched, "composite check");
    Ok(matched.then(|| packages.into_info(ctx, project_type, port)))
}

pub struct MernDetector;

impl Detector for MernDetector {
    fn name(&self) -> &'static str {
        "mern"
    }

    fn priority(&self) -> i32 {
        150
    }

    fn kind(&self) -> DetectorKind {
        DetectorKind::Composite
    }

    fn detect(&self, ctx: &DetectionContext) -> DetectResult {
        detect_combination(ctx, ProjectType::Mern, &["mongodb", "mongoose"], "react", 3000)
    }
}

pub struct PernDetector;

impl Detector for PernDetector {
    fn name(&self) -> &'static str {
        "pern"
    }

    fn priority(&self) -> i32 {
        140
    }

    fn kind(&self) -> DetectorKind {
        DetectorKind::Composite
    }

    fn detect(&self, ctx: &DetectionContext) -> DetectResult {
        detect_combination(ctx, ProjectType::Pern, &["pg", "postgres"], "react", 3000)
    }
}

pub struct MeanDetector;

impl Detector for MeanDetector {
    fn name(&self) -> &'static str {
        "mean"
    }

    fn priority(&self) -> i32 {
        130
    }

    fn kind(&self) -> DetectorKind {
        DetectorKind::Composite
    }

    fn detect(&self, ctx: &DetectionContext) -> DetectResult {
        detect_combination(
            ctx,
            ProjectType::Mean,
            &["mongodb", "mongoose"],
            "@angular/core",
            4200,
        )
    }
}
