//! # Integration Detectors
//!
//! File: cli/src/detection/detectors/integration.rs
//!
//! Detectors for services and libraries a project talks to. They never
//! classify the project: a hit is an `Unknown`-typed `ProjectInfo` whose
//! `integration` metadata names the service, and for AI services whose
//! `llm_provider` names the provider. The registry collects every hit that
//! clears the integration threshold onto the final result.
//!
use super::{DetectResult, Detector, DetectorKind};
use crate::detection::components::has_component;
use crate::detection::context::DetectionContext;
use crate::detection::types::{ProjectInfo, ProjectType};
use std::sync::Arc;

/// Confidence reported for a detected integration.
const INTEGRATION_CONFIDENCE: f64 = 0.8;

pub struct IntegrationDetector {
    name: &'static str,
    priority: i32,
    component: &'static str,
    llm_provider: Option<&'static str>,
}

impl IntegrationDetector {
    pub const fn new(
        name: &'static str,
        priority: i32,
        component: &'static str,
        llm_provider: Option<&'static str>,
    ) -> Self {
        Self {
            name,
            priority,
            component,
            llm_provider,
        }
    }
}

/// All integration detectors, most significant first.
pub fn all() -> Vec<Arc<dyn Detector>> {
    [
        IntegrationDetector::new("openai", 40, "openai", Some("openai")),
        IntegrationDetector::new("langchain", 38, "langchain", Some("langchain")),
        IntegrationDetector::new("gemini", 36, "gemini", Some("google")),
        IntegrationDetector::new("supabase", 34, "supabase", None),
        IntegrationDetector::new("postgresql", 30, "postgres", None),
        IntegrationDetector::new("pgvector", 28, "pgvector", None),
        IntegrationDetector::new("stripe", 24, "stripe", None),
        IntegrationDetector::new("tailwind", 20, "tailwind", None),
    ]
    .into_iter()
    .map(|d| Arc::new(d) as Arc<dyn Detector>)
    .collect()
}

impl Detector for IntegrationDetector {
    fn name(&self) -> &'static str {
        self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn kind(&self) -> DetectorKind {
        DetectorKind::Integration
    }

    fn detect(&self, ctx: &DetectionContext) -> DetectResult {
        if !has_component(ctx, self.component) {
            return Ok(None);
        }
        let mut info = ProjectInfo::new(ProjectType::Unknown, ctx.dir_name(), INTEGRATION_CONFIDENCE)
            .with_metadata("integration", self.name);
        info.llm_provider = self.llm_provider.map(str::to_string);
        Ok(Some(info))
    }
}
