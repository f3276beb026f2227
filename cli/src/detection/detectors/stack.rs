//! # Stack Detector
//!
//! File: cli/src/detection/detectors/stack.rs
//!
//! ## Overview
//!
//! Runs the stack evaluator over every catalog entry and reports the best
//! scoring stack when its confidence exceeds 0.5. Equal scores keep the
//! earlier catalog entry.
//!
//! The reported `ProjectInfo` carries the stack's project type and default
//! port (a port set in the `dev`/`start` script wins), the root manifest's
//! name, version, dependencies and scripts, and metadata describing which
//! components were found.
//!
use super::framework::js_language;
use super::{DetectResult, Detector, DetectorKind};
use crate::detection::context::DetectionContext;
use crate::detection::evaluator::{self, StackEvaluation};
use crate::detection::ports;
use crate::detection::stacks::{self, StackDefinition};
use crate::detection::types::ProjectInfo;
use tracing::debug;

/// A stack must score above this to be reported.
const MIN_STACK_CONFIDENCE: f64 = 0.5;

pub struct StackDetector;

impl StackDetector {
    fn best(ctx: &DetectionContext) -> Option<(&'static StackDefinition, StackEvaluation)> {
        let mut best: Option<(&'static StackDefinition, StackEvaluation)> = None;
        for stack in stacks::catalog() {
            if ctx.is_cancelled() {
                return None;
            }
            let eval = evaluator::evaluate(ctx, stack);
            debug!(stack = stack.id, confidence = %eval.confidence, "stack evaluated");
            let better = best
                .as_ref()
                .map_or(true, |(_, current)| eval.confidence > current.confidence);
            if better {
                best = Some((stack, eval));
            }
        }
        best.filter(|(_, eval)| eval.confidence.value() > MIN_STACK_CONFIDENCE)
    }

    fn language(ctx: &DetectionContext, stack: &StackDefinition) -> String {
        match (stack.language, ctx.package_json()) {
            ("typescript" | "javascript", Some(pkg)) => js_language(ctx, &pkg).to_string(),
            (hint, _) => hint.to_string(),
        }
    }

    fn llm_provider(stack: &StackDefinition) -> Option<String> {
        stack.components.ai.first().map(|ai| ai.to_string())
    }
}

impl Detector for StackDetector {
    fn name(&self) -> &'static str {
        "stack"
    }

    fn priority(&self) -> i32 {
        145
    }

    fn kind(&self) -> DetectorKind {
        DetectorKind::Stack
    }

    fn detect(&self, ctx: &DetectionContext) -> DetectResult {
        let Some((stack, eval)) = Self::best(ctx) else {
            return Ok(None);
        };
        let pkg = ctx.package_json().unwrap_or_default();
        let name = pkg.name.clone().unwrap_or_else(|| ctx.dir_name());

        let mut info = ProjectInfo::new(stack.project_type, name, eval.confidence.value())
            .with_language(Self::language(ctx, stack))
            .with_metadata("stack", stack.id)
            .with_metadata("stack_name", stack.name)
            .with_metadata("required_ratio", eval.required_ratio)
            .with_metadata(
                "components",
                serde_json::to_value(&eval.components).unwrap_or_default(),
            );
        info.version = pkg.version.clone();
        info.dependencies = pkg.all_dependencies();
        info.scripts = pkg.scripts();
        info.port = ports::port_from_scripts(&info.scripts, &["dev", "start"])
            .unwrap_or(stack.default_port);
        info.llm_provider = Self::llm_provider(stack);
        Ok(Some(info))
    }
}
