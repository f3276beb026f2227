//! # Stack Evaluator
//!
//! File: cli/src/detection/evaluator.rs
//!
//! ## Overview
//!
//! Scores one `StackDefinition` against a project:
//!
//! 1. `pattern_score` = matched pattern weight / total pattern weight
//!    (0 when the stack declares no weight).
//! 2. `required_ratio` = detected required components / required components
//!    (1 when none are declared).
//! 3. Each detected optional component adds 0.05 to `pattern_score`.
//! 4. `confidence` = `min(pattern_score * required_ratio, 0.95)`.
//!
//! The multiplication gates the score on the defining technologies: a stack
//! with none of its required components scores exactly zero.
//!
use crate::detection::components::has_component;
use crate::detection::context::DetectionContext;
use crate::detection::stacks::StackDefinition;
use crate::detection::types::Confidence;
use std::collections::BTreeMap;
use tracing::trace;

/// Bonus per detected optional component.
pub const OPTIONAL_COMPONENT_BONUS: f64 = 0.05;

#[derive(Debug, Clone, PartialEq)]
pub struct StackEvaluation {
    pub stack_id: &'static str,
    pub confidence: Confidence,
    pub pattern_score: f64,
    pub required_ratio: f64,
    /// Every required and optional component tested, with its outcome.
    pub components: BTreeMap<String, bool>,
}

pub fn evaluate(ctx: &DetectionContext, stack: &StackDefinition) -> StackEvaluation {
    let (mut matched, mut max) = (0.0_f64, 0.0_f64);
    for pattern in stack.patterns() {
        max += pattern.weight();
        if pattern.matches(ctx) {
            trace!(stack = stack.id, kind = %pattern.kind(), pattern = pattern.pattern(), "pattern matched");
            matched += pattern.weight();
        }
    }
    let mut pattern_score = if max > 0.0 { matched / max } else { 0.0 };

    let mut components = BTreeMap::new();
    let detected_required = stack
        .required
        .iter()
        .filter(|c| {
            let present = has_component(ctx, c);
            components.insert(c.to_string(), present);
            present
        })
        .count();
    let required_ratio = if stack.required.is_empty() {
        1.0
    } else {
        detected_required as f64 / stack.required.len() as f64
    };

    for optional in &stack.optional {
        let present = has_component(ctx, optional);
        components.insert(optional.to_string(), present);
        if present {
            pattern_score += OPTIONAL_COMPONENT_BONUS;
        }
    }

    StackEvaluation {
        stack_id: stack.id,
        confidence: Confidence::new(pattern_score * required_ratio),
        pattern_score,
        required_ratio,
        components,
    }
}
