//! # Component Heuristics
//!
//! File: cli/src/detection/components.rs
//!
//! ## Overview
//!
//! `has_component` answers "is technology X present?" for the component ids
//! referenced by stack definitions. Each entry is a short list of checks
//! against manifests, characteristic config files, env files or, for
//! `pgvector`, SQL and source contents. Unknown ids are never present.
//!
use crate::detection::context::DetectionContext;
use tracing::trace;

const PACKAGE_JSON: &str = "package.json";
const REQUIREMENTS: &str = "requirements.txt";

/// Component ids understood by `has_component`.
pub const KNOWN_COMPONENTS: &[&str] = &[
    "nextjs", "react", "vue", "svelte", "supabase", "langchain", "openai", "gemini", "postgres",
    "pgvector", "tailwind", "stripe", "django", "flask", "express", "mongodb", "mongoose", "redis",
    "node",
];

pub fn has_component(ctx: &DetectionContext, component: &str) -> bool {
    if !KNOWN_COMPONENTS.contains(&component) {
        trace!(component, "unknown component id");
        return false;
    }
    let npm = |dep: &str| ctx.has_dependency(dep, PACKAGE_JSON);
    let pip = |dep: &str| ctx.has_dependency(dep, REQUIREMENTS);

    match component {
        "nextjs" => ctx.any_exists(&["next.config.js", "next.config.mjs", "next.config.ts"]) || npm("next"),
        // Root app or a `frontend/` app next to a Python backend.
        "react" => {
            (npm("react") && npm("react-dom"))
                || (ctx.has_dependency("react", "frontend/package.json")
                    && ctx.has_dependency("react-dom", "frontend/package.json"))
        }
        "vue" => npm("vue") || ctx.exists("vue.config.js"),
        "svelte" => npm("svelte") || ctx.any_exists(&["svelte.config.js", "svelte.config.mjs"]),
        "supabase" => npm("@supabase/supabase-js") || ctx.has_env_var("SUPABASE_URL"),
        "langchain" => npm("langchain") || pip("langchain"),
        "openai" => npm("openai") || pip("openai") || ctx.has_env_var("OPENAI_API_KEY"),
        "gemini" => {
            npm("@google/generative-ai")
                || pip("google-generativeai")
                || ctx.has_env_var("GEMINI_API_KEY")
        }
        "postgres" => npm("pg") || pip("psycopg2") || pip("psycopg2-binary") || ctx.has_env_var("DATABASE_URL"),
        "pgvector" => {
            pip("pgvector")
                || ctx.content_contains("CREATE EXTENSION vector", "**/*.sql")
                || ctx.content_contains("pgvector", "**/*.{js,ts,py}")
        }
        "tailwind" => npm("tailwindcss") || ctx.any_exists(&["tailwind.config.js", "tailwind.config.ts"]),
        "stripe" => npm("stripe") || pip("stripe") || ctx.has_env_var("STRIPE_SECRET_KEY"),
        "django" => {
            ctx.exists("manage.py")
                && ctx
                    .read(REQUIREMENTS)
                    .is_some_and(|c| c.to_ascii_lowercase().contains("django"))
        }
        "flask" => pip("flask"),
        "express" => npm("express"),
        "mongodb" => npm("mongodb") || npm("mongoose") || ctx.has_env_var("MONGO_URI"),
        "mongoose" => npm("mongoose"),
        "redis" => npm("redis") || npm("ioredis") || pip("redis") || ctx.has_env_var("REDIS_URL"),
        "node" => ctx.exists(PACKAGE_JSON),
        _ => false,
    }
}
