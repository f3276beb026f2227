//! # Stack Definitions
//!
//! File: cli/src/detection/stacks.rs
//!
//! ## Overview
//!
//! The static catalog of multi-technology stacks evaluated by the stack
//! detector. Each `StackDefinition` lists its components by role, the
//! component ids that must be present (required) or merely corroborate
//! (optional), and two sets of weighted patterns: `main_patterns` that a
//! real instance of the stack generally matches and `extra_patterns` that
//! add bonus evidence.
//!
//! The catalog is built once on first use (`catalog()`), which also compiles
//! every pattern regex exactly once for the life of the process. Catalog
//! order is the tie-break order when two stacks score the same.
//!
use crate::detection::pattern::DetectionPattern;
use crate::detection::types::ProjectType;
use std::sync::OnceLock;

const JS_SOURCES: &str = "**/*.{js,ts,jsx,tsx}";

/// Components of a stack grouped by role.
#[derive(Debug, Clone, Default)]
pub struct StackComponents {
    pub frontend: Vec<&'static str>,
    pub backend: Vec<&'static str>,
    pub database: Vec<&'static str>,
    pub ai: Vec<&'static str>,
    pub deployment: Vec<&'static str>,
}

#[derive(Debug, Clone)]
pub struct StackDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub project_type: ProjectType,
    pub components: StackComponents,
    pub required: Vec<&'static str>,
    pub optional: Vec<&'static str>,
    pub main_patterns: Vec<DetectionPattern>,
    pub extra_patterns: Vec<DetectionPattern>,
    pub default_port: u16,
    /// Primary language of the stack's entry point.
    pub language: &'static str,
}

impl StackDefinition {
    /// Main and extra patterns in evaluation order.
    pub fn patterns(&self) -> impl Iterator<Item = &DetectionPattern> {
        self.main_patterns.iter().chain(self.extra_patterns.iter())
    }
}

/// The process-wide stack catalog.
pub fn catalog() -> &'static [StackDefinition] {
    static CATALOG: OnceLock<Vec<StackDefinition>> = OnceLock::new();
    CATALOG.get_or_init(build_catalog)
}

/// Looks a stack up by id.
pub fn find(id: &str) -> Option<&'static StackDefinition> {
    catalog().iter().find(|s| s.id == id)
}

fn build_catalog() -> Vec<StackDefinition> {
    vec![
        StackDefinition {
            id: "nextjs-supabase-langchain",
            name: "Next.js + Supabase + LangChain",
            description: "AI application with a Next.js frontend, Supabase for auth and storage, and LangChain orchestration",
            project_type: ProjectType::NextjsSupabaseLangchain,
            components: StackComponents {
                frontend: vec!["nextjs", "tailwind"],
                backend: vec!["nextjs"],
                database: vec!["supabase", "pgvector"],
                ai: vec!["langchain"],
                deployment: vec![],
            },
            required: vec!["nextjs", "supabase", "langchain"],
            optional: vec!["pgvector", "tailwind", "stripe"],
            main_patterns: vec![
                DetectionPattern::dependency("next", "package.json", 0.6),
                DetectionPattern::dependency("@supabase/supabase-js", "package.json", 0.6),
                DetectionPattern::dependency("langchain", "package.json", 0.6),
            ],
            extra_patterns: vec![
                DetectionPattern::file("app/api/**/route.ts", 0.1),
                DetectionPattern::env_var("SUPABASE_URL", 0.1),
                DetectionPattern::env_var("SUPABASE_ANON_KEY", 0.1),
                DetectionPattern::import(r"import.*?createClient.*?supabase", JS_SOURCES, 0.1),
                DetectionPattern::import(r"import.*from.*langchain", JS_SOURCES, 0.1),
            ],
            default_port: 3000,
            language: "typescript",
        },
        StackDefinition {
            id: "nextjs-supabase-openai",
            name: "Next.js + Supabase + OpenAI",
            description: "AI application with a Next.js frontend, Supabase backend and the OpenAI API",
            project_type: ProjectType::NextjsSupabaseOpenAi,
            components: StackComponents {
                frontend: vec!["nextjs", "tailwind"],
                backend: vec!["nextjs"],
                database: vec!["supabase"],
                ai: vec!["openai"],
                deployment: vec![],
            },
            required: vec!["nextjs", "supabase", "openai"],
            optional: vec!["tailwind", "stripe"],
            main_patterns: vec![
                DetectionPattern::dependency("next", "package.json", 0.6),
                DetectionPattern::dependency("@supabase/supabase-js", "package.json", 0.6),
                DetectionPattern::dependency("openai", "package.json", 0.6),
            ],
            extra_patterns: vec![
                DetectionPattern::env_var("OPENAI_API_KEY", 0.1),
                DetectionPattern::import(r"import.*?OpenAI", JS_SOURCES, 0.1),
            ],
            default_port: 3000,
            language: "typescript",
        },
        StackDefinition {
            id: "django-react",
            name: "Django + React",
            description: "Django REST backend with a React frontend in frontend/",
            project_type: ProjectType::DjangoReact,
            components: StackComponents {
                frontend: vec!["react"],
                backend: vec!["django"],
                database: vec!["postgres"],
                ai: vec![],
                deployment: vec![],
            },
            required: vec!["django", "react"],
            optional: vec!["postgres", "redis"],
            main_patterns: vec![
                DetectionPattern::file("manage.py", 0.5),
                DetectionPattern::file("frontend/package.json", 0.3),
                DetectionPattern::dependency("react", "frontend/package.json", 0.3),
            ],
            extra_patterns: vec![
                DetectionPattern::file("requirements.txt", 0.1),
                DetectionPattern::content(r"(?i)django", "requirements.txt", 0.1),
                DetectionPattern::content(r"(?i)psycopg2", "requirements.txt", 0.1),
            ],
            default_port: 8000,
            language: "python",
        },
        StackDefinition {
            id: "express-mongodb",
            name: "Express + MongoDB",
            description: "Express API backed by MongoDB",
            project_type: ProjectType::ExpressMongodb,
            components: StackComponents {
                frontend: vec![],
                backend: vec!["express", "node"],
                database: vec!["mongodb"],
                ai: vec![],
                deployment: vec![],
            },
            required: vec!["express", "mongodb"],
            optional: vec!["mongoose"],
            main_patterns: vec![
                DetectionPattern::dependency("express", "package.json", 0.5),
                DetectionPattern::dependency("mongodb", "package.json", 0.4),
            ],
            extra_patterns: vec![
                DetectionPattern::env_var("MONGO_URI", 0.1),
                DetectionPattern::content(r"mongoose\.connect", "**/*.js", 0.1),
                DetectionPattern::dependency("mongoose", "package.json", 0.1),
            ],
            default_port: 3000,
            language: "javascript",
        },
    ]
}
