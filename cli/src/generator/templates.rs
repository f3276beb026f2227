//! # Pod Templates
//!
//! File: cli/src/generator/templates.rs
//!
//! ## Overview
//!
//! Maps a detected `ProjectType` to the pods of its deployment. Single-app
//! projects get one pod; full stacks get a frontend, an API and a database
//! pod wired together through `<pod>.pod` host names. Anything unknown gets
//! a single nginx pod on port 80 so the user always has a file to edit.
//!
//! A template leaves `image` empty when the image is built from the project;
//! the generator fills in the registry reference.
//!
use crate::detection::types::{ProjectInfo, ProjectType};

/// Image used when nothing was detected.
pub const FALLBACK_IMAGE: &str = "nginx:latest";
pub const FALLBACK_PORT: u16 = 80;

#[derive(Debug, Clone, PartialEq)]
pub struct PodTemplate {
    pub name: &'static str,
    pub pod_type: &'static str,
    pub path: Option<&'static str>,
    pub port: u16,
    pub vars: Vec<(&'static str, String)>,
    /// Fixed public image, `None` for images built from the project.
    pub image: Option<&'static str>,
}

impl PodTemplate {
    fn built(name: &'static str, pod_type: &'static str, path: Option<&'static str>, port: u16) -> Self {
        Self {
            name,
            pod_type,
            path,
            port,
            vars: Vec::new(),
            image: None,
        }
    }

    fn var(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.vars.push((key, value.into()));
        self
    }
}

fn placeholder(key: &str) -> String {
    format!("<% {} %>", key)
}

fn mongodb() -> PodTemplate {
    PodTemplate {
        name: "mongodb",
        pod_type: "database",
        path: None,
        port: 27017,
        vars: Vec::new(),
        image: Some("mongo:latest"),
    }
}

fn postgres(app: &str) -> PodTemplate {
    PodTemplate {
        name: "postgres",
        pod_type: "database",
        path: None,
        port: 5432,
        vars: vec![
            ("POSTGRES_USER", "postgres".to_string()),
            ("POSTGRES_PASSWORD", placeholder("POSTGRES_PASSWORD")),
            ("POSTGRES_DB", app.to_string()),
        ],
        image: Some("postgres:latest"),
    }
}

fn mongodb_uri(app: &str) -> String {
    format!("mongodb://mongodb.pod:27017/{}", app)
}

fn postgres_url(app: &str) -> String {
    format!(
        "postgresql://postgres:{}@postgres.pod:5432/{}",
        placeholder("POSTGRES_PASSWORD"),
        app
    )
}

fn supabase_web(info: &ProjectInfo) -> PodTemplate {
    PodTemplate::built("web", "nextjs", Some("/"), info.port_or(3000))
        .var("NODE_ENV", "production")
        .var("NEXT_PUBLIC_SUPABASE_URL", placeholder("SUPABASE_URL"))
        .var("NEXT_PUBLIC_SUPABASE_ANON_KEY", placeholder("SUPABASE_ANON_KEY"))
        .var("OPENAI_API_KEY", placeholder("OPENAI_API_KEY"))
}

/// Pods for `info`, primary pod first. `app` is the sanitized application name.
pub fn pods_for(info: &ProjectInfo, app: &str) -> Vec<PodTemplate> {
    use ProjectType::*;

    match info.project_type {
        Nextjs => vec![
            PodTemplate::built("web", "nextjs", Some("/"), info.port_or(3000))
                .var("NODE_ENV", "production"),
        ],
        LangchainNextjs => vec![
            PodTemplate::built("web", "nextjs", Some("/"), info.port_or(3000))
                .var("NODE_ENV", "production")
                .var("OPENAI_API_KEY", placeholder("OPENAI_API_KEY")),
        ],
        NextjsSupabaseLangchain | NextjsSupabaseOpenAi => vec![supabase_web(info)],
        React | Vue | Nuxt | Svelte | Sveltekit => vec![PodTemplate::built(
            "web",
            "frontend",
            Some("/"),
            info.port_or(3000),
        )],
        Node | Bun | BunHono => vec![
            PodTemplate::built("api", "backend", Some("/"), info.port_or(3000))
                .var("NODE_ENV", "production"),
        ],
        OpenAiNode => vec![
            PodTemplate::built("api", "backend", Some("/"), info.port_or(3000))
                .var("NODE_ENV", "production")
                .var("OPENAI_API_KEY", placeholder("OPENAI_API_KEY")),
        ],
        Python | LlamaPython => vec![
            PodTemplate::built("api", "backend", Some("/"), info.port_or(8000))
                .var("PYTHONUNBUFFERED", "1"),
        ],
        Go => vec![PodTemplate::built(
            "api",
            "backend",
            Some("/"),
            info.port_or(8080),
        )],
        Docker => vec![PodTemplate::built(
            "app",
            "backend",
            Some("/"),
            info.port_or(FALLBACK_PORT),
        )],
        Mern | Mean => vec![
            PodTemplate::built("web", "frontend", Some("/"), info.port_or(3000))
                .var("API_URL", "http://api.pod:8000"),
            PodTemplate::built("api", "backend", Some("/api"), 8000)
                .var("NODE_ENV", "production")
                .var("MONGODB_URI", mongodb_uri(app)),
            mongodb(),
        ],
        Pern => vec![
            PodTemplate::built("web", "frontend", Some("/"), info.port_or(3000))
                .var("API_URL", "http://api.pod:8000"),
            PodTemplate::built("api", "backend", Some("/api"), 8000)
                .var("NODE_ENV", "production")
                .var("DATABASE_URL", postgres_url(app)),
            postgres(app),
        ],
        DjangoReact => vec![
            PodTemplate::built("web", "frontend", Some("/"), 3000)
                .var("API_URL", "http://api.pod:8000"),
            PodTemplate::built("api", "django", Some("/api"), info.port_or(8000))
                .var("PYTHONUNBUFFERED", "1")
                .var("DATABASE_URL", postgres_url(app)),
            postgres(app),
        ],
        ExpressMongodb => vec![
            PodTemplate::built("api", "backend", Some("/"), info.port_or(3000))
                .var("NODE_ENV", "production")
                .var("MONGODB_URI", mongodb_uri(app)),
            mongodb(),
        ],
        Unknown => vec![PodTemplate {
            name: "web",
            pod_type: "frontend",
            path: Some("/"),
            port: FALLBACK_PORT,
            vars: Vec::new(),
            image: Some(FALLBACK_IMAGE),
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_type_has_a_primary_pod() {
        for project_type in ProjectType::ALL {
            let info = ProjectInfo::new(*project_type, "demo", 0.9);
            let pods = pods_for(&info, "demo");
            assert!(!pods.is_empty(), "{project_type} has no pods");
            assert!(pods.iter().all(|p| p.port > 0));
        }
    }

    #[test]
    fn test_full_stacks_reference_database_pods() {
        let mern = pods_for(&ProjectInfo::new(ProjectType::Mern, "shop", 0.95), "shop");
        let types: Vec<_> = mern.iter().map(|p| p.pod_type).collect();
        assert_eq!(types, vec!["frontend", "backend", "database"]);
        assert!(mern[1]
            .vars
            .contains(&("MONGODB_URI", "mongodb://mongodb.pod:27017/shop".to_string())));

        let pern = pods_for(&ProjectInfo::new(ProjectType::Pern, "shop", 0.95), "shop");
        assert_eq!(pern[2].image, Some("postgres:latest"));
        assert_eq!(pern[2].port, 5432);
    }

    #[test]
    fn test_detected_port_is_used() {
        let info = ProjectInfo::new(ProjectType::Go, "svc", 0.85).with_port(9090);
        assert_eq!(pods_for(&info, "svc")[0].port, 9090);
        let info = ProjectInfo::new(ProjectType::Python, "svc", 0.8);
        assert_eq!(pods_for(&info, "svc")[0].port, 8000);
    }
}
