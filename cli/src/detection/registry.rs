//! # Detector Registry
//!
//! File: cli/src/detection/registry.rs
//!
//! ## Overview
//!
//! The registry owns the detector set, the confidence thresholds and the
//! report cache. It offers two ways to classify a project:
//!
//! - **`scan`**: a sequential priority scan that returns the first
//!   classifying detector's result. Cheap, used by `detect --first-match`.
//! - **`detect_report` / `detect_project`**: the full pass. Every detector
//!   runs concurrently and the results are merged by confidence.
//!
//! ## Architecture
//!
//! A full pass builds one `DetectionContext` (and so one `FileProbe`) that
//! every detector shares. Each `DetectionTask` runs its detector on the
//! blocking pool under its own timeout and child cancellation token; a
//! `JoinSet` collects the outcomes on the calling task, where they are
//! merged without locking:
//!
//! 1. Each result's confidence is multiplied by its task weight.
//! 2. Per category (project type, editor, language, integration) the
//!    highest weighted confidence wins; equal confidences go to the higher
//!    priority detector, so the outcome never depends on scheduling.
//! 3. A category winner only counts if it clears its threshold. Without a
//!    project type the pass fails with `Unsupported` when the directory holds
//!    the build file of an ecosystem no detector handles, `NotFound` otherwise.
//!
//! Detector errors, panics and timeouts are logged and skipped. Cancelling
//! the caller's token aborts the pass and returns a "detection cancelled"
//! error.
//!
//! Merged reports are cached per canonical directory for the configured TTL.
//!
//! ## Examples
//!
//! ```rust
//! let registry = DetectorRegistry::from_config(&config.detection);
//! let info = registry
//!     .detect_project(Path::new("."), &CancellationToken::new())
//!     .await?;
//! println!("{} on port {}", info.project_type, info.port);
//! ```
//!
use crate::common::fs::probe::{FileProbe, ProbeStats};
use crate::core::config::{DetectionConfig, ThresholdConfig};
use crate::core::error::{DetectionError, CANCELLED_MESSAGE};
use crate::detection::cache::DetectionCache;
use crate::detection::context::DetectionContext;
use crate::detection::detectors::{self, Detector, DetectorKind};
use crate::detection::types::{Confidence, ProjectInfo, ProjectType};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

/// Message of the `NotFound` error returned when nothing classifies the project.
pub const NOT_DETECTED_MESSAGE: &str = "project type could not be detected";

/// Build files of ecosystems no detector handles, with a display name.
const UNSUPPORTED_MARKERS: &[(&str, &str)] = &[
    ("Cargo.toml", "Rust"),
    ("pom.xml", "Java (Maven)"),
    ("build.gradle", "Java (Gradle)"),
    ("build.gradle.kts", "Java (Gradle)"),
    ("Gemfile", "Ruby"),
    ("composer.json", "PHP"),
    ("mix.exs", "Elixir"),
];

/// Error for a directory nothing classified: `Unsupported` when it carries a
/// recognisable build file of an unhandled ecosystem, `NotFound` otherwise.
fn undetected(ctx: &DetectionContext) -> DetectionError {
    match UNSUPPORTED_MARKERS.iter().find(|(file, _)| ctx.exists(file)) {
        Some((file, ecosystem)) => {
            DetectionError::unsupported(format!("{ecosystem} projects ({file}) are not supported"))
        }
        None => DetectionError::not_found(NOT_DETECTED_MESSAGE),
    }
}

/// A detector with its merge weight and time budget.
#[derive(Clone)]
pub struct DetectionTask {
    detector: Arc<dyn Detector>,
    weight: f64,
    timeout: Duration,
}

impl DetectionTask {
    pub fn new(detector: Arc<dyn Detector>, weight: f64, timeout: Duration) -> Self {
        Self {
            detector,
            weight: weight.clamp(0.0, 1.0),
            timeout,
        }
    }

    pub fn detector(&self) -> &Arc<dyn Detector> {
        &self.detector
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// One classifying detector's proposal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub detector: String,
    pub project_type: ProjectType,
    pub confidence: Confidence,
}

/// Merged outcome of a full detection pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DetectionReport {
    pub project: ProjectInfo,
    /// Detector whose result became `project`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detector: Option<String>,
    pub integrations: Vec<String>,
    /// Every classifying proposal, best first.
    pub candidates: Vec<Candidate>,
}

pub struct DetectorRegistry {
    tasks: Vec<DetectionTask>,
    thresholds: ThresholdConfig,
    task_timeout: Duration,
    editor_timeout: Duration,
    cache: DetectionCache,
    stats: Arc<ProbeStats>,
}

impl DetectorRegistry {
    /// An empty registry using `config`'s thresholds, timeouts and cache TTL.
    pub fn new(config: &DetectionConfig) -> Self {
        Self {
            tasks: Vec::new(),
            thresholds: config.thresholds,
            task_timeout: config.task_timeout(),
            editor_timeout: config.editor_timeout(),
            cache: DetectionCache::new(config.cache_ttl()),
            stats: Arc::new(ProbeStats::default()),
        }
    }

    /// A registry loaded with the built-in detectors.
    pub fn from_config(config: &DetectionConfig) -> Self {
        let mut registry = Self::new(config);
        for detector in detectors::builtin() {
            registry.register(detector);
        }
        registry
    }

    /// Registers `detector` with weight 1 and the timeout for its kind.
    pub fn register(&mut self, detector: Arc<dyn Detector>) {
        let timeout = match detector.kind() {
            DetectorKind::Editor => self.editor_timeout,
            _ => self.task_timeout,
        };
        self.register_task(DetectionTask::new(detector, 1.0, timeout));
    }

    pub fn register_task(&mut self, task: DetectionTask) {
        trace!(
            detector = task.detector.name(),
            priority = task.detector.priority(),
            "registering detector"
        );
        self.tasks.push(task);
        self.tasks
            .sort_by_key(|t| std::cmp::Reverse(t.detector.priority()));
    }

    /// Tasks in descending priority order.
    pub fn tasks(&self) -> &[DetectionTask] {
        &self.tasks
    }

    pub fn thresholds(&self) -> ThresholdConfig {
        self.thresholds
    }

    pub fn cache(&self) -> &DetectionCache {
        &self.cache
    }

    /// Filesystem access counters shared by every pass of this registry.
    pub fn stats(&self) -> &Arc<ProbeStats> {
        &self.stats
    }

    fn canonical_root(dir: &Path) -> Result<PathBuf, DetectionError> {
        let root = dir.canonicalize().map_err(|e| {
            DetectionError::invalid(format!("cannot access directory {}", dir.display()))
                .with_cause(e)
        })?;
        if !root.is_dir() {
            return Err(DetectionError::invalid(format!(
                "{} is not a directory",
                root.display()
            )));
        }
        Ok(root)
    }

    fn new_context(&self, root: PathBuf, cancel: CancellationToken) -> DetectionContext {
        DetectionContext::new(root, FileProbe::with_stats(self.stats.clone()), cancel)
    }

    /// Sequential scan in priority order; the first classifying result wins.
    ///
    /// Editor and integration detectors are skipped. No cache, no threshold.
    pub fn scan(&self, dir: &Path) -> Result<ProjectInfo, DetectionError> {
        let root = Self::canonical_root(dir)?;
        let ctx = self.new_context(root, CancellationToken::new());

        for task in self.tasks.iter().filter(|t| t.detector.kind().classifies()) {
            let detector = &task.detector;
            match detector.detect(&ctx) {
                Ok(Some(mut info)) if info.project_type.is_known() => {
                    debug!(detector = detector.name(), project_type = %info.project_type, "scan matched");
                    info.has_docker = ctx.has_docker();
                    return Ok(info);
                }
                Ok(_) => trace!(detector = detector.name(), "no match"),
                Err(e) => debug!(detector = detector.name(), error = %e, "detector failed"),
            }
        }
        Err(undetected(&ctx))
    }

    /// Full pass for `dir`, served from the cache when fresh.
    pub async fn detect_report(
        &self,
        dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<DetectionReport, DetectionError> {
        let root = Self::canonical_root(dir)?;
        if let Some(report) = self.cache.get(&root) {
            debug!(
                "Using cached detection for {} (ttl {:?})",
                root.display(),
                self.cache.ttl()
            );
            return Ok(report);
        }
        let report = self.run(root.clone(), cancel).await?;
        self.cache.insert(root, report.clone());
        Ok(report)
    }

    pub async fn detect_project(
        &self,
        dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<ProjectInfo, DetectionError> {
        self.detect_report(dir, cancel).await.map(|r| r.project)
    }

    async fn run(
        &self,
        root: PathBuf,
        cancel: &CancellationToken,
    ) -> Result<DetectionReport, DetectionError> {
        if cancel.is_cancelled() {
            return Err(DetectionError::internal(CANCELLED_MESSAGE));
        }
        let pass = cancel.child_token();
        let ctx = self.new_context(root, pass.clone());
        info!("Detecting project in {}", ctx.root().display());

        let mut set = JoinSet::new();
        for (index, task) in self.tasks.iter().enumerate() {
            let detector = task.detector.clone();
            let task_ctx = ctx.child();
            let timeout = task.timeout;
            set.spawn(async move {
                let token = task_ctx.cancel_token().clone();
                let handle = tokio::task::spawn_blocking(move || detector.detect(&task_ctx));
                let outcome = tokio::time::timeout(timeout, handle).await;
                if outcome.is_err() {
                    token.cancel();
                }
                (index, outcome)
            });
        }

        let mut merge = Merge::default();
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    pass.cancel();
                    set.abort_all();
                    warn!("Detection cancelled");
                    return Err(DetectionError::internal(CANCELLED_MESSAGE));
                }
                joined = set.join_next() => {
                    let Some(joined) = joined else { break };
                    let (index, outcome) = match joined {
                        Ok(pair) => pair,
                        Err(e) => {
                            warn!("Detection task failed to join: {}", e);
                            continue;
                        }
                    };
                    let task = &self.tasks[index];
                    let name = task.detector.name();
                    match outcome {
                        Ok(Ok(Ok(Some(info)))) => {
                            debug!(detector = name, project_type = %info.project_type, confidence = %info.confidence, "detector result");
                            merge.offer(task, info);
                        }
                        Ok(Ok(Ok(None))) => trace!(detector = name, "no opinion"),
                        Ok(Ok(Err(e))) => debug!(detector = name, error = %e, "detector failed"),
                        Ok(Err(e)) => warn!("Detector '{}' panicked: {}", name, e),
                        Err(_) => warn!("Detector '{}' timed out after {:?}", name, task.timeout),
                    }
                }
            }
        }

        let stats = ctx.probe().stats();
        debug!(
            disk_reads = stats.disk_reads(),
            stat_calls = stats.stat_calls(),
            glob_walks = stats.glob_walks(),
            "detection pass finished"
        );
        let report = merge
            .finish(&self.thresholds, ctx.has_docker())
            .ok_or_else(|| undetected(&ctx))?;
        info!(
            "Detected {} ({}) via {}",
            report.project.project_type,
            report.project.confidence,
            report.detector.as_deref().unwrap_or("-")
        );
        Ok(report)
    }
}

/// Best entry of a merge category.
struct Best {
    confidence: Confidence,
    priority: i32,
    detector: &'static str,
    info: ProjectInfo,
}

fn beats(confidence: Confidence, priority: i32, current: Option<(Confidence, i32)>) -> bool {
    match current {
        None => true,
        Some((c, p)) => confidence > c || (confidence == c && priority > p),
    }
}

#[derive(Default)]
struct Merge {
    project: Option<Best>,
    editor: Option<Best>,
    languages: BTreeMap<String, (Confidence, i32)>,
    /// Integration name to (confidence, priority, provider).
    integrations: BTreeMap<String, (Confidence, i32, Option<String>)>,
    candidates: Vec<(Candidate, i32)>,
}

impl Merge {
    fn offer(&mut self, task: &DetectionTask, info: ProjectInfo) {
        let detector = task.detector.name();
        let priority = task.detector.priority();
        let confidence = info.confidence.weighted(task.weight);

        match task.detector.kind() {
            DetectorKind::Framework | DetectorKind::Composite | DetectorKind::Stack => {
                if !info.project_type.is_known() {
                    return;
                }
                self.candidates.push((
                    Candidate {
                        detector: detector.to_string(),
                        project_type: info.project_type,
                        confidence,
                    },
                    priority,
                ));
                if let Some(language) = &info.language {
                    let current = self.languages.get(language).copied();
                    if beats(confidence, priority, current) {
                        self.languages.insert(language.clone(), (confidence, priority));
                    }
                }
                let current = self.project.as_ref().map(|b| (b.confidence, b.priority));
                if beats(confidence, priority, current) {
                    self.project = Some(Best {
                        confidence,
                        priority,
                        detector,
                        info,
                    });
                }
            }
            DetectorKind::Editor => {
                if info.editor.is_none() {
                    return;
                }
                let current = self.editor.as_ref().map(|b| (b.confidence, b.priority));
                if beats(confidence, priority, current) {
                    self.editor = Some(Best {
                        confidence,
                        priority,
                        detector,
                        info,
                    });
                }
            }
            DetectorKind::Integration => {
                let name = info
                    .metadata
                    .get("integration")
                    .and_then(|v| v.as_str())
                    .unwrap_or(detector)
                    .to_string();
                let current = self.integrations.get(&name).map(|(c, p, _)| (*c, *p));
                if beats(confidence, priority, current) {
                    self.integrations
                        .insert(name, (confidence, priority, info.llm_provider));
                }
            }
        }
    }

    fn finish(
        self,
        thresholds: &ThresholdConfig,
        has_docker: bool,
    ) -> Option<DetectionReport> {
        let best = self
            .project
            .filter(|b| b.confidence.meets(thresholds.project_type))?;

        let mut project = best.info;
        project.confidence = best.confidence;
        project.has_docker = has_docker;

        project.language = self
            .languages
            .into_iter()
            .filter(|(_, (c, _))| c.meets(thresholds.language))
            .max_by(|(_, a), (_, b)| {
                a.0.partial_cmp(&b.0)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.1.cmp(&b.1))
            })
            .map(|(language, _)| language);

        if let Some(editor) = self
            .editor
            .filter(|b| b.confidence.meets(thresholds.editor))
        {
            project.editor = editor.info.editor;
            if editor.info.llm_model.is_some() {
                project.llm_model = editor.info.llm_model;
            }
        }

        let mut integrations: Vec<(String, Confidence, i32, Option<String>)> = self
            .integrations
            .into_iter()
            .filter(|(_, (c, _, _))| c.meets(thresholds.integration))
            .map(|(name, (c, p, provider))| (name, c, p, provider))
            .collect();
        integrations.sort_by(|a, b| b.2.cmp(&a.2));
        if project.llm_provider.is_none() {
            project.llm_provider = integrations.iter().find_map(|(_, _, _, p)| p.clone());
        }
        let integrations: Vec<String> = integrations.into_iter().map(|(name, ..)| name).collect();
        if !integrations.is_empty() {
            project = project.with_metadata("integrations", integrations.clone());
        }

        let mut candidates = self.candidates;
        candidates.sort_by(|(a, pa), (b, pb)| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(pb.cmp(pa))
        });

        Some(DetectionReport {
            project,
            detector: Some(best.detector.to_string()),
            integrations,
            candidates: candidates.into_iter().map(|(c, _)| c).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::detectors::editor::EditorDetector;
    use crate::detection::detectors::framework::{GoDetector, NodeDetector, PythonDetector};
    use crate::detection::detectors::DetectResult;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn mern_project(root: &Path) {
        write(
            root,
            "package.json",
            r#"{"name":"store","dependencies":{"react":"18","react-dom":"18","express":"4","mongoose":"8"}}"#,
        );
    }

    fn go_project(root: &Path) {
        write(root, "go.mod", "module example.com/app\n\ngo 1.22\n");
        write(
            root,
            "main.go",
            "package main\n\nfunc main() { http.ListenAndServe(\":9090\", nil) }\n",
        );
    }

    /// Classifies as Next.js after waiting for cancellation or ~5s.
    struct SlowDetector;

    impl Detector for SlowDetector {
        fn name(&self) -> &'static str {
            "slow"
        }
        fn priority(&self) -> i32 {
            500
        }
        fn kind(&self) -> DetectorKind {
            DetectorKind::Framework
        }
        fn detect(&self, ctx: &DetectionContext) -> DetectResult {
            for _ in 0..500 {
                if ctx.is_cancelled() {
                    return Ok(None);
                }
                std::thread::sleep(Duration::from_millis(10));
            }
            Ok(Some(ProjectInfo::new(ProjectType::Nextjs, "slow", 0.95)))
        }
    }

    struct PanickingDetector;

    impl Detector for PanickingDetector {
        fn name(&self) -> &'static str {
            "panics"
        }
        fn priority(&self) -> i32 {
            400
        }
        fn kind(&self) -> DetectorKind {
            DetectorKind::Framework
        }
        fn detect(&self, _ctx: &DetectionContext) -> DetectResult {
            panic!("detector bug");
        }
    }

    struct FailingDetector;

    impl Detector for FailingDetector {
        fn name(&self) -> &'static str {
            "fails"
        }
        fn priority(&self) -> i32 {
            300
        }
        fn kind(&self) -> DetectorKind {
            DetectorKind::Framework
        }
        fn detect(&self, _ctx: &DetectionContext) -> DetectResult {
            Err(DetectionError::internal("manifest exploded"))
        }
    }

    #[tokio::test]
    async fn test_mern_project_is_detected() {
        let dir = tempdir().unwrap();
        mern_project(dir.path());
        let registry = DetectorRegistry::from_config(&DetectionConfig::default());
        let report = registry
            .detect_report(dir.path(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(report.project.project_type, ProjectType::Mern);
        assert_eq!(report.project.name, "store");
        assert_eq!(report.detector.as_deref(), Some("mern"));
        assert!(report.candidates.len() > 1);
        assert_eq!(report.candidates[0].project_type, ProjectType::Mern);
    }

    #[tokio::test]
    async fn test_second_call_is_served_from_cache() {
        let dir = tempdir().unwrap();
        mern_project(dir.path());
        let registry = DetectorRegistry::from_config(&DetectionConfig::default());
        let cancel = CancellationToken::new();

        let first = registry.detect_project(dir.path(), &cancel).await.unwrap();
        let io_after_first = registry.stats().total();
        assert!(io_after_first > 0);

        let second = registry.detect_project(dir.path(), &cancel).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(registry.stats().total(), io_after_first);

        assert!(registry.cache().invalidate(&dir.path().canonicalize().unwrap()));
        registry.detect_project(dir.path(), &cancel).await.unwrap();
        assert!(registry.stats().total() > io_after_first);
    }

    #[tokio::test]
    async fn test_empty_directory_is_not_found() {
        let dir = tempdir().unwrap();
        let registry = DetectorRegistry::from_config(&DetectionConfig::default());
        let err = registry
            .detect_project(dir.path(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.message(), NOT_DETECTED_MESSAGE);
    }

    #[tokio::test]
    async fn test_unhandled_ecosystem_is_unsupported() {
        let dir = tempdir().unwrap();
        write(dir.path(), "Cargo.toml", "[package]\nname = \"svc\"\n");
        let registry = DetectorRegistry::from_config(&DetectionConfig::default());
        let err = registry
            .detect_project(dir.path(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.is_unsupported());
        assert!(err.message().contains("Rust"));
        assert!(registry.scan(dir.path()).unwrap_err().is_unsupported());

        // A handled ecosystem next to the build file still wins.
        go_project(dir.path());
        let info = DetectorRegistry::from_config(&DetectionConfig::default())
            .detect_project(dir.path(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(info.project_type, ProjectType::Go);
    }

    #[tokio::test]
    async fn test_django_manage_py_is_python() {
        let dir = tempdir().unwrap();
        write(dir.path(), "requirements.txt", "Django==4.2.7\npsycopg2-binary==2.9.9\n");
        write(dir.path(), "manage.py", "import os\nimport sys\n");
        let registry = DetectorRegistry::from_config(&DetectionConfig::default());
        let report = registry
            .detect_report(dir.path(), &CancellationToken::new())
            .await
            .unwrap();
        let project = &report.project;
        assert_eq!(project.project_type, ProjectType::Python);
        assert_eq!(project.port, 8000);
        assert_eq!(project.language.as_deref(), Some("python"));
        assert_eq!(project.metadata.get("framework"), Some(&serde_json::json!("django")));
        assert!(report
            .candidates
            .iter()
            .all(|c| !matches!(c.project_type, ProjectType::Nextjs | ProjectType::React)));
    }

    #[tokio::test]
    async fn test_next_only_package_json_generates_nextjs_pod() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "package.json",
            r#"{"name":"landing","dependencies":{"next":"14.1.0"}}"#,
        );
        let registry = DetectorRegistry::from_config(&DetectionConfig::default());
        let info = registry
            .detect_project(dir.path(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(info.project_type, ProjectType::Nextjs);
        assert!(info.confidence.meets(0.7));
        assert!((info.confidence.value() - 0.9).abs() < 1e-9);

        let yaml = crate::generator::YamlGenerator::default().build(&info);
        let pod = &yaml.application.pods[0];
        assert_eq!(pod.pod_type, "nextjs");
        assert_eq!(pod.primary_port(), Some(3000));
    }

    #[tokio::test]
    async fn test_missing_directory_is_invalid() {
        let dir = tempdir().unwrap();
        let registry = DetectorRegistry::from_config(&DetectionConfig::default());
        let err = registry
            .detect_project(&dir.path().join("nope"), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(!err.is_not_found());
    }

    #[tokio::test]
    async fn test_precancelled_token() {
        let dir = tempdir().unwrap();
        go_project(dir.path());
        let registry = DetectorRegistry::from_config(&DetectionConfig::default());
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = registry.detect_project(dir.path(), &cancel).await.unwrap_err();
        assert!(err.is_cancelled());
        assert!(registry.cache().is_empty());
    }

    #[tokio::test]
    async fn test_cancellation_aborts_running_pass() {
        let dir = tempdir().unwrap();
        go_project(dir.path());
        let mut registry = DetectorRegistry::new(&DetectionConfig::default());
        registry.register(Arc::new(SlowDetector));
        registry.register(Arc::new(GoDetector));

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });
        let started = std::time::Instant::now();
        let err = registry.detect_project(dir.path(), &cancel).await.unwrap_err();
        assert!(err.is_cancelled());
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_timeouts_panics_and_errors_are_skipped() {
        let dir = tempdir().unwrap();
        go_project(dir.path());
        let mut registry = DetectorRegistry::new(&DetectionConfig::default());
        registry.register_task(DetectionTask::new(
            Arc::new(SlowDetector),
            1.0,
            Duration::from_millis(20),
        ));
        registry.register(Arc::new(PanickingDetector));
        registry.register(Arc::new(FailingDetector));
        registry.register(Arc::new(GoDetector));

        let info = registry
            .detect_project(dir.path(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(info.project_type, ProjectType::Go);
        assert_eq!(info.port, 9090);
        assert_eq!(info.language.as_deref(), Some("go"));
    }

    #[tokio::test]
    async fn test_project_threshold_is_configurable() {
        let dir = tempdir().unwrap();
        go_project(dir.path());
        let mut config = DetectionConfig::default();
        config.thresholds.project_type = 0.9;
        let registry = DetectorRegistry::from_config(&config);
        let err = registry
            .detect_project(dir.path(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_weight_scales_confidence() {
        let dir = tempdir().unwrap();
        write(dir.path(), "requirements.txt", "fastapi\n");
        write(dir.path(), "main.py", "");
        write(dir.path(), "package.json", r#"{"name":"tools"}"#);
        let mut registry = DetectorRegistry::new(&DetectionConfig::default());
        registry.register_task(DetectionTask::new(Arc::new(NodeDetector), 1.0, Duration::from_secs(5)));
        registry.register_task(DetectionTask::new(Arc::new(PythonDetector), 0.5, Duration::from_secs(5)));
        let report = registry
            .detect_report(dir.path(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(report.project.project_type, ProjectType::Node);
        let python = report
            .candidates
            .iter()
            .find(|c| c.detector == "python")
            .unwrap();
        assert!((python.confidence.value() - 0.4).abs() < 1e-9);
        // Node's 0.75 is below the language threshold.
        assert_eq!(report.project.language, None);
    }

    #[tokio::test]
    async fn test_editor_and_integrations_are_layered() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "package.json",
            r#"{"dependencies":{"next":"14","react":"18","react-dom":"18","stripe":"14"}}"#,
        );
        write(dir.path(), ".env", "OPENAI_API_KEY=sk\n");
        write(dir.path(), "Dockerfile", "FROM node:20\n");

        let env: HashMap<String, String> = [("CURSOR_TRACE_ID", "t"), ("CURSOR_LLM_MODEL", "gpt-4o")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let mut registry = DetectorRegistry::new(&DetectionConfig::default());
        registry.register(Arc::new(EditorDetector::new(env, None)));
        for detector in detectors::framework::all()
            .into_iter()
            .chain(detectors::integration::all())
        {
            registry.register(detector);
        }

        let report = registry
            .detect_report(dir.path(), &CancellationToken::new())
            .await
            .unwrap();
        let project = &report.project;
        assert_eq!(project.project_type, ProjectType::Nextjs);
        assert_eq!(project.editor.as_deref(), Some("cursor"));
        assert_eq!(project.llm_model.as_deref(), Some("gpt-4o"));
        assert_eq!(project.llm_provider.as_deref(), Some("openai"));
        assert!(project.has_docker);
        assert_eq!(report.integrations, vec!["openai".to_string(), "stripe".to_string()]);
    }

    #[test]
    fn test_priority_scan() {
        let registry = DetectorRegistry::from_config(&DetectionConfig::default());

        let dir = tempdir().unwrap();
        mern_project(dir.path());
        assert_eq!(registry.scan(dir.path()).unwrap().project_type, ProjectType::Mern);

        let dir = tempdir().unwrap();
        write(dir.path(), "requirements.txt", "flask\n");
        assert_eq!(registry.scan(dir.path()).unwrap().project_type, ProjectType::Python);

        let dir = tempdir().unwrap();
        assert!(registry.scan(dir.path()).unwrap_err().is_not_found());
    }

    #[test]
    fn test_tasks_are_sorted_by_priority() {
        let registry = DetectorRegistry::from_config(&DetectionConfig::default());
        let priorities: Vec<i32> = registry.tasks().iter().map(|t| t.detector().priority()).collect();
        let mut sorted = priorities.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(priorities, sorted);
        assert_eq!(registry.tasks()[0].detector().name(), "editor");
    }
}
