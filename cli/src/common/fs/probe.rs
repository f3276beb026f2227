//! # Nexlayer File Probe
//!
//! File: cli/src/common/fs/probe.rs
//!
//! ## Overview
//!
//! The `FileProbe` is the only way detectors touch the project directory.
//! Existence checks and file reads are cached for the lifetime of one
//! detection pass, keyed by absolute path, so `package.json` probed by a
//! dozen detectors costs a single disk read. Glob walks are not cached.
//!
//! ## Architecture
//!
//! - The probe is a cheap handle (`Clone`) over shared state, so every
//!   concurrently running detector of a pass uses the same cache.
//! - Both maps sit behind a `parking_lot::Mutex`. The lock is never held
//!   across disk I/O; a racing duplicate read simply loses the insert.
//! - `ProbeStats` counts physical filesystem accesses. Registries share one
//!   `ProbeStats` across passes, which is how cache hits are observed.
//! - Files over `MAX_FILE_SIZE` bytes and non-UTF-8 files read as absent.
//!
//! ## Examples
//!
//! ```rust
//! let probe = FileProbe::new();
//! let manifest = root.join("package.json");
//! if probe.exists(&manifest) {
//!     let text = probe.read(&manifest); // disk read
//!     let again = probe.read(&manifest); // cache hit
//! }
//! assert_eq!(probe.stats().disk_reads(), 1);
//! ```
//!
use crate::common::fs::glob;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Files larger than this are treated as unreadable.
pub const MAX_FILE_SIZE: u64 = 1024 * 1024;

/// Counters of physical filesystem accesses made through a probe.
#[derive(Debug, Default)]
pub struct ProbeStats {
    disk_reads: AtomicUsize,
    stat_calls: AtomicUsize,
    glob_walks: AtomicUsize,
}

impl ProbeStats {
    pub fn disk_reads(&self) -> usize {
        self.disk_reads.load(Ordering::Relaxed)
    }

    pub fn stat_calls(&self) -> usize {
        self.stat_calls.load(Ordering::Relaxed)
    }

    pub fn glob_walks(&self) -> usize {
        self.glob_walks.load(Ordering::Relaxed)
    }

    /// Sum of every kind of filesystem access.
    pub fn total(&self) -> usize {
        self.disk_reads() + self.stat_calls() + self.glob_walks()
    }
}

#[derive(Debug, Default)]
struct ProbeState {
    contents: Mutex<HashMap<PathBuf, Option<Arc<str>>>>,
    exists: Mutex<HashMap<PathBuf, bool>>,
}

/// Cached view of the filesystem for a single detection pass.
#[derive(Debug, Clone)]
pub struct FileProbe {
    state: Arc<ProbeState>,
    stats: Arc<ProbeStats>,
}

impl Default for FileProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl FileProbe {
    pub fn new() -> Self {
        Self::with_stats(Arc::new(ProbeStats::default()))
    }

    /// Creates an empty probe that reports into `stats`.
    pub fn with_stats(stats: Arc<ProbeStats>) -> Self {
        Self {
            state: Arc::new(ProbeState::default()),
            stats,
        }
    }

    pub fn stats(&self) -> &Arc<ProbeStats> {
        &self.stats
    }

    /// Returns whether `path` exists (file or directory).
    pub fn exists(&self, path: &Path) -> bool {
        if let Some(hit) = self.state.exists.lock().get(path) {
            return *hit;
        }
        if let Some(content) = self.state.contents.lock().get(path) {
            if content.is_some() {
                return true;
            }
        }
        self.stats.stat_calls.fetch_add(1, Ordering::Relaxed);
        let present = path.exists();
        trace!("stat {} -> {}", path.display(), present);
        *self.state.exists.lock().entry(path.to_path_buf()).or_insert(present)
    }

    /// Returns the UTF-8 content of `path`, or `None` if it is missing,
    /// not a regular file, too large or not valid UTF-8.
    pub fn read(&self, path: &Path) -> Option<Arc<str>> {
        if let Some(hit) = self.state.contents.lock().get(path) {
            return hit.clone();
        }
        self.stats.disk_reads.fetch_add(1, Ordering::Relaxed);
        let content = read_bounded(path);
        trace!(
            "read {} -> {}",
            path.display(),
            if content.is_some() { "ok" } else { "absent" }
        );
        self.state
            .contents
            .lock()
            .entry(path.to_path_buf())
            .or_insert(content)
            .clone()
    }

    /// Uncached glob walk under `root` (see `common::fs::glob`).
    pub fn glob(&self, root: &Path, pattern: &str, cancel: &CancellationToken) -> Vec<PathBuf> {
        self.stats.glob_walks.fetch_add(1, Ordering::Relaxed);
        glob::find_matches(root, pattern, cancel)
    }
}

fn read_bounded(path: &Path) -> Option<Arc<str>> {
    let meta = fs::metadata(path).ok()?;
    if !meta.is_file() || meta.len() > MAX_FILE_SIZE {
        return None;
    }
    let bytes = fs::read(path).ok()?;
    String::from_utf8(bytes).ok().map(Arc::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_read_is_cached() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("package.json");
        fs::write(&path, r#"{"name":"demo"}"#).unwrap();

        let probe = FileProbe::new();
        let first = probe.read(&path).unwrap();
        let second = probe.read(&path).unwrap();
        assert_eq!(&*first, r#"{"name":"demo"}"#);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(probe.stats().disk_reads(), 1);
    }

    #[test]
    fn test_exists_is_cached_and_uses_read_results() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("go.mod");
        fs::write(&path, "module example.com/app\n").unwrap();

        let probe = FileProbe::new();
        assert!(probe.read(&path).is_some());
        assert!(probe.exists(&path));
        assert_eq!(probe.stats().stat_calls(), 0);

        let missing = dir.path().join("main.go");
        assert!(!probe.exists(&missing));
        assert!(!probe.exists(&missing));
        assert_eq!(probe.stats().stat_calls(), 1);
    }

    #[test]
    fn test_missing_and_oversized_files_read_as_absent() {
        let dir = tempdir().unwrap();
        let big = dir.path().join("big.sql");
        fs::write(&big, vec![b'a'; (MAX_FILE_SIZE + 1) as usize]).unwrap();

        let probe = FileProbe::new();
        assert!(probe.read(&dir.path().join("absent.txt")).is_none());
        assert!(probe.read(&big).is_none());
        assert!(probe.read(dir.path()).is_none());
    }

    #[test]
    fn test_clones_share_cache_and_stats() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("requirements.txt");
        fs::write(&path, "flask==2.3.0\n").unwrap();

        let stats = Arc::new(ProbeStats::default());
        let probe = FileProbe::with_stats(stats.clone());
        let clone = probe.clone();
        probe.read(&path);
        clone.read(&path);
        assert_eq!(stats.disk_reads(), 1);
        assert_eq!(stats.total(), 1);
    }
}
