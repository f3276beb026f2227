//! # Detection Cache
//!
//! File: cli/src/detection/cache.rs
//!
//! Merged detection reports keyed by canonical project directory. Entries
//! carry their insertion `Instant` and are ignored (and evicted) once older
//! than the TTL. The cache belongs to a `DetectorRegistry`; there is no
//! process-wide cache.
//!
use crate::detection::registry::DetectionReport;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::trace;

#[derive(Debug)]
struct CacheEntry {
    report: DetectionReport,
    inserted: Instant,
}

#[derive(Debug)]
pub struct DetectionCache {
    ttl: Duration,
    entries: Mutex<HashMap<PathBuf, CacheEntry>>,
}

impl DetectionCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// A clone of the fresh entry for `dir`, evicting it if expired.
    pub fn get(&self, dir: &Path) -> Option<DetectionReport> {
        let mut entries = self.entries.lock();
        let expired = match entries.get(dir) {
            Some(entry) if entry.inserted.elapsed() < self.ttl => {
                trace!("cache hit for {}", dir.display());
                return Some(entry.report.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            trace!("cache entry for {} expired", dir.display());
            entries.remove(dir);
        }
        None
    }

    pub fn insert(&self, dir: PathBuf, report: DetectionReport) {
        self.entries.lock().insert(
            dir,
            CacheEntry {
                report,
                inserted: Instant::now(),
            },
        );
    }

    /// Drops the entry for `dir`; returns whether one existed.
    pub fn invalidate(&self, dir: &Path) -> bool {
        self.entries.lock().remove(dir).is_some()
    }

}

#[cfg(test)]
impl DetectionCache {
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::types::{ProjectInfo, ProjectType};

    fn report(name: &str) -> DetectionReport {
        DetectionReport {
            project: ProjectInfo::new(ProjectType::Go, name, 0.85),
            ..Default::default()
        }
    }

    #[test]
    fn test_get_insert_invalidate() {
        let cache = DetectionCache::new(Duration::from_secs(300));
        let dir = PathBuf::from("/projects/api");
        assert!(cache.get(&dir).is_none());

        cache.insert(dir.clone(), report("api"));
        assert_eq!(cache.get(&dir).map(|r| r.project.name), Some("api".to_string()));
        assert_eq!(cache.len(), 1);

        assert!(cache.invalidate(&dir));
        assert!(!cache.invalidate(&dir));
        assert!(cache.get(&dir).is_none());
    }

    #[test]
    fn test_expired_entries_are_evicted() {
        let cache = DetectionCache::new(Duration::ZERO);
        let dir = PathBuf::from("/projects/web");
        cache.insert(dir.clone(), report("web"));
        assert!(cache.get(&dir).is_none());
        assert!(cache.is_empty());
    }
}
