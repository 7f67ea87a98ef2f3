//! Ownership and removal of the files a run creates

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Transient paths owned by one run.
///
/// Paths are removed in reverse registration order when `release_all` is
/// called or when the coordinator is dropped, whichever comes first.
#[derive(Debug, Default)]
pub struct CleanupCoordinator {
    paths: Vec<PathBuf>,
}

/// What a release actually did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub removed: usize,
    /// Registered but already gone (or never created)
    pub missing: usize,
    pub failed: Vec<(PathBuf, String)>,
}

impl CleanupReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

impl CleanupCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `path`. Returns false if it was already registered.
    pub fn register(&mut self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        if self.is_registered(path) {
            return false;
        }
        debug!("Registered transient path: {}", path.display());
        self.paths.push(path.to_path_buf());
        true
    }

    pub fn is_registered(&self, path: &Path) -> bool {
        self.paths.iter().any(|p| p == path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Remove every registered path that still exists.
    ///
    /// Never fails: missing paths are counted, other errors are logged and
    /// reported. Calling it again without new registrations does nothing.
    pub fn release_all(&mut self) -> CleanupReport {
        let mut report = CleanupReport::default();

        for path in self.paths.drain(..).rev() {
            match remove_path(&path) {
                Ok(()) => {
                    debug!("Removed {}", path.display());
                    report.removed += 1;
                }
                Err(e) if e.kind() == ErrorKind::NotFound => report.missing += 1,
                Err(e) => {
                    warn!("Failed to remove {}: {}", path.display(), e);
                    report.failed.push((path, e.to_string()));
                }
            }
        }

        report
    }
}

impl Drop for CleanupCoordinator {
    fn drop(&mut self) {
        if !self.paths.is_empty() {
            let report = self.release_all();
            debug!(
                "Released transient paths on drop: {} removed, {} missing",
                report.removed, report.missing
            );
        }
    }
}

fn remove_path(path: &Path) -> std::io::Result<()> {
    let metadata = std::fs::symlink_metadata(path)?;
    if metadata.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    }
}
