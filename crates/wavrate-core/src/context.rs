//! Per-run state threaded through every pipeline component

use crate::cleanup::{CleanupCoordinator, CleanupReport};
use chrono::{DateTime, Utc};
use std::path::Path;
use tracing::debug;
use uuid::Uuid;

/// Where the run's input came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceOrigin {
    /// Files already on the user's filesystem; converted outputs are theirs
    Path,
    /// Uploaded blobs; everything the run writes is transient
    Upload,
}

#[derive(Debug)]
pub struct RunContext {
    id: Uuid,
    started_at: DateTime<Utc>,
    origin: SourceOrigin,
    cleanup: CleanupCoordinator,
}

impl RunContext {
    pub fn new(origin: SourceOrigin) -> Self {
        let ctx = Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            origin,
            cleanup: CleanupCoordinator::new(),
        };
        debug!("Run {} started ({:?} input)", ctx.id, origin);
        ctx
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn cleanup(&self) -> &CleanupCoordinator {
        &self.cleanup
    }

    pub fn cleanup_mut(&mut self) -> &mut CleanupCoordinator {
        &mut self.cleanup
    }

    /// Register a converted output if this run's outputs are transient
    pub fn track_output(&mut self, path: &Path) {
        if self.origin == SourceOrigin::Upload {
            self.cleanup.register(path);
        }
    }

    /// Release every transient path owned by the run
    pub fn release(&mut self) -> CleanupReport {
        let report = self.cleanup.release_all();
        debug!(
            "Run {} released: {} removed, {} missing, {} failed",
            self.id,
            report.removed,
            report.missing,
            report.failed.len()
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_path_outputs_are_not_tracked() {
        let mut ctx = RunContext::new(SourceOrigin::Path);
        ctx.track_output(&PathBuf::from("/music/convert_samplerate/a.wav"));
        assert!(ctx.cleanup().is_empty());
    }

    #[test]
    fn test_upload_outputs_are_tracked() {
        let mut ctx = RunContext::new(SourceOrigin::Upload);
        let path = PathBuf::from("/tmp/wavrate-run/a.wav");
        ctx.track_output(&path);
        assert!(ctx.cleanup().is_registered(&path));
    }

    #[test]
    fn test_each_run_gets_its_own_id() {
        let a = RunContext::new(SourceOrigin::Upload);
        let b = RunContext::new(SourceOrigin::Upload);
        assert_ne!(a.id(), b.id());
        assert!(a.started_at() <= Utc::now());
    }
}
