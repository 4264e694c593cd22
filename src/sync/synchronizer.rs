use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use super::error::SyncError;
use super::resolve::{Action, DEFAULT_BRANCHES, observe, resolve};
use super::source::RepoSource;
use crate::git::{Git2Backend, Vcs};
use crate::lock::{FileLock, lock_path_for};
use crate::record::Recorder;

/// Default scratch root for working copies.
pub const DEFAULT_SCRATCH_ROOT: &str = "/tmp";

/// Keeps one working copy per source under a scratch root up to date.
///
/// Each call converges the working copy to the remote tip of its preferred
/// branch: clone when absent, fetch + hard reset when a preferred branch is
/// present, delete + clone otherwise.
pub struct Synchronizer {
    vcs: Arc<dyn Vcs>,
    root: PathBuf,
    branches: Vec<String>,
    lock: bool,
}

impl Synchronizer {
    /// Synchronizer backed by libgit2, with the default branch order and no lock.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_vcs(root, Arc::new(Git2Backend::new()))
    }

    /// Same as [`Synchronizer::new`] but with the given VCS implementation.
    pub fn with_vcs(root: impl Into<PathBuf>, vcs: Arc<dyn Vcs>) -> Self {
        Self {
            vcs,
            root: root.into(),
            branches: DEFAULT_BRANCHES.iter().map(|s| s.to_string()).collect(),
            lock: false,
        }
    }

    /// Replace the branch preference order. An empty list keeps the current one.
    pub fn with_branches(mut self, branches: Vec<String>) -> Self {
        if !branches.is_empty() {
            self.branches = branches;
        }
        self
    }

    /// Hold an exclusive file lock on the working copy for each call.
    pub fn with_lock(mut self, lock: bool) -> Self {
        self.lock = lock;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn branches(&self) -> &[String] {
        &self.branches
    }

    /// Deterministic working-copy location for `source`.
    pub fn local_path(&self, source: &RepoSource) -> Result<PathBuf, SyncError> {
        source.local_path(&self.root)
    }

    /// Converge the working copy for `source` and return its path.
    ///
    /// When `recorder` is active and recording, it is asked to archive the
    /// synced tree afterwards. Its failure is logged and otherwise ignored.
    ///
    /// # Errors
    /// Clone, fetch, checkout, reset and delete failures are returned as-is,
    /// without retry.
    pub fn sync(
        &self,
        source: &RepoSource,
        recorder: Option<&dyn Recorder>,
    ) -> Result<PathBuf, SyncError> {
        let path = self.local_path(source)?;

        let _guard = if self.lock {
            let lock_path = lock_path_for(&path);
            Some(
                FileLock::acquire(&lock_path).map_err(|e| SyncError::Lock {
                    path: lock_path,
                    source: e,
                })?,
            )
        } else {
            None
        };

        let state = observe(self.vcs.as_ref(), &path, &self.branches);
        let action = resolve(&state, &self.branches);
        self.apply(source, &path, &action)?;

        if let Some(rec) = recorder
            && rec.is_active()
            && rec.is_recording()
            && let Err(e) = rec.archive_source(&path)
        {
            warn!(path = %path.display(), error = %format!("{:#}", e), "archiving source failed");
        }

        Ok(path)
    }

    fn apply(&self, source: &RepoSource, path: &Path, action: &Action) -> Result<(), SyncError> {
        match action {
            Action::Clone => {
                info!(source = %source, path = %path.display(), "cloning repository");
                self.clone_into(source, path)
            }
            Action::ResetTo(branch) => {
                info!(path = %path.display(), branch = %branch, "using existing repository");
                self.vcs
                    .checkout(path, branch)
                    .and_then(|_| self.vcs.hard_reset_to_remote(path, branch))
                    .map_err(|e| SyncError::Update {
                        path: path.to_path_buf(),
                        branch: branch.clone(),
                        source: e,
                    })?;
                info!(path = %path.display(), branch = %branch, "reset to remote tip");
                Ok(())
            }
            Action::DeleteAndClone => {
                warn!(
                    path = %path.display(),
                    branches = ?self.branches,
                    "no preferred branch found, discarding working copy and re-cloning"
                );
                self.vcs
                    .delete_tree(path)
                    .map_err(|e| SyncError::Remove {
                        path: path.to_path_buf(),
                        source: e,
                    })?;
                self.clone_into(source, path)
            }
        }
    }

    fn clone_into(&self, source: &RepoSource, path: &Path) -> Result<(), SyncError> {
        self.vcs
            .clone_repo(source.as_str(), path)
            .map_err(|e| SyncError::Clone {
                url: source.to_string(),
                path: path.to_path_buf(),
                source: e,
            })?;
        info!(source = %source, path = %path.display(), "cloned repository");
        Ok(())
    }
}
