//! Version-control capability used by the synchronizer.
//!
//! The synchronizer only talks to the [`Vcs`] trait, so the decision logic can
//! be exercised against a fake in tests. The production implementation lives in
//! `git2_backend` and is built on the `git2` crate.

mod git2_backend;

use anyhow::Result;
use std::path::Path;

pub use git2_backend::Git2Backend;

/// Operations the synchronizer needs from a version-control client.
///
/// Every method is blocking. Transport and authentication are entirely the
/// implementation's business.
pub trait Vcs: Send + Sync {
    /// Full clone of `url` into `dest`. `dest` must not exist.
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<()>;

    /// Whether a local branch named `branch` exists in the repository at `path`.
    ///
    /// Never fails: any inspection error (missing path, not a repository,
    /// broken refs) is reported as `false`.
    fn branch_exists(&self, path: &Path, branch: &str) -> bool;

    /// Attach HEAD to the local branch `branch` and update the working tree.
    fn checkout(&self, path: &Path, branch: &str) -> Result<()>;

    /// Fetch `origin`, then force the current branch, index and working tree
    /// to `origin/<branch>`.
    fn hard_reset_to_remote(&self, path: &Path, branch: &str) -> Result<()>;

    /// Recursively delete the working copy at `path`.
    fn delete_tree(&self, path: &Path) -> Result<()>;
}
