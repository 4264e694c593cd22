use anyhow::{Context, Result, anyhow};
use git2::{
    BranchType, Cred, FetchOptions, RemoteCallbacks, Repository, ResetType,
    build::{CheckoutBuilder, RepoBuilder},
};
use std::fs;
use std::path::Path;
use tracing::debug;

use super::Vcs;

/// [`Vcs`] implementation backed by libgit2.
#[derive(Debug, Default, Clone, Copy)]
pub struct Git2Backend;

impl Git2Backend {
    pub fn new() -> Self {
        Self
    }
}

/// Build a `FetchOptions` with SSH-agent credentials enabled.
///
/// If no key is offered by the agent, falls back to default credentials.
fn fetch_opts_with_creds() -> FetchOptions<'static> {
    let mut cb = RemoteCallbacks::new();
    cb.credentials(|_url, username_from_url, _allowed| {
        Cred::ssh_key_from_agent(username_from_url.unwrap_or("git")).or_else(|_| Cred::default())
    });

    let mut fo = FetchOptions::new();
    fo.remote_callbacks(cb);
    fo
}

/// Perform `git fetch origin` to update remote-tracking refs.
///
/// # Errors
/// Returns an error if `origin` is not configured or the fetch fails.
fn fetch_origin(repo: &Repository) -> Result<()> {
    let mut fo = fetch_opts_with_creds();

    let mut remote = repo.find_remote("origin")?;
    remote
        .fetch(
            &[
                "refs/heads/*:refs/remotes/origin/*",
                "refs/tags/*:refs/tags/*",
            ],
            Some(&mut fo),
            None,
        )
        .context("git fetch origin")?;
    Ok(())
}

impl Vcs for Git2Backend {
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<()> {
        let mut builder = RepoBuilder::new();
        builder.fetch_options(fetch_opts_with_creds());
        builder
            .clone(url, dest)
            .with_context(|| format!("git clone {}", url))?;
        Ok(())
    }

    fn branch_exists(&self, path: &Path, branch: &str) -> bool {
        let repo = match Repository::open(path) {
            Ok(r) => r,
            Err(e) => {
                debug!(path = %path.display(), branch, error = %e, "cannot inspect repository");
                return false;
            }
        };
        match repo.find_branch(branch, BranchType::Local) {
            Ok(_) => true,
            Err(e) => {
                debug!(path = %path.display(), branch, error = %e, "branch not found");
                false
            }
        }
    }

    fn checkout(&self, path: &Path, branch: &str) -> Result<()> {
        let repo = Repository::open(path)
            .with_context(|| format!("open repository {}", path.display()))?;
        let reference = repo
            .find_branch(branch, BranchType::Local)
            .with_context(|| format!("local branch not found: {}", branch))?
            .into_reference();
        let name = reference
            .name()
            .ok_or_else(|| anyhow!("invalid reference name"))?;
        repo.set_head(name)?;
        repo.checkout_head(Some(CheckoutBuilder::new().force()))
            .with_context(|| format!("git checkout {}", branch))?;
        Ok(())
    }

    fn hard_reset_to_remote(&self, path: &Path, branch: &str) -> Result<()> {
        let repo = Repository::open(path)
            .with_context(|| format!("open repository {}", path.display()))?;
        fetch_origin(&repo)?;

        let remote_ref = format!("refs/remotes/origin/{}", branch);
        let remote_tip = repo
            .find_reference(&remote_ref)
            .with_context(|| format!("remote branch not found: origin/{}", branch))?
            .peel_to_commit()?;

        repo.reset(remote_tip.as_object(), ResetType::Hard, None)
            .with_context(|| format!("git reset --hard origin/{}", branch))?;
        Ok(())
    }

    fn delete_tree(&self, path: &Path) -> Result<()> {
        let meta = fs::symlink_metadata(path)?;
        if meta.is_dir() {
            fs::remove_dir_all(path)?;
        } else {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{commit_file, init_origin};
    use tempfile::tempdir;

    #[test]
    fn clone_then_probe_branches() {
        let td = tempdir().unwrap();
        let origin = init_origin(&td.path().join("origin"), "main");
        let dest = td.path().join("work");

        let git = Git2Backend::new();
        git.clone_repo(origin.to_str().unwrap(), &dest).unwrap();

        assert!(git.branch_exists(&dest, "main"));
        assert!(!git.branch_exists(&dest, "master"));
    }

    #[test]
    fn branch_exists_is_false_for_non_repository() {
        let td = tempdir().unwrap();
        let plain = td.path().join("plain");
        fs::create_dir_all(&plain).unwrap();
        fs::write(plain.join("README"), "not a repo").unwrap();

        let git = Git2Backend::new();
        assert!(!git.branch_exists(&plain, "main"));
        assert!(!git.branch_exists(&td.path().join("missing"), "main"));
    }

    #[test]
    fn hard_reset_picks_up_new_remote_commits() {
        let td = tempdir().unwrap();
        let origin_dir = td.path().join("origin");
        let origin = init_origin(&origin_dir, "main");
        let dest = td.path().join("work");

        let git = Git2Backend::new();
        git.clone_repo(origin.to_str().unwrap(), &dest).unwrap();

        let new_tip = commit_file(&origin_dir, "second.txt", "two", "second");
        git.checkout(&dest, "main").unwrap();
        git.hard_reset_to_remote(&dest, "main").unwrap();

        let repo = Repository::open(&dest).unwrap();
        assert_eq!(repo.head().unwrap().peel_to_commit().unwrap().id(), new_tip);
        assert!(dest.join("second.txt").is_file());
    }

    #[test]
    fn delete_tree_removes_directories_and_files() {
        let td = tempdir().unwrap();
        let dir = td.path().join("d");
        fs::create_dir_all(dir.join("nested")).unwrap();
        fs::write(dir.join("nested/f"), "x").unwrap();
        let file = td.path().join("f");
        fs::write(&file, "x").unwrap();

        let git = Git2Backend::new();
        git.delete_tree(&dir).unwrap();
        git.delete_tree(&file).unwrap();
        assert!(!dir.exists());
        assert!(!file.exists());
    }
}
