//! Git fixtures shared by the unit tests.

use git2::{Oid, Repository, RepositoryInitOptions, Signature};
use std::fs;
use std::path::{Path, PathBuf};

/// Initialise a non-bare repository at `dir` whose HEAD points at `branch`,
/// with one commit containing `README.md`. Returns `dir`.
pub fn init_origin(dir: &Path, branch: &str) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let mut opts = RepositoryInitOptions::new();
    opts.initial_head(branch);
    Repository::init_opts(dir, &opts)
        .unwrap_or_else(|e| panic!("init_origin: failed to init {}: {e}", dir.display()));
    commit_file(dir, "README.md", "# origin\n", "initial commit");
    dir.to_path_buf()
}

/// Write `name` with `content` into the repository at `dir` and commit it on
/// the current HEAD. Returns the new commit id.
pub fn commit_file(dir: &Path, name: &str, content: &str, message: &str) -> Oid {
    let repo = Repository::open(dir).unwrap();
    fs::write(dir.join(name), content).unwrap();

    let mut index = repo.index().unwrap();
    index.add_path(Path::new(name)).unwrap();
    index.write().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();

    let sig = Signature::now("Test User", "test@example.com").unwrap();
    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .unwrap()
}

/// Commit id that HEAD of the repository at `dir` points to.
pub fn head_id(dir: &Path) -> Oid {
    Repository::open(dir)
        .unwrap()
        .head()
        .unwrap()
        .peel_to_commit()
        .unwrap()
        .id()
}

/// Short name of the branch HEAD is attached to.
pub fn head_branch(dir: &Path) -> String {
    Repository::open(dir)
        .unwrap()
        .head()
        .unwrap()
        .shorthand()
        .unwrap()
        .to_string()
}
