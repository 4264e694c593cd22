use std::fmt;
use std::path::{Path, PathBuf};

use super::error::SyncError;

/// Locator of a remote repository (URL or filesystem path).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoSource(String);

impl RepoSource {
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last `/`-separated segment of the locator, ignoring trailing slashes.
    ///
    /// `https://example.com/org/repo` → `repo`. The segment is taken verbatim,
    /// so `org/repo.git` names the directory `repo.git`.
    ///
    /// # Errors
    /// [`SyncError::InvalidSource`] when the segment is empty, `.` or `..`.
    pub fn name(&self) -> Result<&str, SyncError> {
        let trimmed = self.0.trim_end_matches('/');
        let name = trimmed.rsplit('/').next().unwrap_or("");
        match name {
            "" | "." | ".." => Err(SyncError::InvalidSource(self.0.clone())),
            n => Ok(n),
        }
    }

    /// Deterministic working-copy location under `root`.
    pub fn local_path(&self, root: &Path) -> Result<PathBuf, SyncError> {
        Ok(root.join(self.name()?))
    }
}

impl fmt::Display for RepoSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RepoSource {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for RepoSource {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_last_segment() {
        assert_eq!(
            RepoSource::from("https://example.com/org/repo").name().unwrap(),
            "repo"
        );
        assert_eq!(RepoSource::from("git@host:org/tool.git").name().unwrap(), "tool.git");
        assert_eq!(RepoSource::from("/srv/git/lib/").name().unwrap(), "lib");
        assert_eq!(RepoSource::from("plain").name().unwrap(), "plain");
    }

    #[test]
    fn local_path_joins_scratch_root() {
        let src = RepoSource::from("https://example.com/org/repo");
        assert_eq!(
            src.local_path(Path::new("/tmp")).unwrap(),
            PathBuf::from("/tmp/repo")
        );
    }

    #[test]
    fn unusable_names_are_rejected() {
        for bad in ["", "/", "https://example.com/org/..", "a/."] {
            assert!(
                matches!(RepoSource::from(bad).name(), Err(SyncError::InvalidSource(_))),
                "{bad:?} should be rejected"
            );
        }
    }
}
