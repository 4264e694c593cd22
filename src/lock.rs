use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// Exclusive advisory lock held on a file until dropped.
///
/// Blocks while another process holds the same lock. The lock file itself is
/// left on disk; removing it while others may be waiting would let two holders
/// in at once.
#[derive(Debug)]
pub struct FileLock {
    file: File,
    path: PathBuf,
}

impl FileLock {
    /// Open (creating if needed) the lock file at `path` and block until the
    /// exclusive lock is held. Missing parent directories are created.
    ///
    /// # Errors
    /// Returns an error if the parent cannot be created, the file cannot be
    /// opened, or locking fails.
    pub fn acquire(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        file.lock_exclusive()?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

/// Lock file guarding the working copy at `path`: `<parent>/.<name>.lock`.
pub fn lock_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    parent.join(format!(".{}.lock", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn lock_path_is_hidden_sibling() {
        assert_eq!(
            lock_path_for(Path::new("/tmp/repo")),
            PathBuf::from("/tmp/.repo.lock")
        );
        assert_eq!(
            lock_path_for(Path::new("/tmp/repo.git")),
            PathBuf::from("/tmp/.repo.git.lock")
        );
    }

    #[test]
    fn second_holder_waits_for_first() {
        let td = tempdir().unwrap();
        let path = td.path().join("nested").join("x.lock");

        let first = FileLock::acquire(&path).unwrap();
        assert!(path.exists());

        let (tx, rx) = mpsc::channel();
        let p2 = path.clone();
        let handle = thread::spawn(move || {
            let _second = FileLock::acquire(&p2).unwrap();
            tx.send(()).unwrap();
        });

        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
        drop(first);
        rx.recv_timeout(Duration::from_secs(5)).unwrap();
        handle.join().unwrap();
    }
}
