//! Optional archival of synced source trees.
//!
//! The synchronizer receives a recorder as an explicit `Option<&dyn Recorder>`
//! and only calls [`Recorder::archive_source`] when the recorder is both
//! active and recording.

mod archive;

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub use archive::{sha256_file, write_tarball};

/// Collaborator notified after each successful synchronization.
pub trait Recorder: Send + Sync {
    fn is_active(&self) -> bool;
    fn is_recording(&self) -> bool;
    /// Archive the working copy at `path`.
    fn archive_source(&self, path: &Path) -> Result<()>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordMode {
    #[default]
    Off,
    Record,
    Replay,
}

/// Recorder that compresses each synced tree into `<archive_dir>/<name>.tar.gz`.
#[derive(Debug, Clone)]
pub struct TarballRecorder {
    mode: RecordMode,
    archive_dir: PathBuf,
}

impl TarballRecorder {
    pub fn new(mode: RecordMode, archive_dir: impl Into<PathBuf>) -> Self {
        Self {
            mode,
            archive_dir: archive_dir.into(),
        }
    }

    pub fn mode(&self) -> RecordMode {
        self.mode
    }

    /// Archive location for the working copy at `path`.
    pub fn archive_path(&self, path: &Path) -> PathBuf {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "source".to_string());
        self.archive_dir.join(format!("{}.tar.gz", name))
    }
}

impl Recorder for TarballRecorder {
    fn is_active(&self) -> bool {
        self.mode != RecordMode::Off
    }

    fn is_recording(&self) -> bool {
        self.mode == RecordMode::Record
    }

    fn archive_source(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(&self.archive_dir)
            .with_context(|| format!("create {}", self.archive_dir.display()))?;
        let dst = self.archive_path(path);
        write_tarball(path, &dst)?;

        let digest = sha256_file(&dst)?;
        let mut sidecar = dst.clone().into_os_string();
        sidecar.push(".sha256");
        fs::write(&sidecar, format!("{}\n", digest))?;

        info!(path = %path.display(), archive = %dst.display(), sha256 = %digest, "archived source");
        Ok(())
    }
}
