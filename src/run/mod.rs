//! Shared status for a run split across parallel worker processes.
//!
//! Workers share one status thread and a set of named counters, stored as a
//! JSON file. Every read-modify-write of that file happens under an exclusive
//! file lock, so workers may call in at any time.

mod command;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::lock::FileLock;
use crate::notify::Notifier;

pub use command::{cmd_add, cmd_finish, cmd_reset, cmd_thread, parse_amount};

const STATE_FILE: &str = "run-state.json";
const LOCK_FILE: &str = "run-state.lock";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunState {
    #[serde(default)]
    pub thread_ts: Option<String>,
    #[serde(default)]
    pub totals: BTreeMap<String, i64>,
}

/// File-backed run state under `state_dir`.
#[derive(Debug, Clone)]
pub struct RunBoard {
    state_dir: PathBuf,
}

/// Status text posted while workers are still running.
pub fn running_text(header: &str) -> String {
    format!("{}🟡 Status: Running\n", header)
}

/// Final status text: the header, the finished marker and one
/// `name: value` line per counter, in name order.
pub fn finished_text(header: &str, totals: &BTreeMap<String, i64>) -> String {
    let mut s = format!("{}🟢 Status: Finished Running\n", header);
    for (name, value) in totals {
        s.push_str(&format!("{}: {}\n", name, value));
    }
    s
}

impl RunBoard {
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            state_dir: state_dir.into(),
        }
    }

    fn state_path(&self) -> PathBuf {
        self.state_dir.join(STATE_FILE)
    }

    fn lock_path(&self) -> PathBuf {
        self.state_dir.join(LOCK_FILE)
    }

    fn lock(&self) -> Result<FileLock> {
        let p = self.lock_path();
        FileLock::acquire(&p).with_context(|| format!("lock {}", p.display()))
    }

    fn read(&self) -> Result<RunState> {
        read_state(&self.state_path())
    }

    fn write(&self, state: &RunState) -> Result<()> {
        let path = self.state_path();
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(state)?)?;
        fs::rename(&tmp, &path).with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }

    /// Run `f` on the current state under the lock and persist the result.
    fn update<T>(&self, f: impl FnOnce(&mut RunState) -> Result<T>) -> Result<T> {
        let _guard = self.lock()?;
        let mut state = self.read()?;
        let out = f(&mut state)?;
        self.write(&state)?;
        Ok(out)
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> Result<RunState> {
        let _guard = self.lock()?;
        self.read()
    }

    /// Start a fresh run: counters back to zero, no status thread.
    pub fn reset(&self) -> Result<()> {
        self.update(|s| {
            s.thread_ts = None;
            for v in s.totals.values_mut() {
                *v = 0;
            }
            Ok(())
        })
    }

    /// Id of the run's status message, posting it on first use.
    ///
    /// Only the first caller across all workers posts; the rest get the stored id.
    pub fn thread(&self, notifier: &dyn Notifier, channel: &str, header: &str) -> Result<String> {
        self.update(|s| {
            if let Some(ts) = &s.thread_ts {
                return Ok(ts.clone());
            }
            let ts = notifier
                .send_message(channel, &running_text(header))
                .context("post run status")?;
            info!(channel, ts = %ts, "opened status thread");
            s.thread_ts = Some(ts.clone());
            Ok(ts)
        })
    }

    /// Add each `(name, amount)` to its counter.
    pub fn add(&self, amounts: &[(String, i64)]) -> Result<()> {
        self.update(|s| {
            for (name, amount) in amounts {
                *s.totals.entry(name.clone()).or_insert(0) += amount;
            }
            debug!(totals = ?s.totals, "updated counters");
            Ok(())
        })
    }

    /// Mark the status thread finished with the final totals, then remove the
    /// lock file. Returns the final state.
    ///
    /// Call this only after every worker has exited. A worker still waiting on
    /// the removed lock file and a caller that creates a fresh one would both
    /// hold the lock.
    ///
    /// # Errors
    /// Fails if the state cannot be read or the status edit is rejected.
    pub fn finish(&self, notifier: &dyn Notifier, channel: &str, header: &str) -> Result<RunState> {
        let state = {
            let _guard = self.lock()?;
            let state = self.read()?;
            if let Some(ts) = &state.thread_ts {
                notifier
                    .edit_message(channel, ts, &finished_text(header, &state.totals))
                    .context("finish run status")?;
                info!(channel, ts = %ts, "closed status thread");
            }
            state
        };
        let _ = fs::remove_file(self.lock_path());
        Ok(state)
    }
}

fn read_state(path: &Path) -> Result<RunState> {
    match fs::read(path) {
        Ok(bytes) => serde_json::from_slice(&bytes)
            .with_context(|| format!("parse {}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(RunState::default()),
        Err(e) => Err(e).with_context(|| format!("read {}", path.display())),
    }
}
