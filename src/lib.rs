//! Crate entry point for **reposync**.
//!
//! The core is [`Synchronizer`]: it keeps a local working copy of a remote
//! repository at a deterministic path and converges it to the remote tip on
//! every call. Around it sit the pieces the `reposync` binary needs: config,
//! logging, an optional source recorder, a Slack notifier and a file-locked
//! run board for parallel workers.

pub mod config;
pub mod git;
mod lock;
pub mod logging;
pub mod notify;
mod paths;
pub mod record;
pub mod run;
pub mod sync;

#[cfg(test)]
mod test_support;

pub use config::{Config, load_config, load_config_from};
pub use git::{Git2Backend, Vcs};
pub use lock::FileLock;
pub use notify::{Notifier, NotifyError, SlackClient};
pub use paths::reposync_home;
pub use record::{RecordMode, Recorder, TarballRecorder};
pub use run::RunBoard;
pub use sync::{RepoSource, SyncError, Synchronizer, cmd_path, cmd_sync};
