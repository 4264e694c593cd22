//! Working-copy synchronization.
//!
//! [`Synchronizer`] is the library entry point: it maps a [`RepoSource`] to a
//! deterministic path under a scratch root and converges that path to the
//! remote tip. The decision itself is the pure [`resolve`] function; the
//! synchronizer observes, resolves, then executes.
//!
//! [`cmd_sync`] and [`cmd_path`] are the CLI front-ends.

mod error;
mod jobs;
mod progress;
mod resolve;
mod source;
mod synchronizer;

use anyhow::{Result, bail};
use indicatif::{MultiProgress, ProgressBar};
use rayon::prelude::*;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::load_config;
use crate::record::TarballRecorder;

pub use error::SyncError;
pub use resolve::{Action, DEFAULT_BRANCHES, ObservedState, observe, resolve};
pub use source::RepoSource;
pub use synchronizer::{DEFAULT_SCRATCH_ROOT, Synchronizer};

use progress::{err_style, ok_style, spinner_style};

/// Command-line overrides for [`cmd_sync`].
#[derive(Debug, Default, Clone)]
pub struct SyncArgs {
    pub sources: Vec<String>,
    pub root: Option<PathBuf>,
    pub no_lock: bool,
}

/// Synchronize every source given on the command line.
///
/// Flow:
/// 1. Load config; `--root` and `--no-lock` override `[sync]`.
/// 2. Build one job per distinct locator (see [`jobs::build_jobs`]).
/// 3. Run the jobs **in parallel**, one spinner each. A failing job is shown
///    on its own line and does not stop the others.
/// 4. Print each resolved path on stdout, in input order.
///
/// # Errors
/// Fails if the config cannot be loaded, or if any job failed.
pub fn cmd_sync(args: &SyncArgs) -> Result<()> {
    let cfg = load_config()?;
    let root = args.root.clone().unwrap_or(cfg.sync.scratch_root);
    let synchronizer = Synchronizer::new(&root)
        .with_branches(cfg.sync.branches)
        .with_lock(cfg.sync.lock && !args.no_lock);
    let recorder = TarballRecorder::new(cfg.record.mode, cfg.record.archive_dir);

    let jobs = jobs::build_jobs(&args.sources, &root);
    if jobs.is_empty() {
        bail!("no repository sources given");
    }

    let mp = MultiProgress::new();
    let bars: Vec<ProgressBar> = jobs
        .iter()
        .map(|j| {
            let pb = mp.add(ProgressBar::new_spinner());
            pb.set_style(spinner_style());
            pb.set_prefix(j.display.clone());
            pb.set_message("syncing");
            pb.enable_steady_tick(Duration::from_millis(80));
            pb
        })
        .collect();

    let results: Vec<Result<PathBuf, SyncError>> = jobs
        .par_iter()
        .zip(bars.par_iter())
        .map(|(job, pb)| {
            let res = synchronizer.sync(&job.source, Some(&recorder));
            match &res {
                Ok(path) => {
                    pb.set_style(ok_style());
                    pb.finish_with_message(path.display().to_string());
                }
                Err(e) => {
                    pb.set_style(err_style());
                    pb.finish_with_message(error_chain(e));
                }
            }
            res
        })
        .collect();

    let mut failed = 0;
    for res in results {
        match res {
            Ok(path) => println!("{}", path.display()),
            Err(_) => failed += 1,
        }
    }
    if failed > 0 {
        bail!("{} of {} sources failed to sync", failed, jobs.len());
    }
    Ok(())
}

/// `error: cause: cause` on one line.
fn error_chain(e: &SyncError) -> String {
    let mut out = e.to_string();
    let mut cur = std::error::Error::source(e);
    while let Some(c) = cur {
        out.push_str(": ");
        out.push_str(&c.to_string());
        cur = c.source();
    }
    out
}

/// Print the working-copy path `source` maps to, without touching it.
pub fn cmd_path(source: &str, root: Option<PathBuf>) -> Result<()> {
    let root = match root {
        Some(r) => r,
        None => load_config()?.sync.scratch_root,
    };
    println!("{}", RepoSource::new(source).local_path(&root)?.display());
    Ok(())
}
