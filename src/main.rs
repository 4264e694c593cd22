//! # reposync
//!
//! Keeps scratch working copies of remote git repositories up to date.
//!
//! Commands:
//! - `reposync sync <SOURCE>...` clones or resets each source under the scratch root
//! - `reposync path <SOURCE>` prints where a source's working copy lives
//! - `reposync notify ...` posts, replies to, edits and uploads Slack messages
//! - `reposync run ...` shares a status thread and counters across parallel workers
//! - `reposync home` prints the config directory
//!
//! This CLI is built with [clap](https://docs.rs/clap).

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;

use reposync::sync::SyncArgs;
use reposync::{cmd_path, cmd_sync, logging, notify, reposync_home, run};

#[derive(Parser, Debug)]
#[command(
    name = "reposync",
    version,
    about = "reposync - keep scratch clones of remote repositories up to date",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Clone or reset each source under the scratch root
    Sync {
        /// Repository URLs or paths
        #[arg(required = true)]
        sources: Vec<String>,
        /// Scratch root (overrides [sync].scratch_root)
        #[arg(long)]
        root: Option<PathBuf>,
        /// Do not take the per-path lock
        #[arg(long)]
        no_lock: bool,
    },
    /// Print the working-copy path for a source
    Path {
        source: String,
        #[arg(long)]
        root: Option<PathBuf>,
    },
    /// Slack notifications
    #[command(subcommand)]
    Notify(NotifyCmd),
    /// Shared run status for parallel workers
    #[command(subcommand)]
    Run(RunCmd),
    /// Print the reposync config directory
    Home,
}

#[derive(Subcommand, Debug)]
enum NotifyCmd {
    /// Post a message and print its id
    Send { channel: String, text: String },
    /// Reply in a thread and print the reply id
    Reply {
        channel: String,
        thread_ts: String,
        text: String,
    },
    /// Replace the text of a message
    Edit {
        channel: String,
        ts: String,
        text: String,
    },
    /// Upload a file with a comment
    Upload {
        channel: String,
        file: PathBuf,
        #[arg(long, default_value = "")]
        comment: String,
    },
}

#[derive(Subcommand, Debug)]
enum RunCmd {
    /// Zero counters and forget the status thread
    Reset,
    /// Print the status thread id, posting it on first use
    Thread {
        #[arg(long)]
        channel: Option<String>,
    },
    /// Add NAME=AMOUNT to shared counters
    Add {
        #[arg(required = true)]
        amounts: Vec<String>,
    },
    /// Mark the status thread finished with the totals
    Finish {
        #[arg(long)]
        channel: Option<String>,
    },
}

fn dispatch(cmd: Cmd) -> Result<()> {
    match cmd {
        Cmd::Sync {
            sources,
            root,
            no_lock,
        } => cmd_sync(&SyncArgs {
            sources,
            root,
            no_lock,
        }),
        Cmd::Path { source, root } => cmd_path(&source, root),
        Cmd::Notify(n) => match n {
            NotifyCmd::Send { channel, text } => notify::cmd_send(&channel, &text),
            NotifyCmd::Reply {
                channel,
                thread_ts,
                text,
            } => notify::cmd_reply(&channel, &thread_ts, &text),
            NotifyCmd::Edit { channel, ts, text } => notify::cmd_edit(&channel, &ts, &text),
            NotifyCmd::Upload {
                channel,
                file,
                comment,
            } => notify::cmd_upload(&channel, &file, &comment),
        },
        Cmd::Run(r) => match r {
            RunCmd::Reset => run::cmd_reset(),
            RunCmd::Thread { channel } => run::cmd_thread(channel.as_deref()),
            RunCmd::Add { amounts } => run::cmd_add(&amounts),
            RunCmd::Finish { channel } => run::cmd_finish(channel.as_deref()),
        },
        Cmd::Home => {
            println!("{}", reposync_home()?.display());
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = logging::init() {
        eprintln!("{} {}", "warning:".yellow().bold(), e);
    }

    match dispatch(cli.cmd) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
