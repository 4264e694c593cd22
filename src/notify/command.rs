use anyhow::{Context, Result};
use std::path::Path;

use super::{Notifier, SlackClient};
use crate::config::{Config, load_config};

/// Build a [`SlackClient`] from `[slack]` settings and `SLACK_BOT_TOKEN`.
pub fn client_from_config(cfg: &Config) -> Result<SlackClient> {
    let token = cfg
        .slack
        .resolved_token()
        .context("no Slack token: set SLACK_BOT_TOKEN or [slack].token")?;
    Ok(SlackClient::with_base_url(&token, &cfg.slack.base_url)?)
}

/// CLI: post a message and print its id.
pub fn cmd_send(channel: &str, text: &str) -> Result<()> {
    let client = client_from_config(&load_config()?)?;
    println!("{}", client.send_message(channel, text)?);
    Ok(())
}

/// CLI: reply in a thread and print the reply's id.
pub fn cmd_reply(channel: &str, thread_ts: &str, text: &str) -> Result<()> {
    let client = client_from_config(&load_config()?)?;
    println!("{}", client.send_thread_reply(channel, thread_ts, text)?);
    Ok(())
}

/// CLI: edit an existing message.
pub fn cmd_edit(channel: &str, ts: &str, text: &str) -> Result<()> {
    let client = client_from_config(&load_config()?)?;
    client.edit_message(channel, ts, text)?;
    Ok(())
}

/// CLI: upload a file and print the file id.
pub fn cmd_upload(channel: &str, file: &Path, comment: &str) -> Result<()> {
    let client = client_from_config(&load_config()?)?;
    let id = client
        .upload_file(channel, file, comment)
        .with_context(|| format!("upload {}", file.display()))?;
    println!("{}", id);
    Ok(())
}
