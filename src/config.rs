use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::notify::DEFAULT_BASE_URL;
use crate::paths::config_path;
use crate::record::RecordMode;
use crate::sync::{DEFAULT_BRANCHES, DEFAULT_SCRATCH_ROOT};

/// Top-level configuration loaded from `config.toml`.
///
/// Every section and key is optional.
///
/// Example TOML:
/// ```toml
/// [sync]
/// scratch_root = "/tmp"
/// branches = ["main", "master"]
///
/// [record]
/// mode = "record"
/// archive_dir = "/tmp/reposync-archives"
///
/// [slack]
/// channel = "eval-results"
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sync: SyncSettings,
    #[serde(default)]
    pub record: RecordSettings,
    #[serde(default)]
    pub slack: SlackSettings,
    #[serde(default)]
    pub run: RunSettings,
}

#[derive(Debug, Deserialize)]
pub struct SyncSettings {
    #[serde(default = "default_scratch_root")]
    pub scratch_root: PathBuf,
    #[serde(default = "default_branches")]
    pub branches: Vec<String>,
    #[serde(default = "default_true")]
    pub lock: bool,
}

#[derive(Debug, Deserialize)]
pub struct RecordSettings {
    #[serde(default)]
    pub mode: RecordMode,
    #[serde(default = "default_archive_dir")]
    pub archive_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct SlackSettings {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub channel: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RunSettings {
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,
    #[serde(default = "default_header")]
    pub header: String,
}

fn default_scratch_root() -> PathBuf {
    PathBuf::from(DEFAULT_SCRATCH_ROOT)
}

fn default_branches() -> Vec<String> {
    DEFAULT_BRANCHES.iter().map(|s| s.to_string()).collect()
}

fn default_true() -> bool {
    true
}

fn default_archive_dir() -> PathBuf {
    env::temp_dir().join("reposync-archives")
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_state_dir() -> PathBuf {
    env::temp_dir().join("reposync-run")
}

fn default_header() -> String {
    "Test Header".to_string()
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            scratch_root: default_scratch_root(),
            branches: default_branches(),
            lock: true,
        }
    }
}

impl Default for RecordSettings {
    fn default() -> Self {
        Self {
            mode: RecordMode::Off,
            archive_dir: default_archive_dir(),
        }
    }
}

impl Default for SlackSettings {
    fn default() -> Self {
        Self {
            token: None,
            base_url: default_base_url(),
            channel: None,
        }
    }
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
            header: default_header(),
        }
    }
}

impl SlackSettings {
    /// Bot token: `SLACK_BOT_TOKEN` if set, else the configured one.
    pub fn resolved_token(&self) -> Option<String> {
        env::var("SLACK_BOT_TOKEN")
            .ok()
            .filter(|t| !t.is_empty())
            .or_else(|| self.token.clone())
    }
}

/// Load `config.toml` from the standard location.
///
/// A missing file yields the defaults.
///
/// # Errors
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(path: &Path) -> Result<Config> {
    let txt = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
        Err(e) => return Err(e).with_context(|| format!("read config {}", path.display())),
    };
    let cfg: Config = toml::from_str(&txt)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    #[test]
    fn missing_file_gives_defaults() {
        let td = tempdir().unwrap();
        let cfg = load_config_from(&td.path().join("config.toml")).unwrap();
        assert_eq!(cfg.sync.scratch_root, PathBuf::from("/tmp"));
        assert_eq!(cfg.sync.branches, vec!["main", "master"]);
        assert!(cfg.sync.lock);
        assert_eq!(cfg.record.mode, RecordMode::Off);
        assert_eq!(cfg.slack.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.run.header, "Test Header");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let td = tempdir().unwrap();
        let path = td.path().join("config.toml");
        fs::write(
            &path,
            r#"
[sync]
scratch_root = "/scratch"
branches = ["trunk"]

[record]
mode = "record"

[slack]
channel = "eval-results"
"#,
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.sync.scratch_root, PathBuf::from("/scratch"));
        assert_eq!(cfg.sync.branches, vec!["trunk"]);
        assert!(cfg.sync.lock);
        assert_eq!(cfg.record.mode, RecordMode::Record);
        assert_eq!(cfg.slack.channel.as_deref(), Some("eval-results"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let td = tempdir().unwrap();
        let path = td.path().join("config.toml");
        fs::write(&path, "[sync\nscratch_root = 1").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("failed to parse"));
    }

    #[test]
    #[serial]
    fn env_token_overrides_config() {
        let prev = env::var_os("SLACK_BOT_TOKEN");
        let s = SlackSettings {
            token: Some("from-file".into()),
            ..Default::default()
        };

        unsafe { env::remove_var("SLACK_BOT_TOKEN") };
        assert_eq!(s.resolved_token().as_deref(), Some("from-file"));

        unsafe { env::set_var("SLACK_BOT_TOKEN", "from-env") };
        assert_eq!(s.resolved_token().as_deref(), Some("from-env"));

        match prev {
            Some(v) => unsafe { env::set_var("SLACK_BOT_TOKEN", v) },
            None => unsafe { env::remove_var("SLACK_BOT_TOKEN") },
        }
    }
}
