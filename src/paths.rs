use anyhow::Result;
use std::{env, path::PathBuf};

/// Configuration directory: `$XDG_CONFIG_HOME/reposync`, or
/// `$HOME/.config/reposync` when `XDG_CONFIG_HOME` is unset.
pub fn reposync_home() -> Result<PathBuf> {
    let xdg = env::var_os("XDG_CONFIG_HOME");
    let base = xdg
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env::var_os("HOME").unwrap_or_default()).join(".config"));
    Ok(base.join("reposync"))
}

pub fn config_path() -> Result<PathBuf> {
    Ok(reposync_home()?.join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn xdg_config_home_wins() {
        let prev = env::var_os("XDG_CONFIG_HOME");
        unsafe { env::set_var("XDG_CONFIG_HOME", "/xdg") };
        assert_eq!(reposync_home().unwrap(), PathBuf::from("/xdg/reposync"));
        assert_eq!(
            config_path().unwrap(),
            PathBuf::from("/xdg/reposync/config.toml")
        );
        match prev {
            Some(v) => unsafe { env::set_var("XDG_CONFIG_HOME", v) },
            None => unsafe { env::remove_var("XDG_CONFIG_HOME") },
        }
    }
}
