use anyhow::{Context, Result, anyhow};

use super::RunBoard;
use crate::config::{Config, load_config};
use crate::notify::client_from_config;

fn board(cfg: &Config) -> RunBoard {
    RunBoard::new(&cfg.run.state_dir)
}

fn channel<'a>(cfg: &'a Config, explicit: Option<&'a str>) -> Result<&'a str> {
    explicit
        .or(cfg.slack.channel.as_deref())
        .context("no channel: pass --channel or set [slack].channel")
}

/// Parse `NAME=AMOUNT`. The name may contain spaces; the last `=` splits.
pub fn parse_amount(s: &str) -> Result<(String, i64)> {
    let (name, amount) = s
        .rsplit_once('=')
        .ok_or_else(|| anyhow!("expected NAME=AMOUNT, got {:?}", s))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(anyhow!("empty counter name in {:?}", s));
    }
    let amount: i64 = amount
        .trim()
        .parse()
        .with_context(|| format!("invalid amount in {:?}", s))?;
    Ok((name.to_string(), amount))
}

/// CLI: zero the counters and forget the status thread.
pub fn cmd_reset() -> Result<()> {
    board(&load_config()?).reset()
}

/// CLI: print the status thread id, posting it if this is the first caller.
pub fn cmd_thread(channel_arg: Option<&str>) -> Result<()> {
    let cfg = load_config()?;
    let client = client_from_config(&cfg)?;
    let ts = board(&cfg).thread(&client, channel(&cfg, channel_arg)?, &cfg.run.header)?;
    println!("{}", ts);
    Ok(())
}

/// CLI: add `NAME=AMOUNT` pairs to the shared counters.
pub fn cmd_add(pairs: &[String]) -> Result<()> {
    let amounts = pairs
        .iter()
        .map(|p| parse_amount(p))
        .collect::<Result<Vec<_>>>()?;
    board(&load_config()?).add(&amounts)
}

/// CLI: close the status thread with the final totals and print them.
pub fn cmd_finish(channel_arg: Option<&str>) -> Result<()> {
    let cfg = load_config()?;
    let client = client_from_config(&cfg)?;
    let state = board(&cfg).finish(&client, channel(&cfg, channel_arg)?, &cfg.run.header)?;
    for (name, value) in &state.totals {
        println!("{}: {}", name, value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_amount_accepts_names_with_spaces() {
        assert_eq!(parse_amount("Total 1=10").unwrap(), ("Total 1".into(), 10));
        assert_eq!(parse_amount("x = -3").unwrap(), ("x".into(), -3));
        assert_eq!(parse_amount("a=b=4").unwrap(), ("a=b".into(), 4));
    }

    #[test]
    fn parse_amount_rejects_garbage() {
        assert!(parse_amount("nope").is_err());
        assert!(parse_amount("=4").is_err());
        assert!(parse_amount("x=four").is_err());
    }

    #[test]
    fn explicit_channel_wins_over_config() {
        let mut cfg = Config::default();
        assert!(channel(&cfg, None).is_err());
        cfg.slack.channel = Some("eval-results".into());
        assert_eq!(channel(&cfg, None).unwrap(), "eval-results");
        assert_eq!(channel(&cfg, Some("other")).unwrap(), "other");
    }
}
