use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// A UI element the driver clicks after navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickTarget {
    /// Name used to pair a selector with its delay and in log output.
    pub name: String,
    /// CSS selector to wait for and click.
    pub selector: String,
    /// Optional fixed delay between the selector appearing and the click.
    pub delay: Option<Duration>,
}

impl ClickTarget {
    /// Build click targets from repeatable `NAME=SELECTOR` and `NAME=MILLIS`
    /// CLI values. A delay without a matching selector is an error.
    pub fn from_args(clicks: &[String], delays: &[String]) -> Result<Vec<ClickTarget>> {
        let mut delay_by_name = HashMap::new();
        for entry in delays {
            let (name, millis) = split_pair(entry)
                .with_context(|| format!("Invalid --click-delay value '{}'", entry))?;
            let millis: u64 = millis
                .parse()
                .with_context(|| format!("Invalid delay milliseconds in '{}'", entry))?;
            delay_by_name.insert(name.to_string(), Duration::from_millis(millis));
        }

        let mut targets = Vec::with_capacity(clicks.len());
        for entry in clicks {
            let (name, selector) =
                split_pair(entry).with_context(|| format!("Invalid --click value '{}'", entry))?;
            targets.push(ClickTarget {
                name: name.to_string(),
                selector: selector.to_string(),
                delay: delay_by_name.remove(name),
            });
        }

        if let Some(name) = delay_by_name.keys().next() {
            bail!("--click-delay {} has no matching --click {}", name, name);
        }
        Ok(targets)
    }
}

fn split_pair(entry: &str) -> Result<(&str, &str)> {
    match entry.split_once('=') {
        Some((name, value)) if !name.is_empty() && !value.is_empty() => Ok((name, value)),
        _ => bail!("expected NAME=VALUE"),
    }
}

/// Configuration for one recording session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Unique session identifier, used in logs and stats.
    pub session_id: String,

    /// Page to navigate to and record.
    pub url: String,

    /// Output media file path.
    pub output: PathBuf,

    /// UI elements to click after navigation.
    pub clicks: Vec<ClickTarget>,

    /// How long the supervisor waits for recorder activity before pausing
    /// playback and re-broadcasting a stop signal.
    pub stop_timeout: Duration,

    /// Per-attempt ceiling on waiting for a click target's selector.
    pub selector_wait: Duration,

    /// Give up on a click target after this many attempts. `None` retries
    /// forever.
    pub click_retry_limit: Option<u32>,
}

impl SessionConfig {
    pub fn new(url: impl Into<String>, output: impl Into<PathBuf>) -> Self {
        Self {
            session_id: format!("record-{}", uuid::Uuid::new_v4()),
            url: url.into(),
            output: output.into(),
            clicks: Vec::new(),
            stop_timeout: Duration::from_secs(30),
            selector_wait: Duration::from_secs(30),
            click_retry_limit: None,
        }
    }
}
