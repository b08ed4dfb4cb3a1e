use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;

/// Driver configuration, loaded from an optional TOML file.
///
/// Everything has a default so the common case is no file at all; CLI flags
/// override file values where both exist.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub browser: BrowserSettings,
    pub session: SessionSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// Explicit Chrome executable; otherwise the system install is used.
    pub chrome_path: Option<PathBuf>,

    /// Pass --no-sandbox to the browser. Required in most containers.
    pub no_sandbox: bool,

    pub window_width: u32,
    pub window_height: u32,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            chrome_path: None,
            no_sandbox: true,
            window_width: 1280,
            window_height: 720,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Seconds of recorder silence before the driver nudges the page to stop.
    pub stop_timeout_secs: u64,

    /// Per-attempt ceiling in seconds on waiting for a click selector.
    pub selector_wait_secs: u64,

    /// Attempts per click target before giving up. Unset retries forever.
    pub click_retry_limit: Option<u32>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            stop_timeout_secs: 30,
            selector_wait_secs: 30,
            click_retry_limit: None,
        }
    }
}

impl Config {
    /// Load configuration from `path`, or defaults when no path is given.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}
