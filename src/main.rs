use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tabrec::session::{ClickTarget, RecordingSession, SessionConfig};
use tabrec::Config;
use tracing::info;

/// Record the video playing in a browser tab to a local file.
#[derive(Debug, Parser)]
#[command(name = "tabrec", version)]
struct Cli {
    /// Page to navigate to and record
    #[arg(long)]
    url: String,

    /// Output media file
    #[arg(long, default_value = "out.webm")]
    file: PathBuf,

    /// Selector to click after load; shorthand for --click play=SELECTOR
    #[arg(long)]
    play: Option<String>,

    /// Named click target (repeatable)
    #[arg(long = "click", value_name = "NAME=SELECTOR")]
    click: Vec<String>,

    /// Delay before clicking a named target (repeatable)
    #[arg(long = "click-delay", value_name = "NAME=MILLIS")]
    click_delay: Vec<String>,

    /// Give up on a click target after this many attempts
    #[arg(long)]
    click_retry_limit: Option<u32>,

    /// Optional TOML configuration file
    #[arg(long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = Config::load(cli.config.as_deref())?;

    let mut clicks = ClickTarget::from_args(&cli.click, &cli.click_delay)?;
    if let Some(selector) = cli.play {
        clicks.insert(
            0,
            ClickTarget {
                name: "play".to_string(),
                selector,
                delay: None,
            },
        );
    }

    let mut session_config = SessionConfig::new(cli.url, cli.file);
    session_config.clicks = clicks;
    session_config.stop_timeout = Duration::from_secs(cfg.session.stop_timeout_secs);
    session_config.selector_wait = Duration::from_secs(cfg.session.selector_wait_secs);
    session_config.click_retry_limit = cli.click_retry_limit.or(cfg.session.click_retry_limit);

    let stats = RecordingSession::new(session_config).run(&cfg.browser).await?;

    match &stats.output {
        Some(path) => info!(
            "Recorded {} chunks ({} bytes) in {:.1}s -> {}",
            stats.chunks_written,
            stats.bytes_written,
            stats.duration_secs,
            path.display()
        ),
        None => info!(
            "Session ended after {:.1}s without recording anything",
            stats.duration_secs
        ),
    }

    Ok(())
}
