use anyhow::{anyhow, Result};
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{error, info, warn};

use super::config::{ClickTarget, SessionConfig};
use super::stats::SessionStats;
use crate::browser::{BrowserSession, PageControl, RecorderBridge, RecorderEvent};
use crate::config::BrowserSettings;
use crate::extension::ExtensionBundle;
use crate::sink::{BlobSink, FileSink};

/// One end-to-end recording attempt.
pub struct RecordingSession {
    config: SessionConfig,
}

impl RecordingSession {
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }

    /// Run the session to completion and report what was recorded.
    ///
    /// Stages the extension, launches the browser, installs the recorder
    /// bridge before navigating, spawns a worker per click target, then
    /// supervises recorder events until the backend stops or fails. The
    /// browser is torn down before the outcome is inspected so a capture
    /// failure still cleans up.
    pub async fn run(self, browser_settings: &BrowserSettings) -> Result<SessionStats> {
        let config = self.config;
        let started_at = Utc::now();
        let started = Instant::now();

        info!(
            "Starting recording session {} for {} -> {}",
            config.session_id,
            config.url,
            config.output.display()
        );

        let bundle = ExtensionBundle::materialize()?;
        let browser = BrowserSession::launch(browser_settings, bundle.path()).await?;

        // The bridge must exist before navigation or early events are lost.
        let mut bridge = RecorderBridge::install(browser.page()).await?;

        browser.navigate(&config.url).await?;

        let control: Arc<dyn PageControl> = Arc::new(browser.control());
        let mut workers = Vec::with_capacity(config.clicks.len());
        for target in config.clicks.clone() {
            let page = Arc::clone(&control);
            let selector_wait = config.selector_wait;
            let retry_limit = config.click_retry_limit;
            workers.push(tokio::spawn(async move {
                run_click_target(page, target, selector_wait, retry_limit).await;
            }));
        }

        let mut sink = FileSink::new(&config.output);
        let outcome = supervise(
            control.as_ref(),
            bridge.events(),
            &mut sink,
            config.stop_timeout,
        )
        .await;

        for worker in &workers {
            worker.abort();
        }
        browser.close().await?;

        let stop_nudges = outcome?;

        let stats = SessionStats {
            session_id: config.session_id.clone(),
            started_at,
            duration_secs: started.elapsed().as_secs_f64(),
            chunks_written: sink.chunks_written(),
            bytes_written: sink.bytes_written(),
            chunks_dropped: sink.chunks_dropped(),
            stop_nudges,
            output: sink.was_opened().then(|| sink.path().to_path_buf()),
        };

        info!(
            "Session {} complete: {} chunks, {} bytes",
            stats.session_id, stats.chunks_written, stats.bytes_written
        );
        Ok(stats)
    }
}

/// Consume recorder events until the backend stops, driving the sink.
///
/// The supervisor is the sink's only owner: start opens it (idempotent, a
/// duplicate start never truncates), chunks append in arrival order, stop
/// closes it and ends the session. When no event arrives within
/// `stop_timeout` the page is nudged: all videos are paused and a client
/// stop signal is broadcast, then the wait resumes. Returns how many times
/// the nudge fired.
pub async fn supervise(
    page: &dyn PageControl,
    events: &mut mpsc::Receiver<RecorderEvent>,
    sink: &mut dyn BlobSink,
    stop_timeout: Duration,
) -> Result<usize> {
    let mut stop_nudges = 0;
    loop {
        match timeout(stop_timeout, events.recv()).await {
            Ok(Some(RecorderEvent::Started)) => {
                info!("Recorder started");
                sink.open()?;
            }
            Ok(Some(RecorderEvent::Chunk(bytes))) => {
                // A failed write drops the chunk, never the session.
                if let Err(e) = sink.append(&bytes) {
                    error!("Failed to write chunk: {}", e);
                }
            }
            Ok(Some(RecorderEvent::Stopped)) => {
                info!("Recorder stopped");
                sink.close()?;
                return Ok(stop_nudges);
            }
            Ok(Some(RecorderEvent::Failed(message))) => {
                sink.close()?;
                return Err(anyhow!("Capture failed: {}", message));
            }
            Ok(None) => {
                warn!("Recorder event channel closed before a stop event");
                sink.close()?;
                return Ok(stop_nudges);
            }
            Err(_elapsed) => {
                stop_nudges += 1;
                info!(
                    "No recorder activity for {:?}, pausing playback and requesting stop",
                    stop_timeout
                );
                if let Err(e) = page.pause_media().await {
                    warn!("Failed to pause videos: {}", e);
                }
                if let Err(e) = page.broadcast_stop().await {
                    warn!("Failed to broadcast stop signal: {}", e);
                }
            }
        }
    }
}

/// Wait for a click target's selector, honor its delay, click it.
///
/// Any failure restarts the whole wait-delay-click sequence. Retries are
/// unbounded unless `retry_limit` caps them.
pub async fn run_click_target(
    page: Arc<dyn PageControl>,
    target: ClickTarget,
    selector_wait: Duration,
    retry_limit: Option<u32>,
) {
    let mut attempts: u32 = 0;
    loop {
        attempts += 1;
        match attempt_click(page.as_ref(), &target, selector_wait).await {
            Ok(()) => {
                info!("Clicked {} ({})", target.name, target.selector);
                return;
            }
            Err(e) => {
                warn!(
                    "Click target {} attempt {} failed: {}",
                    target.name, attempts, e
                );
                if let Some(limit) = retry_limit {
                    if attempts >= limit {
                        warn!(
                            "Giving up on click target {} after {} attempts",
                            target.name, attempts
                        );
                        return;
                    }
                }
            }
        }
    }
}

async fn attempt_click(
    page: &dyn PageControl,
    target: &ClickTarget,
    selector_wait: Duration,
) -> Result<()> {
    page.wait_for_selector(&target.selector, selector_wait).await?;
    if let Some(delay) = target.delay {
        tokio::time::sleep(delay).await;
    }
    page.click(&target.selector).await
}
