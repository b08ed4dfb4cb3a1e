use anyhow::{anyhow, Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::control::PageControl;
use crate::config::BrowserSettings;
use crate::extension::SENTINEL_TITLE;
use crate::protocol::ClientMessage;

/// How often `wait_for_selector` re-probes the page.
const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// A launched Chrome instance with the capture extension loaded.
///
/// Tab capture needs a real window, so the browser always runs headful. Each
/// session gets a throwaway profile directory; both it and the CDP handler
/// task live exactly as long as the session.
pub struct BrowserSession {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    // Held for the browser's lifetime, removed on drop.
    _profile_dir: TempDir,
}

impl BrowserSession {
    /// Launch Chrome with the staged extension and capture auto-selection.
    pub async fn launch(settings: &BrowserSettings, extension_dir: &Path) -> Result<Self> {
        let profile_dir =
            TempDir::with_prefix("tabrec-profile-").context("Failed to create profile dir")?;

        let extension = extension_dir.to_string_lossy();
        let mut builder = BrowserConfig::builder()
            .with_head()
            .window_size(settings.window_width, settings.window_height)
            .user_data_dir(profile_dir.path())
            // Let the picker resolve to the retitled tab without interaction.
            .arg(format!("--auto-select-desktop-capture-source={}", SENTINEL_TITLE))
            .arg(format!("--disable-extensions-except={}", extension))
            .arg(format!("--load-extension={}", extension))
            // The content script's play handler is the one gesture we trust.
            .arg("--autoplay-policy=user-gesture-required")
            .arg("--disable-infobars");

        if settings.no_sandbox {
            builder = builder.arg("--no-sandbox");
        }
        if let Some(path) = &settings.chrome_path {
            builder = builder.chrome_executable(path);
        }

        let config = builder
            .build()
            .map_err(|e| anyhow!("Failed to build browser config: {}", e))?;

        info!(
            "Launching browser ({}x{}, extension at {})",
            settings.window_width, settings.window_height, extension
        );

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("Failed to launch browser")?;

        // The handler must be polled for the CDP connection to make progress.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("CDP handler event error: {}", e);
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .context("Failed to open page")?;

        info!("Browser launched");

        Ok(Self {
            browser,
            page,
            handler_task,
            _profile_dir: profile_dir,
        })
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// A cloneable page-control handle for session logic and click workers.
    pub fn control(&self) -> PageHandle {
        PageHandle {
            page: self.page.clone(),
        }
    }

    /// Navigate the page and wait for the load to settle.
    pub async fn navigate(&self, url: &str) -> Result<()> {
        info!("Navigating to {}", url);
        self.page
            .goto(url)
            .await
            .with_context(|| format!("Failed to navigate to {}", url))?;
        self.page
            .wait_for_navigation()
            .await
            .with_context(|| format!("Navigation to {} did not settle", url))?;
        Ok(())
    }

    /// Shut the browser down and reap the child process.
    pub async fn close(mut self) -> Result<()> {
        info!("Closing browser");
        if let Err(e) = self.browser.close().await {
            warn!("Browser close request failed: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            warn!("Browser did not exit cleanly: {}", e);
        }
        self.handler_task.abort();
        Ok(())
    }
}

/// Live implementation of [`PageControl`] over a CDP page.
#[derive(Clone)]
pub struct PageHandle {
    page: Page,
}

#[async_trait::async_trait]
impl PageControl for PageHandle {
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.page.find_element(selector).await.is_ok() {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(anyhow!("Timed out waiting for selector {}", selector));
            }
            tokio::time::sleep(SELECTOR_POLL_INTERVAL).await;
        }
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .with_context(|| format!("Element {} not found", selector))?;
        element
            .click()
            .await
            .with_context(|| format!("Failed to click {}", selector))?;
        Ok(())
    }

    async fn pause_media(&self) -> Result<()> {
        self.page
            .evaluate("for (const video of document.querySelectorAll('video')) video.pause()")
            .await
            .context("Failed to pause videos")?;
        Ok(())
    }

    async fn broadcast_stop(&self) -> Result<()> {
        let stop = serde_json::to_string(&ClientMessage::Stop)?;
        self.page
            .evaluate(format!("window.postMessage({}, '*')", stop))
            .await
            .context("Failed to broadcast stop signal")?;
        Ok(())
    }
}
