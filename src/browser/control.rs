use anyhow::Result;
use std::time::Duration;

/// Recorder lifecycle as seen by the driver, decoded from the wire messages
/// the extension forwards through the CDP binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecorderEvent {
    /// The backend started recording.
    Started,
    /// One decoded chunk of recorded media.
    Chunk(Vec<u8>),
    /// The backend stopped; the session is complete.
    Stopped,
    /// The backend could not acquire a capture stream.
    Failed(String),
}

/// Page operations the session logic needs from a live browser.
///
/// Kept narrow so the supervising loop and click workers can be exercised in
/// tests without a browser.
#[async_trait::async_trait]
pub trait PageControl: Send + Sync {
    /// Wait until `selector` matches an element, up to `timeout`.
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()>;

    /// Click the first element matching `selector`.
    async fn click(&self, selector: &str) -> Result<()>;

    /// Pause every video element on the page.
    async fn pause_media(&self) -> Result<()>;

    /// Post a client stop signal into the page, to be relayed to the backend.
    async fn broadcast_stop(&self) -> Result<()>;
}
