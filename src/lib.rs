pub mod browser;
pub mod config;
pub mod extension;
pub mod protocol;
pub mod session;
pub mod sink;

pub use browser::{BrowserSession, PageControl, RecorderBridge, RecorderEvent};
pub use config::{BrowserSettings, Config, SessionSettings};
pub use extension::{ExtensionBundle, SENTINEL_TITLE};
pub use protocol::{BackendMessage, ClientMessage};
pub use session::{ClickTarget, RecordingSession, SessionConfig, SessionStats};
pub use sink::{BlobSink, FileSink};
