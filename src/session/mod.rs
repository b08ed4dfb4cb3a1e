//! Recording session management
//!
//! This module owns one end-to-end recording attempt:
//! - staging the extension and launching the browser
//! - navigating to the target page and running click workers
//! - supervising recorder events and writing chunks to the sink
//! - tearing the browser down and reporting session statistics

mod config;
mod session;
mod stats;

pub use config::{ClickTarget, SessionConfig};
pub use session::{run_click_target, supervise, RecordingSession};
pub use stats::SessionStats;
