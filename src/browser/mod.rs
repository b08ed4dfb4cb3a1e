//! Browser driving over the Chrome DevTools Protocol
//!
//! This module owns everything that talks to a live browser: launching
//! Chrome with the capture extension pre-loaded, the page-control seam the
//! session logic drives, and the bridge that turns extension events into
//! driver-side `RecorderEvent`s.

mod bridge;
mod chrome;
mod control;

pub use bridge::{RecorderBridge, BINDING_NAME};
pub use chrome::{BrowserSession, PageHandle};
pub use control::{PageControl, RecorderEvent};
