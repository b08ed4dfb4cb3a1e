use anyhow::{Context, Result};
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::cdp::js_protocol::runtime::{AddBindingParams, EnableParams, EventBindingCalled};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::control::RecorderEvent;
use crate::protocol::{decode_chunk, BackendMessage};

/// Name of the CDP binding the in-page forwarder calls. The forwarder script
/// below must use the same identifier.
pub const BINDING_NAME: &str = "__tabrecEmit";

/// Installed on every new document before navigation, so backend events are
/// captured from the first page load onward. Forwards any same-window message
/// with a backend tag into the binding, verbatim.
const FORWARDER_SCRIPT: &str = r#"
(() => {
  if (window.__tabrecForwarderInstalled) return
  window.__tabrecForwarderInstalled = true
  window.addEventListener('message', (event) => {
    if (event.source !== window) return
    const msg = event.data
    if (!msg || typeof msg.type !== 'string' || !msg.type.startsWith('REC_BACKEND_')) return
    if (typeof window.__tabrecEmit === 'function') {
      window.__tabrecEmit(JSON.stringify(msg))
    }
  })
})()
"#;

/// Host side of the message relay: binding payloads in, recorder events out.
///
/// Chunk payloads are decoded here, at the transport boundary; a chunk that
/// fails to decode is logged and dropped without disturbing the session.
pub struct RecorderBridge {
    events: mpsc::Receiver<RecorderEvent>,
    pump_task: JoinHandle<()>,
}

impl RecorderBridge {
    /// Register the binding and forwarder on `page` and start pumping events.
    ///
    /// Must run before the first navigation or early backend events are lost.
    pub async fn install(page: &Page) -> Result<Self> {
        page.execute(EnableParams::default())
            .await
            .context("Failed to enable the Runtime domain")?;
        page.execute(AddBindingParams::new(BINDING_NAME))
            .await
            .context("Failed to register the recorder binding")?;
        page.execute(AddScriptToEvaluateOnNewDocumentParams::new(FORWARDER_SCRIPT))
            .await
            .context("Failed to install the event forwarder")?;

        let mut binding_events = page
            .event_listener::<EventBindingCalled>()
            .await
            .context("Failed to listen for binding calls")?;

        let (tx, rx) = mpsc::channel(64);
        let pump_task = tokio::spawn(async move {
            while let Some(call) = binding_events.next().await {
                if call.name != BINDING_NAME {
                    continue;
                }
                let Some(event) = translate(&call.payload) else {
                    continue;
                };
                if tx.send(event).await.is_err() {
                    debug!("Recorder event receiver dropped, stopping bridge pump");
                    break;
                }
            }
        });

        info!("Recorder bridge installed (binding {})", BINDING_NAME);
        Ok(Self {
            events: rx,
            pump_task,
        })
    }

    /// The ordered stream of recorder events for this session.
    pub fn events(&mut self) -> &mut mpsc::Receiver<RecorderEvent> {
        &mut self.events
    }
}

impl Drop for RecorderBridge {
    fn drop(&mut self) {
        self.pump_task.abort();
    }
}

/// Parse one binding payload into a driver-side event.
///
/// Returns `None` for payloads that should be dropped: unknown or malformed
/// messages and chunks that fail transport decoding.
fn translate(payload: &str) -> Option<RecorderEvent> {
    let message = match serde_json::from_str::<BackendMessage>(payload) {
        Ok(message) => message,
        Err(e) => {
            warn!("Dropping unrecognized backend payload: {}", e);
            return None;
        }
    };
    match message {
        BackendMessage::Start => Some(RecorderEvent::Started),
        BackendMessage::Stop => Some(RecorderEvent::Stopped),
        BackendMessage::Blob { blob } => match decode_chunk(&blob) {
            Ok(bytes) => Some(RecorderEvent::Chunk(bytes)),
            Err(e) => {
                error!("Dropping undecodable chunk: {}", e);
                None
            }
        },
        BackendMessage::Error { message } => Some(RecorderEvent::Failed(message)),
    }
}
