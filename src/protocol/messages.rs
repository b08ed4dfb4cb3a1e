use serde::{Deserialize, Serialize};

/// Tag prefix for messages originating in the page.
pub const CLIENT_TAG_PREFIX: &str = "REC_CLIENT_";

/// Tag prefix for messages originating in the recording backend.
pub const BACKEND_TAG_PREFIX: &str = "REC_BACKEND_";

/// Payload of a play signal: the origin the video started playing on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayRequest {
    pub url: String,
}

/// Messages sent from the page toward the recording backend.
///
/// Deserialization is closed over the known tags; an unknown `type` is a
/// parse error rather than a fallthrough branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// A video element began playing; begin a capture session for this origin.
    #[serde(rename = "REC_CLIENT_PLAY")]
    Play { data: PlayRequest },

    /// Stop the active capture session.
    #[serde(rename = "REC_CLIENT_STOP")]
    Stop,
}

/// Messages sent from the recording backend toward the page (and on to the
/// driver through the relay).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BackendMessage {
    /// The recorder started; the session is now recording.
    #[serde(rename = "REC_BACKEND_START")]
    Start,

    /// The recorder stopped; the session returned to idle.
    #[serde(rename = "REC_BACKEND_STOP")]
    Stop,

    /// One timeslice of recorded media, transport-encoded.
    #[serde(rename = "REC_BACKEND_BLOB")]
    Blob { blob: String },

    /// Capture source or stream acquisition failed; the session stayed idle.
    #[serde(rename = "REC_BACKEND_ERROR")]
    Error { message: String },
}

impl ClientMessage {
    /// The wire tag this message serializes under.
    pub fn tag(&self) -> &'static str {
        match self {
            ClientMessage::Play { .. } => "REC_CLIENT_PLAY",
            ClientMessage::Stop => "REC_CLIENT_STOP",
        }
    }
}

impl BackendMessage {
    /// The wire tag this message serializes under.
    pub fn tag(&self) -> &'static str {
        match self {
            BackendMessage::Start => "REC_BACKEND_START",
            BackendMessage::Stop => "REC_BACKEND_STOP",
            BackendMessage::Blob { .. } => "REC_BACKEND_BLOB",
            BackendMessage::Error { .. } => "REC_BACKEND_ERROR",
        }
    }
}
