//! Transport encoding for recorded chunks
//!
//! The relay boundary only reliably carries text, so chunk bytes cross it as
//! standard base64 (no line wrapping). The extension's background script
//! encodes each timeslice before emitting `REC_BACKEND_BLOB`; the driver
//! decodes right before handing bytes to the sink. The pair below is the
//! whole contract: `decode_chunk(encode_chunk(bytes)) == bytes`.

use anyhow::{Context, Result};
use base64::Engine;

/// Encode recorder bytes for the relay boundary.
pub fn encode_chunk(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Decode a transport-encoded chunk back into recorder bytes.
///
/// A failure here means the chunk is dropped by the caller; it never aborts
/// the session.
pub fn decode_chunk(encoded: &str) -> Result<Vec<u8>> {
    base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .context("chunk payload is not valid base64")
}
