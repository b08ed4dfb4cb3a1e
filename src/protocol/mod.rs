//! Wire vocabulary shared with the browser extension
//!
//! Messages cross three hops: the page script context, the extension
//! background context, and the driver's CDP binding. Every hop carries the
//! same tagged JSON records; the tag prefix (`REC_CLIENT_` vs `REC_BACKEND_`)
//! tells the in-page relay which direction a message travels.

pub mod messages;
pub mod transport;

pub use messages::{BackendMessage, ClientMessage, PlayRequest};
pub use transport::{decode_chunk, encode_chunk};
