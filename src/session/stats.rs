use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Final accounting for a recording session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    /// Session identifier.
    pub session_id: String,

    /// When the session started.
    pub started_at: DateTime<Utc>,

    /// Wall-clock duration in seconds.
    pub duration_secs: f64,

    /// Chunks appended to the output file.
    pub chunks_written: usize,

    /// Bytes appended to the output file.
    pub bytes_written: u64,

    /// Chunks dropped because the output was not open.
    pub chunks_dropped: usize,

    /// Times the supervisor timed out and nudged the page to stop.
    pub stop_nudges: usize,

    /// Output path, if the file was ever opened.
    pub output: Option<PathBuf>,
}
