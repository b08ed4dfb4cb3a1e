//! Ordered persistence for recorded chunks
//!
//! The driver exposes three entry points to the recording flow: open the
//! output lazily when recording starts, append decoded bytes in arrival
//! order, and close exactly once when recording stops. `BlobSink` is that
//! surface; `FileSink` is the file-backed implementation.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Destination for decoded recorder chunks.
///
/// Implementations must keep `open` and `close` idempotent: the relay can
/// deliver duplicate start or stop events and neither may reopen, truncate,
/// or double-close the output.
pub trait BlobSink: Send {
    /// Lazily create the output on the first call. A no-op while open.
    fn open(&mut self) -> Result<()>;

    /// Append one chunk. Chunks arriving while the sink is not open are
    /// dropped and counted, never an error.
    fn append(&mut self, bytes: &[u8]) -> Result<()>;

    /// Flush and close the output. Latched: later calls are no-ops.
    fn close(&mut self) -> Result<()>;

    fn is_open(&self) -> bool;

    /// Total bytes appended so far.
    fn bytes_written(&self) -> u64;

    /// Chunks appended so far.
    fn chunks_written(&self) -> usize;

    /// Chunks dropped because the sink was not open.
    fn chunks_dropped(&self) -> usize;
}

/// Writes chunks to a single media file in arrival order.
///
/// The file is created on `open`, not construction, so a session that never
/// starts recording never touches the path.
pub struct FileSink {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    opened: bool,
    closed: bool,
    bytes_written: u64,
    chunks_written: usize,
    chunks_dropped: usize,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: None,
            opened: false,
            closed: false,
            bytes_written: 0,
            chunks_written: 0,
            chunks_dropped: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the output file was ever created.
    pub fn was_opened(&self) -> bool {
        self.opened
    }
}

impl BlobSink for FileSink {
    fn open(&mut self) -> Result<()> {
        if self.writer.is_some() {
            return Ok(());
        }
        if self.closed {
            warn!("Output {} already closed, not reopening", self.path.display());
            return Ok(());
        }
        let file = File::create(&self.path)
            .with_context(|| format!("Failed to create output file {}", self.path.display()))?;
        info!("Opened output file {}", self.path.display());
        self.writer = Some(BufWriter::new(file));
        self.opened = true;
        Ok(())
    }

    fn append(&mut self, bytes: &[u8]) -> Result<()> {
        match &mut self.writer {
            Some(writer) => {
                writer
                    .write_all(bytes)
                    .with_context(|| format!("Failed to write chunk to {}", self.path.display()))?;
                self.bytes_written += bytes.len() as u64;
                self.chunks_written += 1;
                Ok(())
            }
            None => {
                self.chunks_dropped += 1;
                warn!(
                    "Dropping {} byte chunk, output {} is not open",
                    bytes.len(),
                    self.path.display()
                );
                Ok(())
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer
                .flush()
                .with_context(|| format!("Failed to flush {}", self.path.display()))?;
            info!(
                "Closed output file {} ({} chunks, {} bytes)",
                self.path.display(),
                self.chunks_written,
                self.bytes_written
            );
        }
        self.closed = true;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.writer.is_some()
    }

    fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    fn chunks_written(&self) -> usize {
        self.chunks_written
    }

    fn chunks_dropped(&self) -> usize {
        self.chunks_dropped
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            if let Err(e) = writer.flush() {
                warn!("Failed to flush {} on drop: {}", self.path.display(), e);
            }
        }
    }
}
