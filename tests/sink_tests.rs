// Tests for the file-backed chunk sink: lazy open, ordered append, and
// latched close.

use anyhow::Result;
use std::fs;
use tabrec::sink::{BlobSink, FileSink};
use tempfile::TempDir;

#[test]
fn file_is_created_lazily() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("out.webm");

    let sink = FileSink::new(&path);
    assert!(!path.exists(), "construction must not touch the path");
    assert!(!sink.was_opened());
    drop(sink);
    assert!(!path.exists());
    Ok(())
}

#[test]
fn chunks_concatenate_in_order() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("out.webm");

    let mut sink = FileSink::new(&path);
    sink.open()?;
    sink.append(b"first-")?;
    sink.append(b"second-")?;
    sink.append(b"third")?;
    sink.close()?;

    assert_eq!(fs::read(&path)?, b"first-second-third");
    assert_eq!(sink.chunks_written(), 3);
    assert_eq!(sink.bytes_written(), 18);
    Ok(())
}

#[test]
fn open_is_idempotent_and_never_truncates() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("out.webm");

    let mut sink = FileSink::new(&path);
    sink.open()?;
    sink.append(b"kept")?;
    sink.open()?;
    sink.append(b"-and-more")?;
    sink.close()?;

    assert_eq!(fs::read(&path)?, b"kept-and-more");
    Ok(())
}

#[test]
fn close_is_latched() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("out.webm");

    let mut sink = FileSink::new(&path);
    sink.open()?;
    sink.append(b"data")?;
    sink.close()?;
    sink.close()?;
    sink.close()?;

    assert!(!sink.is_open());
    assert_eq!(fs::read(&path)?, b"data");

    // Reopening after close is refused; the file stays as it was.
    sink.open()?;
    assert!(!sink.is_open());
    assert_eq!(fs::read(&path)?, b"data");
    Ok(())
}

#[test]
fn appends_while_closed_are_dropped_and_counted() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("out.webm");

    let mut sink = FileSink::new(&path);
    sink.append(b"too-early")?;
    assert_eq!(sink.chunks_dropped(), 1);
    assert!(!path.exists());

    sink.open()?;
    sink.append(b"on-time")?;
    sink.close()?;
    sink.append(b"too-late")?;

    assert_eq!(sink.chunks_dropped(), 2);
    assert_eq!(sink.chunks_written(), 1);
    assert_eq!(fs::read(&path)?, b"on-time");
    Ok(())
}

#[test]
fn close_without_open_is_a_no_op() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("out.webm");

    let mut sink = FileSink::new(&path);
    sink.close()?;
    assert!(!path.exists());
    assert!(!sink.was_opened());
    Ok(())
}
