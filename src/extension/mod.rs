//! Embedded browser extension
//!
//! The in-browser half of the recorder ships inside the binary: a content
//! script that detects video playback (the capture bridge) and a background
//! script that owns the capture stream and media recorder (the recording
//! backend). `ExtensionBundle` stages the assets into a temporary directory
//! that the browser loads with `--load-extension`.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use tracing::info;

/// Title the content script gives the page once a video plays, and the value
/// the driver points `--auto-select-desktop-capture-source` at. The two must
/// agree or the picker never resolves.
pub const SENTINEL_TITLE: &str = "tabrec-capture";

pub const MANIFEST: &str = include_str!("manifest.json");
pub const CONTENT_SCRIPT: &str = include_str!("content_script.js");
pub const BACKGROUND_SCRIPT: &str = include_str!("background.js");

/// The extension assets staged on disk for the lifetime of a session.
///
/// Dropping the bundle removes the directory, so it must outlive the browser
/// process that loaded it.
pub struct ExtensionBundle {
    dir: TempDir,
}

impl ExtensionBundle {
    /// Write the embedded assets into a fresh temporary directory.
    pub fn materialize() -> Result<Self> {
        let dir = TempDir::with_prefix("tabrec-ext-").context("Failed to create extension dir")?;

        for (name, contents) in [
            ("manifest.json", MANIFEST),
            ("content_script.js", CONTENT_SCRIPT),
            ("background.js", BACKGROUND_SCRIPT),
        ] {
            let path = dir.path().join(name);
            fs::write(&path, contents)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }

        info!("Staged capture extension at {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}
