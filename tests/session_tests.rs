// Supervisor and click-worker tests, driven against a scripted page control
// so no browser is needed.

use anyhow::{bail, Result};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tabrec::browser::{PageControl, RecorderEvent};
use tabrec::session::{run_click_target, supervise, ClickTarget};
use tabrec::sink::{BlobSink, FileSink};
use tempfile::TempDir;
use tokio::sync::mpsc;

/// Page control that records every call and can be scripted to fail.
#[derive(Default)]
struct FakePage {
    calls: Mutex<Vec<String>>,
    selector_missing: bool,
    clicks_to_fail: AtomicU32,
}

impl FakePage {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

#[async_trait::async_trait]
impl PageControl for FakePage {
    async fn wait_for_selector(&self, selector: &str, _timeout: Duration) -> Result<()> {
        self.record(format!("wait:{selector}"));
        if self.selector_missing {
            bail!("selector {} never appeared", selector);
        }
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        self.record(format!("click:{selector}"));
        let remaining = self.clicks_to_fail.load(Ordering::SeqCst);
        if remaining > 0 {
            self.clicks_to_fail.store(remaining - 1, Ordering::SeqCst);
            bail!("element {} detached before click", selector);
        }
        Ok(())
    }

    async fn pause_media(&self) -> Result<()> {
        self.record("pause_media");
        Ok(())
    }

    async fn broadcast_stop(&self) -> Result<()> {
        self.record("broadcast_stop");
        Ok(())
    }
}

fn sink_in(dir: &TempDir) -> FileSink {
    FileSink::new(dir.path().join("out.webm"))
}

#[tokio::test]
async fn supervise_writes_chunks_in_emission_order() -> Result<()> {
    let dir = TempDir::new()?;
    let mut sink = sink_in(&dir);
    let page = FakePage::default();
    let (tx, mut rx) = mpsc::channel(16);

    tx.send(RecorderEvent::Started).await?;
    tx.send(RecorderEvent::Chunk(b"aaa".to_vec())).await?;
    tx.send(RecorderEvent::Chunk(b"bbb".to_vec())).await?;
    tx.send(RecorderEvent::Stopped).await?;

    let nudges = supervise(&page, &mut rx, &mut sink, Duration::from_secs(5)).await?;

    assert_eq!(nudges, 0);
    assert_eq!(std::fs::read(dir.path().join("out.webm"))?, b"aaabbb");
    assert!(!sink.is_open(), "sink must be closed after a stop event");
    assert!(page.calls().is_empty(), "no nudge without a timeout");
    Ok(())
}

#[tokio::test]
async fn duplicate_start_does_not_restart_the_recording() -> Result<()> {
    let dir = TempDir::new()?;
    let mut sink = sink_in(&dir);
    let page = FakePage::default();
    let (tx, mut rx) = mpsc::channel(16);

    tx.send(RecorderEvent::Started).await?;
    tx.send(RecorderEvent::Chunk(b"before".to_vec())).await?;
    tx.send(RecorderEvent::Started).await?;
    tx.send(RecorderEvent::Chunk(b"-after".to_vec())).await?;
    tx.send(RecorderEvent::Stopped).await?;

    supervise(&page, &mut rx, &mut sink, Duration::from_secs(5)).await?;

    assert_eq!(std::fs::read(dir.path().join("out.webm"))?, b"before-after");
    Ok(())
}

#[tokio::test]
async fn chunks_before_start_are_dropped() -> Result<()> {
    let dir = TempDir::new()?;
    let mut sink = sink_in(&dir);
    let page = FakePage::default();
    let (tx, mut rx) = mpsc::channel(16);

    tx.send(RecorderEvent::Chunk(b"early".to_vec())).await?;
    tx.send(RecorderEvent::Started).await?;
    tx.send(RecorderEvent::Chunk(b"kept".to_vec())).await?;
    tx.send(RecorderEvent::Stopped).await?;

    supervise(&page, &mut rx, &mut sink, Duration::from_secs(5)).await?;

    assert_eq!(std::fs::read(dir.path().join("out.webm"))?, b"kept");
    assert_eq!(sink.chunks_dropped(), 1);
    Ok(())
}

#[tokio::test]
async fn stop_while_idle_creates_no_file() -> Result<()> {
    let dir = TempDir::new()?;
    let mut sink = sink_in(&dir);
    let page = FakePage::default();
    let (tx, mut rx) = mpsc::channel(16);

    tx.send(RecorderEvent::Stopped).await?;

    let nudges = supervise(&page, &mut rx, &mut sink, Duration::from_secs(5)).await?;

    assert_eq!(nudges, 0);
    assert!(!sink.was_opened());
    assert!(!dir.path().join("out.webm").exists());
    Ok(())
}

#[tokio::test]
async fn timeout_nudges_the_page_then_keeps_waiting() -> Result<()> {
    let dir = TempDir::new()?;
    let mut sink = sink_in(&dir);
    let page = FakePage::default();
    let (tx, mut rx) = mpsc::channel(16);

    let (nudges, ()) = tokio::join!(
        async {
            supervise(&page, &mut rx, &mut sink, Duration::from_millis(50))
                .await
                .unwrap()
        },
        async {
            // Stay silent long enough for at least one timeout to fire.
            tokio::time::sleep(Duration::from_millis(140)).await;
            tx.send(RecorderEvent::Stopped).await.unwrap();
        }
    );

    assert!(nudges >= 1, "expected at least one stop nudge, got {nudges}");
    let calls = page.calls();
    assert!(calls.contains(&"pause_media".to_string()));
    assert!(calls.contains(&"broadcast_stop".to_string()));
    assert!(!sink.was_opened());
    Ok(())
}

#[tokio::test]
async fn capture_failure_fails_fast_without_a_file() -> Result<()> {
    let dir = TempDir::new()?;
    let mut sink = sink_in(&dir);
    let page = FakePage::default();
    let (tx, mut rx) = mpsc::channel(16);

    tx.send(RecorderEvent::Failed("picker cancelled".to_string()))
        .await?;

    let result = supervise(&page, &mut rx, &mut sink, Duration::from_secs(5)).await;

    let err = result.expect_err("capture failure must end the session");
    assert!(err.to_string().contains("picker cancelled"));
    assert!(!sink.was_opened());
    assert!(!dir.path().join("out.webm").exists());
    Ok(())
}

#[tokio::test]
async fn closed_channel_still_closes_the_sink() -> Result<()> {
    let dir = TempDir::new()?;
    let mut sink = sink_in(&dir);
    let page = FakePage::default();
    let (tx, mut rx) = mpsc::channel(16);

    tx.send(RecorderEvent::Started).await?;
    tx.send(RecorderEvent::Chunk(b"tail".to_vec())).await?;
    drop(tx);

    supervise(&page, &mut rx, &mut sink, Duration::from_secs(5)).await?;

    assert!(!sink.is_open());
    assert_eq!(std::fs::read(dir.path().join("out.webm"))?, b"tail");
    Ok(())
}

#[tokio::test]
async fn click_worker_retries_the_whole_sequence() {
    let page = Arc::new(FakePage {
        clicks_to_fail: AtomicU32::new(2),
        ..FakePage::default()
    });
    let target = ClickTarget {
        name: "a".to_string(),
        selector: "#start".to_string(),
        delay: None,
    };

    run_click_target(page.clone(), target, Duration::from_millis(100), None).await;

    // Two failed attempts and the successful third, each re-waiting first.
    let calls = page.calls();
    assert_eq!(
        calls,
        vec![
            "wait:#start",
            "click:#start",
            "wait:#start",
            "click:#start",
            "wait:#start",
            "click:#start",
        ]
    );
}

#[tokio::test]
async fn click_worker_gives_up_at_the_retry_limit() {
    let page = Arc::new(FakePage {
        clicks_to_fail: AtomicU32::new(u32::MAX),
        ..FakePage::default()
    });
    let target = ClickTarget {
        name: "a".to_string(),
        selector: "#never".to_string(),
        delay: None,
    };

    run_click_target(page.clone(), target, Duration::from_millis(100), Some(3)).await;

    let clicks = page
        .calls()
        .iter()
        .filter(|call| call.starts_with("click:"))
        .count();
    assert_eq!(clicks, 3);
}

#[tokio::test]
async fn click_worker_applies_the_delay_between_wait_and_click() {
    let page = Arc::new(FakePage::default());
    let target = ClickTarget {
        name: "a".to_string(),
        selector: "#start".to_string(),
        delay: Some(Duration::from_millis(60)),
    };

    let started = Instant::now();
    run_click_target(page.clone(), target, Duration::from_millis(100), None).await;

    assert!(started.elapsed() >= Duration::from_millis(60));
    assert_eq!(page.calls(), vec!["wait:#start", "click:#start"]);
}

#[test]
fn click_targets_parse_from_cli_pairs() -> Result<()> {
    let targets = ClickTarget::from_args(
        &["a=#start".to_string(), "b=.accept".to_string()],
        &["a=500".to_string()],
    )?;

    assert_eq!(
        targets,
        vec![
            ClickTarget {
                name: "a".to_string(),
                selector: "#start".to_string(),
                delay: Some(Duration::from_millis(500)),
            },
            ClickTarget {
                name: "b".to_string(),
                selector: ".accept".to_string(),
                delay: None,
            },
        ]
    );
    Ok(())
}

#[test]
fn click_target_parsing_rejects_bad_input() {
    assert!(ClickTarget::from_args(&["missing-equals".to_string()], &[]).is_err());
    assert!(ClickTarget::from_args(&["a=#start".to_string()], &["a=soon".to_string()]).is_err());
    // A delay for a target that was never declared is an error, not silence.
    assert!(ClickTarget::from_args(&[], &["ghost=100".to_string()]).is_err());
}
