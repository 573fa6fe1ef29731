//! `reqwatch watch` – feed host events through the watcher, print matched requests.

use anyhow::{Context, Result};
use reqwatch_core::config::WatcherConfig;
use reqwatch_core::model::{RequestRecord, TabId, TabInfo};
use reqwatch_core::watcher::{
    parse_event_line, EventError, RecordSink, RequestWatcher, StaticTabs, WatcherService,
};
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// Counters for one event stream.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WatchSummary {
    pub events: usize,
    pub skipped: usize,
    pub pending: usize,
}

pub async fn run_watch(cfg: &WatcherConfig, input: Option<&Path>, tabs: Option<&Path>) -> Result<()> {
    let tabs = match tabs {
        Some(path) => load_tabs(path)?,
        None => StaticTabs::new(),
    };

    let reader: Box<dyn AsyncRead + Unpin + Send> = match input {
        Some(path) => Box::new(
            tokio::fs::File::open(path)
                .await
                .with_context(|| format!("open event file {}", path.display()))?,
        ),
        None => Box::new(tokio::io::stdin()),
    };

    let summary = watch_events(cfg, tabs, reader, std::io::stdout()).await?;
    tracing::info!(
        events = summary.events,
        skipped = summary.skipped,
        pending = summary.pending,
        "event stream closed"
    );
    Ok(())
}

/// Run every event line from `reader` through a watcher and write one JSON
/// line per emitted record to `out`. Blank lines are ignored; malformed lines
/// are logged and counted as skipped.
pub(crate) async fn watch_events<R, W>(
    cfg: &WatcherConfig,
    tabs: StaticTabs,
    reader: R,
    out: W,
) -> Result<WatchSummary>
where
    R: AsyncRead + Unpin,
    W: Write + Send + 'static,
{
    let watcher = RequestWatcher::from_config(cfg, tabs).with_sink(JsonLines::new(out));
    let (service, sender) = WatcherService::new(watcher);
    let handle = tokio::spawn(service.run());

    let mut summary = WatchSummary::default();
    let mut lines = BufReader::new(reader).lines();
    let mut line_no = 0usize;
    while let Some(line) = lines.next_line().await.context("read event line")? {
        line_no += 1;
        match parse_event_line(&line) {
            Ok(event) => {
                if !sender.send(event) {
                    tracing::warn!("watcher stopped early; {} event(s) read", summary.events);
                    break;
                }
                summary.events += 1;
            }
            Err(EventError::Empty) => {}
            Err(e) => {
                tracing::warn!(line = line_no, "skipping event: {}", e);
                summary.skipped += 1;
            }
        }
    }
    drop(sender);

    let watcher = handle.await.context("watcher task failed")?;
    summary.pending = watcher.pending_len();
    Ok(summary)
}

/// Record sink writing JSON lines.
struct JsonLines<W> {
    out: Mutex<W>,
}

impl<W> JsonLines<W> {
    fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }
}

impl<W: Write + Send + 'static> RecordSink for JsonLines<W> {
    fn deliver(&self, record: RequestRecord) {
        let line = match serde_json::to_string(&record) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!("failed to encode record for {}: {}", record.url, e);
                return;
            }
        };
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = writeln!(out, "{}", line).and_then(|_| out.flush()) {
            tracing::warn!("failed to write record: {}", e);
        }
    }
}

/// Tab registry snapshot: a JSON object keyed by tab id.
fn load_tabs(path: &Path) -> Result<StaticTabs> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("read tabs file {}", path.display()))?;
    let map: HashMap<TabId, TabInfo> =
        serde_json::from_str(&data).with_context(|| format!("parse tabs file {}", path.display()))?;
    tracing::debug!("loaded {} tab(s) from {}", map.len(), path.display());
    Ok(StaticTabs::from_map(map))
}
