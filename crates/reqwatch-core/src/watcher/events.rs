//! Typed events pushed by the host, and the subscriptions the watcher asks for.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{ErrorInfo, ResponseInfo, SendHeadersInfo};
use crate::rules::RuleUpdate;

/// One message on the watcher's event channel.
///
/// On the wire this is a JSON object tagged by `event`, e.g.
/// `{"event": "sendHeaders", "requestId": "1", ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum WatcherEvent {
    SendHeaders(SendHeadersInfo),
    HeadersReceived(ResponseInfo),
    ErrorOccurred(ErrorInfo),
    /// Rule update from the host application, applied between network events.
    UpdateRules(RuleUpdate),
}

/// A host event line that could not be decoded.
#[derive(Debug, Error)]
pub enum EventError {
    #[error("empty event line")]
    Empty,
    #[error("malformed event: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decode one JSON-lines event as written by a host adapter.
pub fn parse_event_line(line: &str) -> Result<WatcherEvent, EventError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(EventError::Empty);
    }
    Ok(serde_json::from_str(line)?)
}

/// Host network lifecycle notifications the watcher listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    SendHeaders,
    HeadersReceived,
    ErrorOccurred,
}

/// What the watcher asks the host for when attaching one listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription {
    pub kind: EventKind,
    /// URL match patterns the listener is scoped to.
    pub urls: &'static [&'static str],
    /// Extra detail the host must include (raw, non-redacted headers).
    pub extra_info: &'static [&'static str],
}

/// Every HTTP and HTTPS URL.
pub const URL_FILTER: &[&str] = &["http://*/*", "https://*/*"];

pub const SUBSCRIPTIONS: [Subscription; 3] = [
    Subscription {
        kind: EventKind::SendHeaders,
        urls: URL_FILTER,
        extra_info: &["extraHeaders", "requestHeaders"],
    },
    Subscription {
        kind: EventKind::HeadersReceived,
        urls: URL_FILTER,
        extra_info: &["extraHeaders", "responseHeaders"],
    },
    Subscription {
        kind: EventKind::ErrorOccurred,
        urls: URL_FILTER,
        extra_info: &[],
    },
];
