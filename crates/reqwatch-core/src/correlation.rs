//! Pending-request table: pairs a later response with the request that produced it.
//!
//! Entries are keyed by request id and owned by the table; `resolve` moves the
//! entry out, `discard` drops it. The table only ever holds requests that are
//! still in flight, so its size tracks concurrency, not history.

use std::collections::HashMap;

use crate::model::{RequestId, SendHeadersInfo};

#[derive(Debug, Default)]
pub struct PendingTable {
    entries: HashMap<RequestId, SendHeadersInfo>,
}

impl PendingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit `info` if it is a GET or its URL contains one of `matching_hosts`.
    ///
    /// This is only an ingestion pre-filter; the final decision happens when
    /// the response arrives. Returns whether the request was admitted. A
    /// repeated id replaces the earlier entry.
    pub fn record_sent(&mut self, info: SendHeadersInfo, matching_hosts: &[String]) -> bool {
        if !admits(&info, matching_hosts) {
            return false;
        }
        self.entries.insert(info.request_id.clone(), info);
        true
    }

    /// Remove and return the pending entry for `id`, if any.
    pub fn resolve(&mut self, id: &RequestId) -> Option<SendHeadersInfo> {
        self.entries.remove(id)
    }

    /// Drop any entry for `id`. Unknown ids are ignored.
    pub fn discard(&mut self, id: &RequestId) {
        self.entries.remove(id);
    }

    pub fn contains(&self, id: &RequestId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Ingestion pre-filter: GET, or a URL containing one of `matching_hosts`.
pub fn admits(info: &SendHeadersInfo, matching_hosts: &[String]) -> bool {
    info.method == "GET" || matching_hosts.iter().any(|h| info.url.contains(h.as_str()))
}
