//! Event and record types exchanged with the host networking layer.
//!
//! Field names follow the host's event detail objects (camelCase JSON), so a
//! host adapter can deserialize its notifications straight into these types.

mod record;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use record::{assemble_record, RequestRecord};

/// Tab identifier assigned by the host. `NO_TAB` means the request is not
/// associated with any page (service workers, extension traffic, ...).
pub type TabId = i64;

/// Sentinel tab id for requests without a page.
pub const NO_TAB: TabId = -1;

/// Opaque identifier of one request/response exchange.
///
/// Hosts assign either strings or numbers; both deserialize into the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawRequestId", into = "String")]
pub struct RequestId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRequestId {
    Text(String),
    Number(serde_json::Number),
}

impl From<RawRequestId> for RequestId {
    fn from(raw: RawRequestId) -> Self {
        match raw {
            RawRequestId::Text(s) => RequestId(s),
            RawRequestId::Number(n) => RequestId(n.to_string()),
        }
    }
}

impl From<RequestId> for String {
    fn from(id: RequestId) -> Self {
        id.0
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        RequestId(s.to_string())
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        RequestId(s)
    }
}

impl From<u64> for RequestId {
    fn from(n: u64) -> Self {
        RequestId(n.to_string())
    }
}

impl RequestId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One HTTP header as reported by the host, in wire order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    /// Hosts may report binary values separately; those arrive as empty text.
    #[serde(default)]
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// "Headers sent" notification. Stored as the pending request until the
/// matching response or an error arrives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendHeadersInfo {
    pub request_id: RequestId,
    pub method: String,
    pub url: String,
    #[serde(default = "default_tab")]
    pub tab_id: TabId,
    #[serde(default)]
    pub extra_headers: Vec<Header>,
    #[serde(default)]
    pub request_headers: Vec<Header>,
}

/// "Headers received" notification. Consumed during match evaluation, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseInfo {
    pub request_id: RequestId,
    pub url: String,
    #[serde(default)]
    pub response_headers: Vec<Header>,
}

impl ResponseInfo {
    /// First header whose name equals `name` ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.response_headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }
}

/// "Error occurred" notification for a request that will never complete.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInfo {
    pub request_id: RequestId,
    #[serde(default)]
    pub error: Option<String>,
}

/// Page information resolved from the host's tab registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabInfo {
    pub title: String,
    pub url: String,
}

fn default_tab() -> TabId {
    NO_TAB
}
