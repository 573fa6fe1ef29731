//! The record handed to the consumer callback for every matched request.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Header, ResponseInfo, SendHeadersInfo, TabInfo};

/// Normalized description of one matched request/response exchange.
///
/// Immutable once built; the watcher hands it to the sink and keeps nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRecord {
    /// Response URL.
    pub url: String,
    /// Page title of the owning tab, if any.
    pub file: Option<String>,
    /// Header name -> values. Names serialize sorted; values keep wire order.
    pub request_headers: BTreeMap<String, Vec<String>>,
    pub response_headers: BTreeMap<String, Vec<String>>,
    /// All `Cookie` header values joined with `;`. Unset when none were sent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookie: Option<String>,
    pub method: String,
    pub user_agent: String,
    pub tab_url: Option<String>,
    /// Tab id as text; `"-1"` for requests without a page.
    pub tab_id: String,
}

/// Builds the record for a resolved request and its response.
///
/// Request headers are merged from `extra_headers` first, then
/// `request_headers`. Only headers spelled exactly `Cookie` or `cookie`
/// contribute to the cookie string.
pub fn assemble_record(
    req: &SendHeadersInfo,
    res: &ResponseInfo,
    tab: Option<&TabInfo>,
    user_agent: &str,
) -> RequestRecord {
    let mut request_headers = BTreeMap::new();
    let mut cookies: Vec<&str> = Vec::new();

    for h in req.extra_headers.iter().chain(req.request_headers.iter()) {
        if is_cookie_header(h) {
            cookies.push(&h.value);
        }
        push_header(&mut request_headers, h);
    }

    let mut response_headers = BTreeMap::new();
    for h in &res.response_headers {
        push_header(&mut response_headers, h);
    }

    RequestRecord {
        url: res.url.clone(),
        file: tab.map(|t| t.title.clone()),
        request_headers,
        response_headers,
        cookie: if cookies.is_empty() {
            None
        } else {
            Some(cookies.join(";"))
        },
        method: req.method.clone(),
        user_agent: user_agent.to_string(),
        tab_url: tab.map(|t| t.url.clone()),
        tab_id: req.tab_id.to_string(),
    }
}

fn is_cookie_header(h: &Header) -> bool {
    h.name == "Cookie" || h.name == "cookie"
}

fn push_header(map: &mut BTreeMap<String, Vec<String>>, h: &Header) {
    map.entry(h.name.clone()).or_default().push(h.value.clone());
}
