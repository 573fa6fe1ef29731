//! Resolver interface for turning captured requests into download jobs.
//!
//! A download manager only needs the direct URL plus the few headers that
//! make the server hand out the same file it gave the browser.

use std::collections::HashMap;

use crate::model::RequestRecord;

/// Minimal request specification needed to repeat the GET.
#[derive(Debug, Clone)]
pub struct ResolvedJobSpec {
    pub url: String,
    /// Minimal headers required to perform the GET.
    pub headers: HashMap<String, String>,
}

/// Anything that can be turned into a direct download request.
pub trait Resolver {
    fn resolve(&self) -> anyhow::Result<ResolvedJobSpec>;
}

impl Resolver for RequestRecord {
    /// Carries the cookie string, the browser user agent, and the page URL as
    /// `Referer`. Empty values are left out.
    fn resolve(&self) -> anyhow::Result<ResolvedJobSpec> {
        if self.url.is_empty() {
            anyhow::bail!("record has no url");
        }
        let mut headers = HashMap::new();
        if let Some(cookie) = self.cookie.as_deref().filter(|c| !c.is_empty()) {
            headers.insert("Cookie".to_string(), cookie.to_string());
        }
        if !self.user_agent.is_empty() {
            headers.insert("User-Agent".to_string(), self.user_agent.clone());
        }
        if let Some(referer) = self.tab_url.as_deref().filter(|u| !u.is_empty()) {
            headers.insert("Referer".to_string(), referer.to_string());
        }
        Ok(ResolvedJobSpec {
            url: self.url.clone(),
            headers,
        })
    }
}
