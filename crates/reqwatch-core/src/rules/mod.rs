//! Rule configuration and the matching-rule evaluator.
//!
//! `RuleConfig` is the live rule set; `RuleUpdate` is the partial update
//! accepted from the host (JSON, camelCase) or the config file (TOML,
//! snake_case). Fields missing from an update keep their current value.

mod matcher;
mod patterns;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub use matcher::{evaluate, is_matching, MatchRule};
pub use patterns::{compile_patterns, PatternError};

/// Live rule set used by the evaluator and the ingestion pre-filter.
#[derive(Debug, Clone, Default)]
pub struct RuleConfig {
    /// Host substrings that veto a response before any accept rule runs.
    pub blocked_hosts: Vec<String>,
    /// Upper-case path suffixes (e.g. `.MP4`) for media.
    pub media_exts: Vec<String>,
    /// Bare file extensions (e.g. `zip`), matched after a `.`.
    pub file_exts: Vec<String>,
    /// Host substrings; broadest accept rule and part of the pre-filter.
    pub matching_hosts: Vec<String>,
    /// Content-Type substrings (e.g. `video/`).
    pub media_types: Vec<String>,
    /// Compiled case-insensitive URL patterns, in configured order.
    pub url_patterns: Vec<Regex>,
    /// Upper-case path suffixes for request-side file types.
    pub request_file_exts: Vec<String>,
}

/// Partial rule update. Every present field replaces the stored value wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleUpdate {
    #[serde(alias = "blockedHosts", skip_serializing_if = "Option::is_none")]
    pub blocked_hosts: Option<Vec<String>>,
    #[serde(alias = "mediaExts", skip_serializing_if = "Option::is_none")]
    pub media_exts: Option<Vec<String>>,
    #[serde(alias = "fileExts", skip_serializing_if = "Option::is_none")]
    pub file_exts: Option<Vec<String>>,
    #[serde(alias = "matchingHosts", skip_serializing_if = "Option::is_none")]
    pub matching_hosts: Option<Vec<String>>,
    #[serde(alias = "mediaTypes", skip_serializing_if = "Option::is_none")]
    pub media_types: Option<Vec<String>>,
    #[serde(alias = "urlPatterns", skip_serializing_if = "Option::is_none")]
    pub url_patterns: Option<Vec<String>>,
    #[serde(alias = "requestFileExts", skip_serializing_if = "Option::is_none")]
    pub request_file_exts: Option<Vec<String>>,
}

impl RuleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a rule set from an update applied to empty rules.
    pub fn from_update(update: RuleUpdate) -> (Self, Vec<PatternError>) {
        let mut rules = Self::default();
        let rejected = rules.apply(update);
        (rules, rejected)
    }

    /// Apply a partial update.
    ///
    /// Patterns that fail to compile are left out of `url_patterns` and
    /// returned so the caller can report them; they never fail the update.
    pub fn apply(&mut self, update: RuleUpdate) -> Vec<PatternError> {
        if let Some(v) = update.blocked_hosts {
            self.blocked_hosts = v;
        }
        if let Some(v) = update.file_exts {
            self.file_exts = v;
        }
        if let Some(v) = update.media_exts {
            self.media_exts = v;
        }
        if let Some(v) = update.matching_hosts {
            self.matching_hosts = v;
        }
        if let Some(v) = update.media_types {
            self.media_types = v;
        }
        if let Some(v) = update.request_file_exts {
            self.request_file_exts = v;
        }
        match update.url_patterns {
            Some(raw) => {
                let (compiled, rejected) = compile_patterns(&raw);
                self.url_patterns = compiled;
                rejected
            }
            None => Vec::new(),
        }
    }
}
