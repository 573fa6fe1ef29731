//! Ordered inclusion checks for a completed request/response pair.

use url::Url;

use super::RuleConfig;
use crate::model::ResponseInfo;

/// The accept rule that admitted a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    MediaExtension,
    RequestFileExtension,
    UrlPattern,
    MediaType,
    FileExtension,
    ContentDisposition,
    MatchingHost,
}

impl MatchRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchRule::MediaExtension => "media-extension",
            MatchRule::RequestFileExtension => "request-file-extension",
            MatchRule::UrlPattern => "url-pattern",
            MatchRule::MediaType => "media-type",
            MatchRule::FileExtension => "file-extension",
            MatchRule::ContentDisposition => "content-disposition",
            MatchRule::MatchingHost => "matching-host",
        }
    }
}

/// Run the rule chain against `res`.
///
/// A blocked host vetoes everything; after that the first accepting rule
/// wins, cheapest checks first and the broad host match last. `None` means
/// rejected. Unparseable URLs are rejected.
pub fn evaluate(rules: &RuleConfig, res: &ResponseInfo) -> Option<MatchRule> {
    let parsed = match Url::parse(&res.url) {
        Ok(u) => u,
        Err(e) => {
            tracing::debug!(url = %res.url, "unparseable response url: {}", e);
            return None;
        }
    };
    let host = authority_host(&parsed);

    if rules.blocked_hosts.iter().any(|h| host.contains(h.as_str())) {
        return None;
    }

    let upath = parsed.path().to_uppercase();
    if rules.media_exts.iter().any(|e| upath.ends_with(e.as_str())) {
        return Some(MatchRule::MediaExtension);
    }

    if rules.request_file_exts.iter().any(|e| upath.ends_with(e.as_str())) {
        return Some(MatchRule::RequestFileExtension);
    }

    if rules.url_patterns.iter().any(|re| re.is_match(&res.url)) {
        return Some(MatchRule::UrlPattern);
    }

    if let Some(content_type) = res.header("Content-Type") {
        if rules.media_types.iter().any(|m| content_type.contains(m.as_str())) {
            return Some(MatchRule::MediaType);
        }
    }

    if rules
        .file_exts
        .iter()
        .any(|ext| upath.ends_with(&dotted_upper(ext)))
    {
        return Some(MatchRule::FileExtension);
    }

    if let Some(disposition) = res.header("Content-Disposition") {
        let upper = disposition.to_uppercase();
        if rules
            .file_exts
            .iter()
            .any(|ext| upper.contains(&dotted_upper(ext)))
        {
            return Some(MatchRule::ContentDisposition);
        }
    }

    if rules.matching_hosts.iter().any(|h| host.contains(h.as_str())) {
        return Some(MatchRule::MatchingHost);
    }

    None
}

/// Boolean view of [`evaluate`].
pub fn is_matching(rules: &RuleConfig, res: &ResponseInfo) -> bool {
    evaluate(rules, res).is_some()
}

/// Host as it appears in the URL authority: `host[:port]`, port only when
/// it differs from the scheme default.
fn authority_host(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

fn dotted_upper(ext: &str) -> String {
    format!(".{}", ext.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Header;
    use crate::rules::RuleUpdate;

    fn strings(v: &[&str]) -> Option<Vec<String>> {
        Some(v.iter().map(|s| s.to_string()).collect())
    }

    fn rules(update: RuleUpdate) -> RuleConfig {
        RuleConfig::from_update(update).0
    }

    fn res(url: &str, headers: &[(&str, &str)]) -> ResponseInfo {
        ResponseInfo {
            request_id: "1".into(),
            url: url.to_string(),
            response_headers: headers.iter().map(|(n, v)| Header::new(*n, *v)).collect(),
        }
    }

    #[test]
    fn blocked_host_vetoes_media_extension() {
        let r = rules(RuleUpdate {
            blocked_hosts: strings(&["ads.example.com"]),
            media_exts: strings(&[".MP4"]),
            ..Default::default()
        });
        assert_eq!(evaluate(&r, &res("https://cdn.ads.example.com/video.mp4", &[])), None);
        assert_eq!(
            evaluate(&r, &res("https://cdn.example.org/video.mp4", &[])),
            Some(MatchRule::MediaExtension)
        );
    }

    #[test]
    fn media_extension_ignores_query_string() {
        let r = rules(RuleUpdate {
            media_exts: strings(&[".M3U8"]),
            ..Default::default()
        });
        assert!(is_matching(&r, &res("https://s.example.com/live/index.m3u8?token=abc", &[])));
        assert!(!is_matching(&r, &res("https://s.example.com/page?f=index.m3u8", &[])));
    }

    #[test]
    fn request_file_extension_rule() {
        let r = rules(RuleUpdate {
            request_file_exts: strings(&[".TS"]),
            ..Default::default()
        });
        assert_eq!(
            evaluate(&r, &res("https://s.example.com/seg-001.ts", &[])),
            Some(MatchRule::RequestFileExtension)
        );
    }

    #[test]
    fn url_pattern_searches_full_url() {
        let r = rules(RuleUpdate {
            url_patterns: strings(&["videoplayback.*itag="]),
            ..Default::default()
        });
        assert_eq!(
            evaluate(&r, &res("https://r3.example.com/VideoPlayback?id=9&itag=22", &[])),
            Some(MatchRule::UrlPattern)
        );
    }

    #[test]
    fn malformed_pattern_never_matches() {
        let r = rules(RuleUpdate {
            url_patterns: strings(&["videoplayback("]),
            ..Default::default()
        });
        assert!(r.url_patterns.is_empty());
        assert!(!is_matching(&r, &res("https://r3.example.com/videoplayback(", &[])));
    }

    #[test]
    fn media_type_matches_without_extension() {
        let r = rules(RuleUpdate {
            media_types: strings(&["video/"]),
            ..Default::default()
        });
        let response = res(
            "https://stream.example.com/get?id=42",
            &[("content-type", "video/mp4; charset=binary")],
        );
        assert_eq!(evaluate(&r, &response), Some(MatchRule::MediaType));
    }

    #[test]
    fn media_type_value_match_is_case_sensitive() {
        let r = rules(RuleUpdate {
            media_types: strings(&["video/"]),
            ..Default::default()
        });
        let response = res("https://stream.example.com/get", &[("Content-Type", "VIDEO/MP4")]);
        assert!(!is_matching(&r, &response));
    }

    #[test]
    fn file_extension_on_path() {
        let r = rules(RuleUpdate {
            file_exts: strings(&["zip"]),
            ..Default::default()
        });
        assert_eq!(
            evaluate(&r, &res("https://dl.example.com/pkg/archive.ZIP", &[])),
            Some(MatchRule::FileExtension)
        );
        assert!(!is_matching(&r, &res("https://dl.example.com/pkg/archivezip", &[])));
    }

    #[test]
    fn content_disposition_extension_ignores_case() {
        let r = rules(RuleUpdate {
            file_exts: strings(&["zip"]),
            ..Default::default()
        });
        let response = res(
            "https://dl.example.com/download?id=7",
            &[("Content-Disposition", "attachment; filename=\"data.ZIP\"")],
        );
        assert_eq!(evaluate(&r, &response), Some(MatchRule::ContentDisposition));
    }

    #[test]
    fn matching_host_is_last_resort() {
        let r = rules(RuleUpdate {
            matching_hosts: strings(&["googlevideo.com"]),
            media_types: strings(&["video/"]),
            ..Default::default()
        });
        assert_eq!(
            evaluate(&r, &res("https://r1.googlevideo.com/x", &[])),
            Some(MatchRule::MatchingHost)
        );
        assert_eq!(
            evaluate(
                &r,
                &res("https://r1.googlevideo.com/x", &[("Content-Type", "video/webm")])
            ),
            Some(MatchRule::MediaType)
        );
    }

    #[test]
    fn host_includes_non_default_port() {
        let r = rules(RuleUpdate {
            blocked_hosts: strings(&["example.com:8443"]),
            media_exts: strings(&[".MP4"]),
            ..Default::default()
        });
        assert!(!is_matching(&r, &res("https://example.com:8443/a.mp4", &[])));
        assert!(is_matching(&r, &res("https://example.com:443/a.mp4", &[])));
    }

    #[test]
    fn nothing_configured_rejects() {
        let r = RuleConfig::new();
        assert!(!is_matching(&r, &res("https://example.com/a.mp4", &[])));
        assert!(!is_matching(&r, &res("not a url", &[])));
    }
}
