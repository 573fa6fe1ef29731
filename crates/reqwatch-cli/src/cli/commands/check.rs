//! `reqwatch check` – run the rule chain against one URL and print the verdict.

use anyhow::{bail, Result};
use reqwatch_core::config::WatcherConfig;
use reqwatch_core::correlation;
use reqwatch_core::model::{Header, ResponseInfo, SendHeadersInfo, NO_TAB};
use reqwatch_core::rules::{evaluate, RuleConfig};

pub fn run_check(cfg: &WatcherConfig, url: &str, method: &str, headers: &[String]) -> Result<()> {
    println!("{}", check_verdict(cfg, url, method, headers)?);
    Ok(())
}

/// One-line verdict for a synthetic exchange: the pre-filter result, then
/// the rule that fired.
pub(crate) fn check_verdict(
    cfg: &WatcherConfig,
    url: &str,
    method: &str,
    headers: &[String],
) -> Result<String> {
    let (rules, rejected) = RuleConfig::from_update(cfg.rules.clone());
    for err in &rejected {
        tracing::warn!("{}", err);
    }

    let response_headers = headers
        .iter()
        .map(|h| parse_header(h))
        .collect::<Result<Vec<_>>>()?;

    let sent = SendHeadersInfo {
        request_id: "check".into(),
        method: method.to_string(),
        url: url.to_string(),
        tab_id: NO_TAB,
        extra_headers: vec![],
        request_headers: vec![],
    };
    if !correlation::admits(&sent, &rules.matching_hosts) {
        return Ok(format!("not tracked: {} requests need a matching host", method));
    }

    let res = ResponseInfo {
        request_id: sent.request_id,
        url: url.to_string(),
        response_headers,
    };
    Ok(match evaluate(&rules, &res) {
        Some(rule) => format!("match: {}", rule.as_str()),
        None => "no match".to_string(),
    })
}

/// Parse `Name: value`.
pub(crate) fn parse_header(raw: &str) -> Result<Header> {
    let Some((name, value)) = raw.split_once(':') else {
        bail!("invalid header {:?}: expected \"Name: value\"", raw);
    };
    let name = name.trim();
    if name.is_empty() {
        bail!("invalid header {:?}: empty name", raw);
    }
    Ok(Header::new(name, value.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_splits_on_first_colon() {
        let h = parse_header("Content-Disposition: attachment; filename=\"a:b.zip\"").unwrap();
        assert_eq!(h.name, "Content-Disposition");
        assert_eq!(h.value, "attachment; filename=\"a:b.zip\"");
    }

    fn cfg() -> WatcherConfig {
        let mut cfg = WatcherConfig::default();
        cfg.rules.matching_hosts = Some(vec!["videos.example.net".to_string()]);
        cfg
    }

    fn headers(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn non_get_to_unrelated_host_is_not_tracked() {
        let verdict = check_verdict(&cfg(), "https://api.example.com/a.mp4", "POST", &[]).unwrap();
        assert_eq!(verdict, "not tracked: POST requests need a matching host");
    }

    #[test]
    fn non_get_to_matching_host_is_evaluated() {
        let verdict =
            check_verdict(&cfg(), "https://videos.example.net/manifest", "POST", &[]).unwrap();
        assert_eq!(verdict, "match: matching-host");
    }

    #[test]
    fn verdict_names_the_rule_that_fired() {
        let cfg = cfg();
        assert_eq!(
            check_verdict(&cfg, "https://cdn.example.org/clip.mp4", "GET", &[]).unwrap(),
            "match: media-extension"
        );
        assert_eq!(
            check_verdict(
                &cfg,
                "https://cdn.example.org/get?id=1",
                "GET",
                &headers(&["Content-Type: audio/mpeg"])
            )
            .unwrap(),
            "match: media-type"
        );
        assert_eq!(
            check_verdict(
                &cfg,
                "https://cdn.example.org/get?id=2",
                "GET",
                &headers(&["Content-Disposition: attachment; filename=\"setup.exe\""])
            )
            .unwrap(),
            "match: content-disposition"
        );
        assert_eq!(
            check_verdict(&cfg, "https://example.org/index.html", "GET", &[]).unwrap(),
            "no match"
        );
    }

    #[test]
    fn blocked_host_reports_no_match() {
        let verdict =
            check_verdict(&cfg(), "https://dl.windowsupdate.com/patch.exe", "GET", &[]).unwrap();
        assert_eq!(verdict, "no match");
    }

    #[test]
    fn bad_header_fails_the_check() {
        assert!(check_verdict(&cfg(), "https://a.example/x", "GET", &headers(&["nocolon"])).is_err());
    }

    #[test]
    fn header_without_colon_is_rejected() {
        assert!(parse_header("Content-Type video/mp4").is_err());
        assert!(parse_header(": video/mp4").is_err());
    }
}
