//! URL pattern compilation.

use regex::{Regex, RegexBuilder};
use thiserror::Error;

/// A URL pattern that did not compile and was left out of the rule set.
#[derive(Debug, Error)]
#[error("invalid url pattern {pattern:?}: {source}")]
pub struct PatternError {
    pub pattern: String,
    #[source]
    pub source: regex::Error,
}

/// Compile `raw` case-insensitively, keeping configured order.
///
/// Patterns that fail to compile are skipped; they are returned alongside the
/// compiled list instead of failing the whole set.
pub fn compile_patterns(raw: &[String]) -> (Vec<Regex>, Vec<PatternError>) {
    let mut compiled = Vec::with_capacity(raw.len());
    let mut rejected = Vec::new();
    for pattern in raw {
        match RegexBuilder::new(pattern).case_insensitive(true).build() {
            Ok(re) => compiled.push(re),
            Err(source) => rejected.push(PatternError {
                pattern: pattern.clone(),
                source,
            }),
        }
    }
    (compiled, rejected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patterns_are_case_insensitive() {
        let (compiled, rejected) = compile_patterns(&["/VIDEOPLAYBACK".to_string()]);
        assert!(rejected.is_empty());
        assert!(compiled[0].is_match("https://r1.example.com/videoplayback?id=1"));
    }

    #[test]
    fn unsupported_syntax_is_rejected_not_fatal() {
        let raw = vec![r"(?<=/)media".to_string(), "[a-".to_string(), "ok".to_string()];
        let (compiled, rejected) = compile_patterns(&raw);
        assert_eq!(compiled.len(), 1);
        assert_eq!(rejected.len(), 2);
        assert!(rejected[1].to_string().contains("[a-"));
    }
}
