//! Readiness evidence: do search results exist in this scope?
//!
//! Three independent signals are collected; any single positive one makes the
//! verdict positive. A false negative only costs a retry, never a lost
//! result, so the policy favors optimism.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::page::DomScope;

/// "총 N 건" style total-count phrase.
static COUNT_PAT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"총\s*\d+\s*건").unwrap());

/// Per-check verdict with the signals that produced it. Transient, never
/// persisted on its own (captures embed it for auditing).
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessEvidence {
    /// Marker selectors whose first match had non-empty text.
    pub matched_markers: Vec<String>,
    /// Search term appears literally in the visible body text.
    pub title_token_present: bool,
    /// A total-count phrase appears in the visible body text.
    pub count_pattern_present: bool,
    pub current_url: String,
    pub ok: bool,
}

/// Evaluate readiness of one scope. Selector lookup failures are swallowed
/// and read as "not found".
pub fn collect<S: DomScope + ?Sized>(
    scope: &S,
    search_term: &str,
    markers: &[String],
) -> ReadinessEvidence {
    let mut matched_markers = Vec::new();
    for sel in markers {
        if let Some(txt) = scope.first_match_text(sel) {
            if !txt.trim().is_empty() {
                matched_markers.push(sel.clone());
            }
        }
    }

    let body = scope.body_text().unwrap_or_default();
    let title_token_present = !search_term.is_empty() && body.contains(search_term);
    let count_pattern_present = COUNT_PAT.is_match(&body);

    let ok = !matched_markers.is_empty() || title_token_present || count_pattern_present;
    tracing::debug!(
        markers = matched_markers.len(),
        title_token_present,
        count_pattern_present,
        ok,
        "readiness check"
    );

    ReadinessEvidence {
        matched_markers,
        title_token_present,
        count_pattern_present,
        current_url: scope.url(),
        ok,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::testing::FakeScope;

    fn markers(sels: &[&str]) -> Vec<String> {
        sels.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn marker_with_text_is_positive() {
        let scope = FakeScope {
            markers: vec![(".searchList".into(), "숨결이 바람 될 때 외 3건".into())],
            ..FakeScope::default()
        };
        let ev = collect(&scope, "없는제목", &markers(&[".searchList", "#content"]));
        assert_eq!(ev.matched_markers, vec![".searchList"]);
        assert!(ev.ok);
    }

    #[test]
    fn marker_with_empty_text_does_not_count() {
        let scope = FakeScope {
            markers: vec![(".searchList".into(), "   ".into())],
            ..FakeScope::default()
        };
        let ev = collect(&scope, "제목", &markers(&[".searchList"]));
        assert!(ev.matched_markers.is_empty());
        assert!(!ev.ok);
    }

    #[test]
    fn title_token_alone_is_positive() {
        let scope = FakeScope {
            body: "검색어 '숨결이 바람 될 때' 에 대한 결과가 없습니다".into(),
            ..FakeScope::default()
        };
        let ev = collect(&scope, "숨결이 바람 될 때", &[]);
        assert!(ev.title_token_present);
        assert!(ev.ok);
    }

    #[test]
    fn count_phrase_alone_is_positive() {
        let scope = FakeScope {
            body: "검색결과 총 12 건".into(),
            ..FakeScope::default()
        };
        let ev = collect(&scope, "다른책", &[]);
        assert!(ev.count_pattern_present);
        assert!(ev.ok);
    }

    #[test]
    fn verdict_is_the_or_of_the_three_signals() {
        let scope = FakeScope::default();
        let ev = collect(&scope, "책", &markers(&[".searchList"]));
        assert!(ev.matched_markers.is_empty());
        assert!(!ev.title_token_present);
        assert!(!ev.count_pattern_present);
        assert!(!ev.ok);
    }
}
