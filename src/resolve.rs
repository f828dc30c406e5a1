//! Scope resolver: decide *where* the search results live.
//!
//! Strategy order: main document (with one stability wait and at most one
//! corrective resubmission), then each iframe in document order, then a
//! best-effort fallback to the main document. Every search attempt therefore
//! always yields a capturable scope; there is no hard-stop path.

use crate::evidence::{self, ReadinessEvidence};
use crate::page::{PageHandle, ScopeKind};
use crate::stability::{wait_until_stable, StabilityBudget};

/// Outcome of scope resolution. `evidence` is `None` only on the best-effort
/// fallback, which downstream tags as a no-results capture.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub scope: ScopeKind,
    pub evidence: Option<ReadinessEvidence>,
}

pub fn resolve<P: PageHandle>(
    page: &P,
    search_term: &str,
    markers: &[String],
    budget: &StabilityBudget,
) -> Resolution {
    let url_at_submit = page.url();

    // Main document: check immediately, then once more after the DOM settles.
    let mut ev = evidence::collect(page, search_term, markers);
    if !ev.ok {
        wait_until_stable(page, budget);
        ev = evidence::collect(page, search_term, markers);
    }

    // One corrective action: if the URL never changed, the submission may not
    // have fired; press the default submit once and re-check.
    if !ev.ok && page.url() == url_at_submit {
        tracing::info!("url unchanged since submission, resubmitting once");
        if page.press_submit() {
            wait_until_stable(page, budget);
            ev = evidence::collect(page, search_term, markers);
        }
    }

    if ev.ok {
        return Resolution {
            scope: ScopeKind::MainDocument,
            evidence: Some(ev),
        };
    }

    // Frames, document order, first positive wins.
    for (idx, frame) in page.frames().into_iter().enumerate() {
        let fev = evidence::collect(frame, search_term, markers);
        if fev.ok {
            tracing::info!(frame = idx, "results found inside iframe");
            return Resolution {
                scope: ScopeKind::Iframe(idx),
                evidence: Some(fev),
            };
        }
    }

    // Best effort: capture the main document anyway and let extraction find
    // zero or partial records.
    tracing::warn!("no scope looked ready, falling back to main document");
    Resolution {
        scope: ScopeKind::MainDocument,
        evidence: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::testing::{FakePage, FakeScope};

    fn markers(sels: &[&str]) -> Vec<String> {
        sels.iter().map(|s| s.to_string()).collect()
    }

    fn quick_budget() -> StabilityBudget {
        StabilityBudget {
            max_wait_ms: 400,
            quiet_period_ms: 100,
            poll_ms: 100,
        }
    }

    #[test]
    fn ready_main_document_wins_without_retry() {
        let page = FakePage::with_main(FakeScope {
            markers: vec![(".searchList".into(), "총 3 건".into())],
            url: "https://lib.example/search".into(),
            ..FakeScope::default()
        });
        let res = resolve(&page, "책A", &markers(&[".searchList"]), &quick_budget());
        assert_eq!(res.scope, ScopeKind::MainDocument);
        assert!(res.evidence.is_some());
        assert_eq!(page.submits.get(), 0);
    }

    #[test]
    fn resubmits_once_when_url_is_stuck() {
        let page = FakePage::with_main(FakeScope {
            url: "https://lib.example/home".into(),
            ..FakeScope::default()
        });
        *page.after_submit.borrow_mut() = Some(FakeScope {
            body: "검색결과 총 1 건".into(),
            url: "https://lib.example/home".into(),
            ..FakeScope::default()
        });
        let res = resolve(&page, "책A", &[], &quick_budget());
        assert_eq!(page.submits.get(), 1);
        assert_eq!(res.scope, ScopeKind::MainDocument);
        assert!(res.evidence.unwrap().count_pattern_present);
    }

    #[test]
    fn resubmission_skipped_when_url_moved() {
        // Navigation completes during the stability wait. The submission
        // clearly fired, so the corrective retry must not press again even
        // though nothing looks ready yet.
        let page = FakePage::with_main(FakeScope {
            url: "https://lib.example/home".into(),
            ..FakeScope::default()
        });
        *page.url_after_wait.borrow_mut() = Some("https://lib.example/results".into());
        let res = resolve(&page, "책A", &[], &quick_budget());
        assert_eq!(page.submits.get(), 0);
        assert!(res.evidence.is_none());
    }

    #[test]
    fn first_positive_iframe_wins() {
        let page = FakePage {
            frames: vec![
                FakeScope::default(),
                FakeScope {
                    body: "숨결이 바람 될 때".into(),
                    ..FakeScope::default()
                },
            ],
            ..FakePage::default()
        };
        let res = resolve(&page, "숨결이 바람 될 때", &[], &quick_budget());
        assert_eq!(res.scope, ScopeKind::Iframe(1));
        assert!(res.evidence.unwrap().title_token_present);
    }

    #[test]
    fn falls_back_to_main_document_with_absent_evidence() {
        let page = FakePage {
            frames: vec![FakeScope::default()],
            ..FakePage::default()
        };
        let res = resolve(&page, "책A", &markers(&[".searchList"]), &quick_budget());
        assert_eq!(res.scope, ScopeKind::MainDocument);
        assert!(res.evidence.is_none());
        // Exactly one corrective resubmission, never more.
        assert_eq!(page.submits.get(), 1);
    }
}
