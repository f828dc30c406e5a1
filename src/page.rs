//! Boundary traits for the external browser-automation collaborator.
//!
//! The driving agent owns navigation, typing and clicking on a live browser.
//! This crate only *reads* through these traits while judging readiness and
//! capturing snapshots. The single exception is [`PageHandle::press_submit`],
//! the one corrective resubmission the scope resolver is allowed to perform.

use serde::Serialize;

/// Which DOM context a verdict or capture refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScopeKind {
    MainDocument,
    /// Child frame, by document-order index.
    Iframe(usize),
    /// Text aggregated across shadow roots; no single markup tree.
    ShadowAggregate,
}

/// Read-only view of one traversable DOM context: the main document, a single
/// iframe, or a shadow-tree text view.
pub trait DomScope {
    /// Trimmed inner text of the first element matching `selector`.
    ///
    /// Lookup failures (invalid selector, detached scope) read as "not
    /// found"; they are never fatal.
    fn first_match_text(&self, selector: &str) -> Option<String>;

    /// Visible body text of the scope.
    fn body_text(&self) -> Option<String>;

    /// Serialized markup of the scope at this moment.
    fn markup(&self) -> Option<String>;

    /// Visible text including shadow roots (a JS tree walk on real pages).
    fn shadow_text(&self) -> Option<String>;

    /// Current URL of the scope.
    fn url(&self) -> String;
}

/// A live page: the main-document scope plus frame enumeration and the small
/// set of waits the engine is allowed to issue.
pub trait PageHandle: DomScope {
    /// Child frames in document order, main frame excluded.
    fn frames(&self) -> Vec<&dyn DomScope>;

    /// Cooperative sleep owned by the page's event loop.
    fn wait_for_timeout(&self, ms: u64);

    /// Best-effort wait for the network to go quiet. Returns `false` on
    /// timeout; callers treat that as a fact, not a failure.
    fn wait_for_network_idle(&self, timeout_ms: u64) -> bool;

    /// Re-trigger the default submit action once (e.g. press Enter in the
    /// search box). Returns `false` if the page refused.
    fn press_submit(&self) -> bool;
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory page fakes shared by the readiness/capture tests.

    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;

    use super::{DomScope, PageHandle};

    #[derive(Debug, Clone, Default)]
    pub(crate) struct FakeScope {
        /// selector -> inner text of its first match
        pub markers: Vec<(String, String)>,
        pub body: String,
        pub markup: String,
        pub shadow: String,
        pub url: String,
    }

    impl DomScope for FakeScope {
        fn first_match_text(&self, selector: &str) -> Option<String> {
            self.markers
                .iter()
                .find(|(sel, _)| sel == selector)
                .map(|(_, txt)| txt.clone())
        }

        fn body_text(&self) -> Option<String> {
            (!self.body.is_empty()).then(|| self.body.clone())
        }

        fn markup(&self) -> Option<String> {
            (!self.markup.is_empty()).then(|| self.markup.clone())
        }

        fn shadow_text(&self) -> Option<String> {
            (!self.shadow.is_empty()).then(|| self.shadow.clone())
        }

        fn url(&self) -> String {
            self.url.clone()
        }
    }

    #[derive(Debug, Default)]
    pub(crate) struct FakePage {
        pub main: RefCell<FakeScope>,
        pub frames: Vec<FakeScope>,
        /// When non-empty, successive `markup()` calls report these sizes
        /// (last value repeats), driving the stability waiter.
        pub markup_sizes: RefCell<VecDeque<usize>>,
        /// Scope swapped into `main` when `press_submit` fires.
        pub after_submit: RefCell<Option<FakeScope>>,
        /// URL applied to `main` on the first `wait_for_timeout`, simulating
        /// navigation that completes while the engine is waiting.
        pub url_after_wait: RefCell<Option<String>>,
        pub submits: Cell<usize>,
        pub waited_ms: Cell<u64>,
    }

    impl FakePage {
        pub(crate) fn with_main(main: FakeScope) -> Self {
            Self {
                main: RefCell::new(main),
                ..Self::default()
            }
        }
    }

    impl DomScope for FakePage {
        fn first_match_text(&self, selector: &str) -> Option<String> {
            self.main.borrow().first_match_text(selector)
        }

        fn body_text(&self) -> Option<String> {
            self.main.borrow().body_text()
        }

        fn markup(&self) -> Option<String> {
            let mut sizes = self.markup_sizes.borrow_mut();
            let next = if sizes.len() > 1 {
                sizes.pop_front()
            } else {
                sizes.front().copied()
            };
            match next {
                Some(n) => Some("x".repeat(n)),
                None => self.main.borrow().markup(),
            }
        }

        fn shadow_text(&self) -> Option<String> {
            self.main.borrow().shadow_text()
        }

        fn url(&self) -> String {
            self.main.borrow().url()
        }
    }

    impl PageHandle for FakePage {
        fn frames(&self) -> Vec<&dyn DomScope> {
            self.frames.iter().map(|f| f as &dyn DomScope).collect()
        }

        fn wait_for_timeout(&self, ms: u64) {
            self.waited_ms.set(self.waited_ms.get() + ms);
            if let Some(url) = self.url_after_wait.borrow_mut().take() {
                self.main.borrow_mut().url = url;
            }
        }

        fn wait_for_network_idle(&self, _timeout_ms: u64) -> bool {
            false
        }

        fn press_submit(&self) -> bool {
            self.submits.set(self.submits.get() + 1);
            if let Some(next) = self.after_submit.borrow_mut().take() {
                *self.main.borrow_mut() = next;
            }
            true
        }
    }
}
