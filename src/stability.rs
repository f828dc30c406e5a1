//! DOM stability waiter.
//!
//! Markup size is a robust stability proxy: it needs no result-specific
//! selectors, so it works on brand-new, unconfigured catalog sites. The page
//! is considered settled once its serialized size has stopped growing for a
//! quiet period. Timing out is a soft outcome; callers proceed with whatever
//! has rendered.

use crate::page::PageHandle;

/// Growth below this many bytes is treated as noise, not a change.
const GROWTH_NOISE_BYTES: usize = 50;

#[derive(Debug, Clone)]
pub struct StabilityBudget {
    pub max_wait_ms: u64,
    pub quiet_period_ms: u64,
    pub poll_ms: u64,
}

impl Default for StabilityBudget {
    fn default() -> Self {
        Self {
            max_wait_ms: 20_000,
            quiet_period_ms: 1_200,
            poll_ms: 200,
        }
    }
}

/// Poll the page's markup size until it stops growing for the quiet period.
///
/// Returns `false` if `max_wait_ms` elapses first. Elapsed time is accounted
/// in poll increments, so the loop is deterministic under test fakes. Network
/// idle is awaited opportunistically between polls; its failures are ignored.
pub fn wait_until_stable<P: PageHandle>(page: &P, budget: &StabilityBudget) -> bool {
    let poll = budget.poll_ms.max(1);
    let mut waited = 0u64;
    let mut quiet = 0u64;
    let mut last_len: Option<usize> = None;

    while waited < budget.max_wait_ms {
        let cur = page.markup().map(|m| m.len()).unwrap_or(0);
        match last_len {
            Some(prev) if cur > prev + GROWTH_NOISE_BYTES => {
                last_len = Some(cur);
                quiet = 0;
            }
            None => last_len = Some(cur),
            _ => {}
        }

        if quiet >= budget.quiet_period_ms {
            tracing::debug!(size = cur, waited_ms = waited, "dom settled");
            return true;
        }

        page.wait_for_network_idle(poll);
        page.wait_for_timeout(poll);
        waited += poll;
        quiet += poll;
    }

    tracing::debug!(waited_ms = waited, "dom did not settle within budget");
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::testing::FakePage;

    fn page_with_sizes(sizes: &[usize]) -> FakePage {
        let page = FakePage::default();
        page.markup_sizes.borrow_mut().extend(sizes.iter().copied());
        page
    }

    fn budget(max: u64, quiet: u64, poll: u64) -> StabilityBudget {
        StabilityBudget {
            max_wait_ms: max,
            quiet_period_ms: quiet,
            poll_ms: poll,
        }
    }

    #[test]
    fn settles_once_plateau_lasts_quiet_period() {
        // Growth at the third sample resets the quiet clock; the 260-plateau
        // then holds for two polls, which covers the quiet period.
        let page = page_with_sizes(&[100, 100, 260, 260, 260]);
        assert!(wait_until_stable(&page, &budget(2_000, 400, 200)));
    }

    #[test]
    fn times_out_when_budget_is_shorter_than_plateau() {
        let page = page_with_sizes(&[100, 100, 260, 260, 260]);
        assert!(!wait_until_stable(&page, &budget(800, 400, 200)));
    }

    #[test]
    fn small_growth_is_noise() {
        // +40 bytes is below the noise threshold, so the first plateau holds.
        let page = page_with_sizes(&[100, 140, 140]);
        assert!(wait_until_stable(&page, &budget(2_000, 400, 200)));
        // Only two polls were needed.
        assert_eq!(page.waited_ms.get(), 400);
    }

    #[test]
    fn unreadable_markup_counts_as_empty_and_settles() {
        let page = FakePage::default();
        assert!(wait_until_stable(&page, &budget(1_000, 200, 100)));
    }
}
