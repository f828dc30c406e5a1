//! One search attempt, end to end: resolve the results scope, then snapshot
//! it. The driving agent has already navigated and typed the query; from here
//! on the engine only observes (plus at most one corrective resubmission).

use std::path::Path;

use crate::capture::{CaptureArtifact, CaptureWriter};
use crate::page::PageHandle;
use crate::resolve;
use crate::stability::StabilityBudget;

/// Resolve where the results for `search_term` live on `page` and write the
/// capture pair under `capture_root`. Infallible by design; the worst case is
/// a `home_fallback_no_results` capture of whatever the page showed.
pub fn capture_search_results<P: PageHandle>(
    page: &P,
    search_term: &str,
    place: &str,
    markers: &[String],
    budget: &StabilityBudget,
    capture_root: &Path,
) -> CaptureArtifact {
    tracing::info!(place, search_term, "capturing search results");
    let resolution = resolve::resolve(page, search_term, markers, budget);
    CaptureWriter::new(capture_root).write(page, &resolution, place)
}
