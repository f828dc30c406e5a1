//! Capture writer: persist the resolved scope as sibling `.html`/`.txt`
//! snapshots under a dated directory.
//!
//! The base name `{place}_{unix_ts}_{tag}` makes the outcome observable from
//! the filename alone, so a directory listing doubles as an audit log.
//! Writing never fails the pipeline: losing one snapshot body must not abort
//! capture-then-extract.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::evidence::ReadinessEvidence;
use crate::page::{DomScope, PageHandle, ScopeKind};
use crate::resolve::Resolution;

const PLACEHOLDER_MARKUP: &str = "<html><!-- failed to capture markup --></html>";
const FRAME_TEXT_SEPARATOR: &str = "\n\n---- frame ----\n\n";

/// Filename tag describing how the capture ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeTag {
    Results,
    ResultsInIframe,
    HomeFallbackNoResults,
}

impl OutcomeTag {
    pub fn as_str(self) -> &'static str {
        match self {
            OutcomeTag::Results => "results",
            OutcomeTag::ResultsInIframe => "results_in_iframe",
            OutcomeTag::HomeFallbackNoResults => "home_fallback_no_results",
        }
    }

    fn from_resolution(resolution: &Resolution) -> Self {
        match (&resolution.scope, &resolution.evidence) {
            (_, None) => OutcomeTag::HomeFallbackNoResults,
            (ScopeKind::Iframe(_), Some(_)) => OutcomeTag::ResultsInIframe,
            (_, Some(_)) => OutcomeTag::Results,
        }
    }
}

/// One captured scope. Immutable once returned; later runs supersede rather
/// than overwrite because the path embeds a timestamp.
#[derive(Debug, Clone)]
pub struct CaptureArtifact {
    pub scope: ScopeKind,
    pub tag: OutcomeTag,
    pub markup: String,
    pub text: String,
    pub html_path: PathBuf,
    pub text_path: PathBuf,
    pub evidence: Option<ReadinessEvidence>,
    pub place: String,
    pub captured_at: DateTime<Utc>,
}

pub struct CaptureWriter {
    root: PathBuf,
}

impl CaptureWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Snapshot the resolved scope. Always returns an artifact; storage
    /// failures are logged and substituted with placeholders.
    pub fn write<P: PageHandle>(
        &self,
        page: &P,
        resolution: &Resolution,
        place: &str,
    ) -> CaptureArtifact {
        let captured_at = Utc::now();
        let tag = OutcomeTag::from_resolution(resolution);

        let frames = page.frames();
        let scope: &dyn DomScope = match resolution.scope {
            ScopeKind::Iframe(idx) => frames.get(idx).copied().unwrap_or(page),
            _ => page,
        };

        let markup = scope
            .markup()
            .unwrap_or_else(|| PLACEHOLDER_MARKUP.to_string());
        let text = capture_text(page, scope, resolution);

        let dir = self.root.join(captured_at.format("%Y-%m-%d").to_string());
        let base = format!("{}_{}_{}", place, captured_at.timestamp(), tag.as_str());
        let html_path = dir.join(format!("{base}.html"));
        let text_path = dir.join(format!("{base}.txt"));

        persist(&html_path, &markup);
        persist(&text_path, &text);
        tracing::info!(
            path = %html_path.display(),
            tag = tag.as_str(),
            bytes = markup.len(),
            "capture written"
        );

        CaptureArtifact {
            scope: resolution.scope,
            tag,
            markup,
            text,
            html_path,
            text_path,
            evidence: resolution.evidence.clone(),
            place: place.to_string(),
            captured_at,
        }
    }
}

/// Text precedence: first matched marker's text, then the scope's body text,
/// then a shadow-tree walk, then (main document only) an aggregate of all
/// child frames. The text artifact is left empty only when no readable text
/// exists anywhere in the page.
fn capture_text<P: PageHandle>(page: &P, scope: &dyn DomScope, resolution: &Resolution) -> String {
    let marker_text = resolution
        .evidence
        .as_ref()
        .and_then(|ev| ev.matched_markers.first())
        .and_then(|sel| scope.first_match_text(sel))
        .filter(|t| !t.trim().is_empty());

    marker_text
        .or_else(|| scope.body_text().filter(|t| !t.trim().is_empty()))
        .or_else(|| scope.shadow_text().filter(|t| !t.trim().is_empty()))
        .or_else(|| {
            if matches!(resolution.scope, ScopeKind::MainDocument) {
                aggregate_frame_text(page)
            } else {
                None
            }
        })
        .unwrap_or_default()
}

fn aggregate_frame_text<P: PageHandle>(page: &P) -> Option<String> {
    let chunks: Vec<String> = page
        .frames()
        .into_iter()
        .filter_map(|f| f.shadow_text().or_else(|| f.body_text()))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    if chunks.is_empty() {
        None
    } else {
        Some(chunks.join(FRAME_TEXT_SEPARATOR))
    }
}

fn persist(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            tracing::warn!(path = %path.display(), error = %e, "capture dir not created");
            return;
        }
    }
    if let Err(e) = fs::write(path, content) {
        tracing::warn!(path = %path.display(), error = %e, "capture not written");
    }
}
