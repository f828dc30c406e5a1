//! Record assembly and deduplication.
//!
//! One `BookRecord` per item block, defaults filled so consumers never branch
//! on field absence. Dedup key is `(title, library)`: the same edition held
//! by two branches is two real results, the same block rendered twice is not.

use chrono::{DateTime, Utc};
use scraper::ElementRef;
use serde::Serialize;

use crate::extract::fields::{self, StatusRules};

pub const EXTRACTOR_VERSION: &str = "dom-rs/1.0";

/// Availability is defined by this exact phrase in the raw status.
const AVAILABLE_KEYWORD: &str = "대출가능";

/// Provenance carried by every record.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMeta {
    /// Capture file stem this record was parsed from.
    pub source_capture: String,
    pub place: String,
    /// 1-based result-page index within a multi-page run.
    pub page: u32,
    pub captured_at: DateTime<Utc>,
    pub extractor_version: &'static str,
}

impl RecordMeta {
    pub fn new(source_capture: impl Into<String>, place: impl Into<String>, page: u32, captured_at: DateTime<Utc>) -> Self {
        Self {
            source_capture: source_capture.into(),
            place: place.into(),
            page,
            captured_at,
            extractor_version: EXTRACTOR_VERSION,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRecord {
    pub title: String,
    pub library: Option<String>,
    pub status_raw: Option<String>,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reserve_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    pub meta: RecordMeta,
}

/// Build records from located item blocks. Blocks without an extractable
/// title are noise (pagination rows, ads) and are dropped silently.
pub fn assemble(
    blocks: &[ElementRef],
    meta: &RecordMeta,
    rules: &StatusRules,
    base_url: Option<&str>,
) -> Vec<BookRecord> {
    blocks
        .iter()
        .filter_map(|block| {
            let title = fields::title(block)?;
            if title.is_empty() {
                return None;
            }
            let text = fields::flat_text(block);
            let status_raw = fields::status(block, rules);
            let available = status_raw
                .as_deref()
                .is_some_and(|s| s.contains(AVAILABLE_KEYWORD));
            Some(BookRecord {
                title,
                library: fields::library(block),
                status_raw,
                available,
                room: fields::room(&text),
                call_number: fields::call_number(&text),
                year: fields::year(&text),
                publisher: fields::publisher(block),
                reserve_count: fields::reserve_count(&text),
                due_date: fields::due_date(&text),
                cover_image: fields::cover_image(block, base_url),
                meta: meta.clone(),
            })
        })
        .collect()
}

/// Drop later records sharing a `(title, library)` key with an earlier one.
/// Returns the survivors and the drop count.
pub fn dedupe(records: Vec<BookRecord>) -> (Vec<BookRecord>, usize) {
    let mut seen: Vec<(String, Option<String>)> = Vec::new();
    let mut unique = Vec::new();
    let mut dropped = 0usize;
    for rec in records {
        let key = (rec.title.clone(), rec.library.clone());
        if seen.contains(&key) {
            dropped += 1;
            continue;
        }
        seen.push(key);
        unique.push(rec);
    }
    if dropped > 0 {
        tracing::debug!(dropped, "duplicate records removed");
    }
    (unique, dropped)
}
