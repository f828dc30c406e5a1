//! Heuristic record extraction over captured result pages.
//!
//! Parsing is pure and offline: it reads capture files the session engine
//! wrote earlier, never a live page. A page that parses to zero records is a
//! soft outcome reported through [`ParseOutcome`], not an error; only missing
//! or unreadable input files fail hard.

pub mod blocks;
pub mod fields;

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use scraper::Html;
use serde::Serialize;

use crate::error::EngineError;
use crate::extract::fields::StatusRules;
use crate::record::{self, BookRecord, RecordMeta};

/// Result of parsing one or more captured pages. `ok` mirrors `count > 0`.
#[derive(Debug, Serialize)]
pub struct ParseOutcome {
    pub ok: bool,
    pub error: Option<String>,
    pub count: usize,
    pub items: Vec<BookRecord>,
    pub dropped_duplicates: usize,
}

/// Parse one markup string into records. Pure and idempotent; parsing the
/// same markup twice yields identical records.
pub fn parse_markup(
    html: &str,
    meta: &RecordMeta,
    rules: &StatusRules,
    base_url: Option<&str>,
) -> Vec<BookRecord> {
    let doc = Html::parse_document(html);
    let located = blocks::locate(&doc);
    record::assemble(&located, meta, rules, base_url)
}

/// Parse one capture file. The record's `captured_at` comes from the file's
/// modification time, which for capture files equals the capture moment.
pub fn parse_file(path: &Path, place: &str, page: u32) -> Result<Vec<BookRecord>, EngineError> {
    if !path.exists() {
        return Err(EngineError::CaptureNotFound(path.to_path_buf()));
    }
    let html = fs::read_to_string(path).map_err(|source| EngineError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let captured_at = fs::metadata(path)
        .and_then(|m| m.modified())
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now());
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let meta = RecordMeta::new(stem, place, page, captured_at);

    let records = parse_markup(&html, &meta, &StatusRules::default(), None);
    tracing::debug!(path = %path.display(), count = records.len(), "capture parsed");
    Ok(records)
}

/// Parse a multi-page run. Pages are numbered from 1 in argument order; a
/// page that fails to read is reported in `error` as `[Page N] ...` while the
/// remaining pages still contribute records. Duplicates across pages are
/// removed after the merge.
pub fn parse_files(paths: &[impl AsRef<Path>], place: &str) -> Result<ParseOutcome, EngineError> {
    if paths.is_empty() {
        return Err(EngineError::MissingCapturePath);
    }

    let mut merged = Vec::new();
    let mut errors = Vec::new();
    for (idx, path) in paths.iter().enumerate() {
        let page = (idx + 1) as u32;
        match parse_file(path.as_ref(), place, page) {
            Ok(records) => merged.extend(records),
            Err(e) => errors.push(format!("[Page {page}] {e}")),
        }
    }

    let (items, dropped_duplicates) = record::dedupe(merged);
    let count = items.len();
    let error = if !errors.is_empty() {
        Some(errors.join(" | "))
    } else if count == 0 {
        Some("no item blocks parsed".to_string())
    } else {
        None
    };

    Ok(ParseOutcome {
        ok: count > 0,
        error,
        count,
        items,
        dropped_duplicates,
    })
}

/// Compact payload view written to JSON consumers.
#[derive(Serialize)]
struct OutcomePayload<'a> {
    ok: bool,
    error: &'a Option<String>,
    count: usize,
    items: &'a [BookRecord],
}

fn write_json(outcome: &ParseOutcome, path: &Path) -> Result<(), String> {
    let payload = OutcomePayload {
        ok: outcome.ok,
        error: &outcome.error,
        count: outcome.count,
        items: &outcome.items,
    };
    let body = serde_json::to_string_pretty(&payload).map_err(|e| e.to_string())?;
    fs::write(path, body).map_err(|e| e.to_string())
}

fn write_jsonl(outcome: &ParseOutcome, path: &Path) -> Result<(), String> {
    let mut body = String::new();
    for rec in &outcome.items {
        body.push_str(&serde_json::to_string(rec).map_err(|e| e.to_string())?);
        body.push('\n');
    }
    fs::write(path, body).map_err(|e| e.to_string())
}

/// Write the requested output files. The outcome is already decided when
/// this runs, so storage failures are appended to `error` rather than
/// overturning `ok`.
pub fn persist(outcome: &mut ParseOutcome, out_json: Option<&Path>, out_jsonl: Option<&Path>) {
    let mut failures = Vec::new();
    if let Some(path) = out_json {
        if let Err(e) = write_json(outcome, path) {
            failures.push(format!("json write failed ({}): {e}", path.display()));
        } else {
            tracing::info!(path = %path.display(), "json written");
        }
    }
    if let Some(path) = out_jsonl {
        if let Err(e) = write_jsonl(outcome, path) {
            failures.push(format!("jsonl write failed ({}): {e}", path.display()));
        } else {
            tracing::info!(path = %path.display(), "jsonl written");
        }
    }
    if !failures.is_empty() {
        let appended = failures.join(" | ");
        outcome.error = Some(match outcome.error.take() {
            Some(prev) => format!("{prev} | {appended}"),
            None => appended,
        });
    }
}
