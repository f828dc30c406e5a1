//! Per-field extractors for one item block.
//!
//! Korean catalog markup is wildly inconsistent across vendors, so each field
//! is recovered by its own small cascade: preferred selectors first, then
//! pattern matching over the block's visible text. Every extractor is total
//! over arbitrary HTML and returns `None` rather than guessing wrongly.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Selector};
use url::Url;

/// Loan-status phrases, most informative first. `대출가능` leads so that a
/// block showing both availability and a restriction reads as available.
pub const STATUS_KEYWORDS: &[&str] = &[
    "대출가능",
    "대출중",
    "대출 불가",
    "대출불가",
    "예약가능",
    "예약불가",
    "예약 중",
    "예약중",
    "반납예정일",
    "상호대차",
    "비치중",
];

/// Phrases that embed a status keyword but describe a service restriction,
/// not this copy's loan state. Removed before keyword matching.
const NON_STATUS_NOISE: &[&str] = &["도서예약불가", "상호대차불가"];

/// Tokens that mark a string as a library/branch name.
pub const LIBRARY_HINTS: &[&str] = &["작은도서관", "도서관", "분관", "자료관"];

/// Emphasis elements checked for a status phrase, vendor-specific first.
const EMPHASIS_SELECTORS: &[&str] = &[
    "b.emp3",
    "span.emp3",
    "b.emp2",
    "span.emp2",
    "b.emp1",
    "span.emp1",
    ".status",
    ".state",
    "b",
    "strong",
    "em",
];

const TITLE_SELECTORS: &[&str] = &[
    ".tit",
    ".custom-tit",
    ".title",
    ".book_name .title",
    "dt.tit",
    ".bookDataWrap .tit",
    "h3",
    "h4",
    ".data .tit",
];

static YEAR_PAT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(19|20)\d{2}\b").unwrap());
static DUE_DATE_PAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"반납\s*예정\s*일?\s*[:：]?\s*([0-9]{4}[.\-/][0-9]{1,2}[.\-/][0-9]{1,2})").unwrap()
});
static RESERVE_PAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"예약\s*[:：]?\s*([0-9]+)\s*명").unwrap());
static CALLNO_LABELED_PAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"청구기호\s*[:：]?\s*(\S+)").unwrap());
static CALLNO_BARE_PAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{3}(?:\.[0-9]+)?-[가-힣]\S*").unwrap());
static ROOM_BRACKET_PAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\s*[^\s\[\]]+").unwrap());
static ROOM_PLAIN_PAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[가-힣A-Za-z0-9]+(?:자료실|열람실|어린이실)").unwrap());
static TITLE_INDEX_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:\d+\s*[.)]\s*|도서\s+)").unwrap());
static BRACKETED_PAT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\]]+)\]").unwrap());

/// Site-tunable status interpretation. The default treats a bracketed phrase
/// as the authoritative per-copy state; some vendors invert that layout.
#[derive(Debug, Clone)]
pub struct StatusRules {
    pub bracket_wins: bool,
}

impl Default for StatusRules {
    fn default() -> Self {
        Self { bracket_wins: true }
    }
}

fn sel(raw: &str) -> Option<Selector> {
    Selector::parse(raw).ok()
}

fn parent_element<'a>(block: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    block.parent().and_then(ElementRef::wrap)
}

fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn has_hangul(s: &str) -> bool {
    s.chars().any(|c| ('가'..='힣').contains(&c))
}

fn contains_status_keyword(s: &str) -> bool {
    STATUS_KEYWORDS.iter().any(|k| s.contains(k))
}

fn contains_library_hint(s: &str) -> bool {
    LIBRARY_HINTS.iter().any(|h| s.contains(h))
}

/// Trimmed, non-empty text chunks of the block, in document order.
fn text_chunks(block: &ElementRef) -> Vec<String> {
    block
        .text()
        .map(|t| collapse_ws(t))
        .filter(|t| !t.is_empty())
        .collect()
}

/// The block's visible text flattened to one line.
pub fn flat_text(block: &ElementRef) -> String {
    text_chunks(block).join(" ")
}

fn first_selector_text(block: &ElementRef, selectors: &[&str]) -> Option<String> {
    for raw in selectors {
        let Some(s) = sel(raw) else { continue };
        if let Some(el) = block.select(&s).next() {
            let text = collapse_ws(&el.text().collect::<String>());
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

/// Book title. Selector cascade first, then `img[alt]`, then the longest
/// Hangul-bearing text chunk of the block (ties go to the later chunk).
pub fn title(block: &ElementRef) -> Option<String> {
    if let Some(t) = first_selector_text(block, TITLE_SELECTORS) {
        return Some(strip_title_prefix(&t));
    }

    if let Some(s) = sel("img[alt]") {
        if let Some(img) = block.select(&s).next() {
            if let Some(alt) = img.value().attr("alt") {
                let alt = collapse_ws(alt);
                if has_hangul(&alt) {
                    return Some(strip_title_prefix(&alt));
                }
            }
        }
    }

    text_chunks(block)
        .into_iter()
        .filter(|t| has_hangul(t) && !contains_status_keyword(t))
        .max_by_key(|t| t.chars().count())
        .map(|t| strip_title_prefix(&t))
}

fn strip_title_prefix(t: &str) -> String {
    TITLE_INDEX_PREFIX.replace(t, "").trim().to_string()
}

/// Loan status of the copy, normalized to a spaceless keyword. Some layouts
/// put the status badge next to the block rather than inside it, so the
/// immediate parent's emphasis tags are scanned as a last resort.
pub fn status(block: &ElementRef, rules: &StatusRules) -> Option<String> {
    if let Some(found) = emphasized_status(block, rules) {
        return Some(found);
    }
    if let Some(found) = status_from_text(&flat_text(block), rules) {
        return Some(found);
    }
    parent_element(block).and_then(|p| emphasized_status(&p, rules))
}

fn emphasized_status(scope: &ElementRef, rules: &StatusRules) -> Option<String> {
    for raw in EMPHASIS_SELECTORS {
        let Some(s) = sel(raw) else { continue };
        for el in scope.select(&s) {
            let text = collapse_ws(&el.text().collect::<String>());
            if let Some(found) = status_from_text(&text, rules) {
                return Some(found);
            }
        }
    }
    None
}

/// Keyword search over one text fragment. Restriction phrases like
/// `도서예약불가` are masked out first so their embedded keywords cannot
/// produce a false status.
pub fn status_from_text(text: &str, rules: &StatusRules) -> Option<String> {
    let mut cleaned = text.to_string();
    for noise in NON_STATUS_NOISE {
        cleaned = cleaned.replace(noise, " ");
    }

    // A bracketed phrase such as `대출불가[대출중]` carries the per-copy
    // state; the outer text describes the service tier. Sites that invert
    // this layout disable the rule, and their bracket content is ignored.
    if rules.bracket_wins {
        for cap in BRACKETED_PAT.captures_iter(&cleaned) {
            let inner = &cap[1];
            if let Some(k) = STATUS_KEYWORDS.iter().find(|k| inner.contains(**k)) {
                return Some(normalize_keyword(k));
            }
        }
    } else {
        cleaned = BRACKETED_PAT.replace_all(&cleaned, " ").into_owned();
    }

    STATUS_KEYWORDS
        .iter()
        .find(|k| cleaned.contains(**k))
        .map(|k| normalize_keyword(k))
}

fn normalize_keyword(k: &str) -> String {
    k.split_whitespace().collect()
}

fn emphasis_candidates(block: &ElementRef) -> Vec<String> {
    let mut out = Vec::new();
    for raw in ["em", "span"] {
        let Some(s) = sel(raw) else { continue };
        for el in block.select(&s) {
            let text = collapse_ws(&el.text().collect::<String>());
            if !text.is_empty() {
                out.push(text);
            }
        }
    }
    out
}

/// Holding library name. Prefers the longest hint-bearing `em`/`span` text;
/// failing that, derives one from a short bracketed location token.
pub fn library(block: &ElementRef) -> Option<String> {
    let best = emphasis_candidates(block)
        .into_iter()
        .enumerate()
        .filter(|(_, t)| {
            contains_library_hint(t)
                && !contains_status_keyword(t)
                && !YEAR_PAT.is_match(t)
                && t.chars().count() <= 30
        })
        .max_by_key(|(idx, t)| (t.chars().count(), *idx))
        .map(|(_, t)| t);
    if best.is_some() {
        return best;
    }

    // e.g. "[강남] 종합자료실" names the branch only by its bracket token.
    for cap in BRACKETED_PAT.captures_iter(&flat_text(block)) {
        let inner = collapse_ws(&cap[1]);
        if !has_hangul(&inner) || contains_status_keyword(&inner) {
            continue;
        }
        if contains_library_hint(&inner) {
            return Some(inner);
        }
        if inner.chars().count() <= 8 {
            return Some(format!("{inner}도서관"));
        }
    }
    None
}

/// Publisher name: the first emphasis text that is not a year, a status, or
/// a library name.
pub fn publisher(block: &ElementRef) -> Option<String> {
    emphasis_candidates(block).into_iter().find(|t| {
        has_hangul(t)
            && t.chars().count() <= 30
            && !contains_library_hint(t)
            && !contains_status_keyword(t)
            && !YEAR_PAT.is_match(t)
    })
}

/// First plausible publication year in the text.
pub fn year(text: &str) -> Option<String> {
    YEAR_PAT.find(text).map(|m| m.as_str().to_string())
}

/// Due date following a `반납예정일` label, as printed.
pub fn due_date(text: &str) -> Option<String> {
    DUE_DATE_PAT
        .captures(text)
        .map(|c| c[1].to_string())
}

/// Reservation queue length from a `예약 N명` phrase.
pub fn reserve_count(text: &str) -> Option<u32> {
    RESERVE_PAT
        .captures(text)
        .and_then(|c| c[1].parse().ok())
}

/// Call number, labeled form preferred over the bare shelf pattern.
pub fn call_number(text: &str) -> Option<String> {
    if let Some(c) = CALLNO_LABELED_PAT.captures(text) {
        return Some(c[1].to_string());
    }
    CALLNO_BARE_PAT.find(text).map(|m| m.as_str().to_string())
}

/// Reading-room location: a bracketed token plus the word after it (e.g.
/// "[못골] 성인"), else a plain room-suffixed token. Brackets holding a
/// status phrase (`[대출중]`) are not locations and are skipped.
pub fn room(text: &str) -> Option<String> {
    for cap in ROOM_BRACKET_PAT.captures_iter(text) {
        if contains_status_keyword(&cap[1]) {
            continue;
        }
        return Some(collapse_ws(cap.get(0)?.as_str()));
    }
    ROOM_PLAIN_PAT.find(text).map(|m| collapse_ws(m.as_str()))
}

/// Cover image URL, absolutized against `base_url` when relative.
/// Vendor "no image" placeholders are skipped. The thumbnail often sits in a
/// sibling column, so the immediate parent is searched when the block itself
/// has no usable image.
pub fn cover_image(block: &ElementRef, base_url: Option<&str>) -> Option<String> {
    scoped_cover_image(block, base_url)
        .or_else(|| parent_element(block).and_then(|p| scoped_cover_image(&p, base_url)))
}

fn scoped_cover_image(block: &ElementRef, base_url: Option<&str>) -> Option<String> {
    let s = sel("img[src]")?;
    for img in block.select(&s) {
        let Some(src) = img.value().attr("src") else {
            continue;
        };
        let src = src.trim();
        if src.is_empty() || src.to_ascii_lowercase().contains("noimg") {
            continue;
        }
        if src.starts_with("http://") || src.starts_with("https://") {
            return Some(src.to_string());
        }
        if let Some(base) = base_url {
            if let Ok(joined) = Url::parse(base).and_then(|b| b.join(src)) {
                return Some(joined.to_string());
            }
        }
    }
    None
}
