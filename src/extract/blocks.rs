//! Item-block locator: find the repeated per-book containers in a results
//! page.
//!
//! A cascade of container selectors is tried in order of specificity and the
//! first one with any match wins outright. Falling through to a later, more
//! generic selector after a specific hit would mix granularities (e.g. both a
//! card and the `li` wrapping it), so the cascade never merges levels.

use scraper::{ElementRef, Html, Selector};

/// Most specific first. The bare `li` catch-all stays last; it over-matches
/// on navigation lists and is only acceptable when nothing better exists.
pub const ITEM_BLOCK_SELECTORS: &[&str] = &[
    "div.item.row",
    "div.bookArea",
    "dl.bookDataWrap",
    "ul.listWrap > li",
    "li",
];

/// Locate the item blocks of `doc`. Returns the matches of the first
/// selector in the cascade that yields any, deduplicated by node identity,
/// in document order. An empty vec means the page has no recognizable list.
pub fn locate(doc: &Html) -> Vec<ElementRef<'_>> {
    for raw in ITEM_BLOCK_SELECTORS {
        let Ok(sel) = Selector::parse(raw) else {
            continue;
        };
        let mut seen = Vec::new();
        let mut blocks = Vec::new();
        for el in doc.select(&sel) {
            let id = el.id();
            if seen.contains(&id) {
                continue;
            }
            seen.push(id);
            blocks.push(el);
        }
        if !blocks.is_empty() {
            tracing::debug!(selector = raw, count = blocks.len(), "item blocks located");
            return blocks;
        }
    }
    tracing::debug!("no item blocks matched any cascade selector");
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_matching_selector_wins_without_fall_through() {
        // Both div.bookArea and bare li match; only the earlier cascade entry
        // must be used, so the li wrappers never appear as blocks.
        let html = Html::parse_document(
            r#"<ul>
                <li><div class="bookArea">첫 번째 책</div></li>
                <li><div class="bookArea">두 번째 책</div></li>
            </ul>"#,
        );
        let blocks = locate(&html);
        assert_eq!(blocks.len(), 2);
        for b in &blocks {
            assert_eq!(b.value().name(), "div");
        }
    }

    #[test]
    fn falls_back_to_bare_li_when_nothing_specific_matches() {
        let html = Html::parse_document(
            r#"<ul><li>책 하나</li><li>책 둘</li><li>책 셋</li></ul>"#,
        );
        let blocks = locate(&html);
        assert_eq!(blocks.len(), 3);
        assert!(blocks.iter().all(|b| b.value().name() == "li"));
    }

    #[test]
    fn listwrap_children_beat_generic_li() {
        let html = Html::parse_document(
            r#"<ul class="listWrap"><li>결과 A</li><li>결과 B</li></ul>
               <ul class="menu"><li>메뉴</li></ul>"#,
        );
        let blocks = locate(&html);
        // The menu li is excluded because "ul.listWrap > li" matched first.
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn empty_document_yields_no_blocks() {
        let html = Html::parse_document("<html><body><p>결과 없음</p></body></html>");
        assert!(locate(&html).is_empty());
    }
}
