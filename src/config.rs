//! Catalog endpoint configuration.
//!
//! A YAML index maps each place (district) to its catalog homepage and,
//! optionally, per-place selector overrides. Global defaults and result
//! markers cover sites that have not been tuned yet; built-in fallbacks cover
//! an empty file. The core treats all of this as read-only: it is the
//! selector universe for the evidence collector and scope resolver.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::EngineError;

/// Broad marker set that works across the known catalog skins.
const DEFAULT_RESULT_MARKERS: &[&str] = &[
    ".searchList",
    ".search-list",
    ".result-list",
    ".result_list",
    ".board-list",
    "ul.board-list",
    ".book-list",
    "#resultList",
    "#content",
    "section.result",
    "div.result",
];

const DEFAULT_SEARCH_BOX: &[&str] = &[
    "#searchKeyword",
    "#q",
    "input[name='keyword']",
    "input[name='searchKey']",
    "input[type='text']",
];

const DEFAULT_SUBMIT_BTN: &[&str] = &["#searchBtn", "button.searchBtn", ".btn_search"];

/// One place's entry in the catalog index.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    pub homepage: String,
    /// Optional search-page path when the homepage has no search box.
    #[serde(default)]
    pub navigate_to_search: Option<String>,
    #[serde(default)]
    pub search_box: Option<Vec<String>>,
    #[serde(default)]
    pub submit_btn: Option<Vec<String>>,
    #[serde(default)]
    pub result_markers: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SelectorDefaults {
    #[serde(default)]
    pub search_box: Vec<String>,
    #[serde(default)]
    pub submit_btn: Vec<String>,
}

/// The whole YAML file: `places` plus global selector defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogIndex {
    #[serde(default)]
    pub places: HashMap<String, CatalogEntry>,
    #[serde(default)]
    pub defaults: SelectorDefaults,
    #[serde(default)]
    pub result_markers: Vec<String>,
}

/// Merged selector arrays for one place.
#[derive(Debug, Clone)]
pub struct SelectorSet {
    pub search_box: Vec<String>,
    pub submit_btn: Vec<String>,
    pub result_markers: Vec<String>,
}

/// Everything the capture engine needs to know about one place.
#[derive(Debug, Clone)]
pub struct CatalogEndpoint {
    pub place: String,
    pub homepage: String,
    pub navigate_to_search: Option<String>,
    pub selectors: SelectorSet,
}

fn owned(defaults: &[&str]) -> Vec<String> {
    defaults.iter().map(|s| s.to_string()).collect()
}

fn pick(entry: Option<&Vec<String>>, file_default: &[String], builtin: &[&str]) -> Vec<String> {
    match entry {
        Some(v) if !v.is_empty() => v.clone(),
        _ if !file_default.is_empty() => file_default.to_vec(),
        _ => owned(builtin),
    }
}

impl CatalogIndex {
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let raw = fs::read_to_string(path).map_err(|source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| EngineError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolve one place into a merged endpoint. An unknown place is a hard
    /// input-validation failure.
    pub fn endpoint(&self, place: &str) -> Result<CatalogEndpoint, EngineError> {
        let entry = self
            .places
            .get(place)
            .ok_or_else(|| EngineError::UnknownPlace(place.to_string()))?;

        let selectors = SelectorSet {
            search_box: pick(
                entry.search_box.as_ref(),
                &self.defaults.search_box,
                DEFAULT_SEARCH_BOX,
            ),
            submit_btn: pick(
                entry.submit_btn.as_ref(),
                &self.defaults.submit_btn,
                DEFAULT_SUBMIT_BTN,
            ),
            result_markers: pick(
                entry.result_markers.as_ref(),
                &self.result_markers,
                DEFAULT_RESULT_MARKERS,
            ),
        };

        Ok(CatalogEndpoint {
            place: place.to_string(),
            homepage: entry.homepage.clone(),
            navigate_to_search: entry.navigate_to_search.clone(),
            selectors,
        })
    }
}

impl Default for SelectorSet {
    fn default() -> Self {
        Self {
            search_box: owned(DEFAULT_SEARCH_BOX),
            submit_btn: owned(DEFAULT_SUBMIT_BTN),
            result_markers: owned(DEFAULT_RESULT_MARKERS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merges_place_overrides_over_defaults() {
        let yaml = r##"
places:
  songpa:
    homepage: "https://www.splib.or.kr"
    search_box: ["#custom"]
  seocho:
    homepage: "https://public.seocholib.or.kr"
defaults:
  search_box: ["#fileDefault"]
result_markers: [".searchList"]
"##;
        let index: CatalogIndex = serde_yaml::from_str(yaml).unwrap();

        let songpa = index.endpoint("songpa").unwrap();
        assert_eq!(songpa.selectors.search_box, vec!["#custom"]);
        assert_eq!(songpa.selectors.result_markers, vec![".searchList"]);

        // Place without overrides inherits the file-level default.
        let seocho = index.endpoint("seocho").unwrap();
        assert_eq!(seocho.selectors.search_box, vec!["#fileDefault"]);
        // No submit_btn anywhere: built-in fallback applies.
        assert_eq!(seocho.selectors.submit_btn[0], "#searchBtn");
    }

    #[test]
    fn unknown_place_is_hard_error() {
        let index = CatalogIndex::default();
        let err = index.endpoint("nowhere").unwrap_err();
        assert!(matches!(err, EngineError::UnknownPlace(p) if p == "nowhere"));
    }

    #[test]
    fn empty_file_gets_builtin_markers() {
        let yaml = "places:\n  gangnam:\n    homepage: \"https://library.gangnam.go.kr\"\n";
        let index: CatalogIndex = serde_yaml::from_str(yaml).unwrap();
        let ep = index.endpoint("gangnam").unwrap();
        assert!(ep.selectors.result_markers.contains(&".searchList".to_string()));
        assert!(ep.navigate_to_search.is_none());
    }
}
