//! Locate a book across Korean public-library catalogs.
//!
//! Two engines, decoupled by the capture files on disk:
//! - Page readiness & capture: judge when a catalog's search results have
//!   actually rendered (main document, iframe or shadow DOM), then snapshot
//!   markup and text under deterministic names.
//! - Heuristic extraction: parse captured pages back into `BookRecord`s via
//!   a selector cascade and per-field Korean-text disambiguation rules.

pub mod capture;
pub mod config;
pub mod error;
pub mod evidence;
pub mod extract;
pub mod page;
pub mod record;
pub mod resolve;
pub mod session;
pub mod stability;

pub use capture::{CaptureArtifact, CaptureWriter, OutcomeTag};
pub use config::{CatalogEndpoint, CatalogIndex};
pub use error::EngineError;
pub use evidence::ReadinessEvidence;
pub use extract::ParseOutcome;
pub use page::{DomScope, PageHandle, ScopeKind};
pub use record::{BookRecord, RecordMeta};
pub use resolve::Resolution;
pub use stability::StabilityBudget;
