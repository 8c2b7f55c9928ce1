//! Pattern catalog: the typed rule model, builtin defaults, and the SQLite
//! store.

pub mod builtin;
pub mod store;
pub mod types;

pub use store::{CatalogStore, LoadReport};
pub use types::{
    EnsembleRule, Location, Pattern, Priority, RuleConfig, RuleKind, UsageStats, Violation,
    VotePolicy,
};

use crate::error::Result;
use std::path::Path;
use tracing::info;

/// The catalog as seen by one scan run: active patterns plus a record of
/// patterns disabled at load time for configuration errors.
#[derive(Debug)]
pub struct Catalog {
    pub patterns: Vec<Pattern>,
    pub disabled: Vec<(String, String)>,
}

impl Catalog {
    /// Builtin default catalog.
    pub fn builtin() -> Self {
        let patterns = builtin::default_patterns()
            .into_iter()
            .filter(|p| p.enabled)
            .collect();
        Self {
            patterns,
            disabled: Vec::new(),
        }
    }

    /// Load from a SQLite store. Catalog unavailability is the one fatal
    /// error of a scan run.
    pub fn from_store(path: &Path) -> Result<Self> {
        let store = CatalogStore::open(path)?;
        let report = store.load_enabled()?;
        info!(
            patterns = report.patterns.len(),
            disabled = report.disabled.len(),
            catalog = %path.display(),
            "Catalog loaded from store"
        );
        Ok(Self {
            patterns: report.patterns,
            disabled: report.disabled,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
