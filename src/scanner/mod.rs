//! Scan pipeline: discovery, orchestration, external analyzers.

pub mod external;
pub mod orchestrator;
pub mod walker;

pub use external::{CommandAnalyzer, ExternalAnalyzer};
pub use orchestrator::{AnalysisResult, Orchestrator};
pub use walker::{ExcludePolicy, Walker};
