pub mod audit;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod ensemble;
pub mod error;
pub mod filectx;
pub mod reporter;
pub mod run;
pub mod scanner;

#[cfg(test)]
pub mod test_utils;

pub use audit::{AuditExport, Decision, DecisionDraft, DecisionKind, ScanContext};
pub use catalog::{Catalog, EnsembleRule, Pattern, Priority, RuleConfig, Violation, VotePolicy};
pub use cli::{Cli, OutputFormat};
pub use ensemble::{Evaluation, Verdict, evaluate_pattern};
pub use error::{LintError, Result};
pub use filectx::{FileContext, SyntaxNode};
pub use reporter::{JsonReporter, Reporter, ScanReport, Summary, TerminalReporter};
pub use scanner::{AnalysisResult, Orchestrator};
