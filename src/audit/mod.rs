//! Decision audit trail: every inclusion, match, and rejection decision the
//! scanner makes is recorded here with its reasoning, grouped into named
//! phases, and exportable as a self-contained document.

mod context;
mod decision;

pub use context::{AuditExport, Counters, Phase, PhaseExport, ScanContext};
pub use decision::{Decision, DecisionDraft, DecisionKind};
