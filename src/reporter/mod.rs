pub mod json;
pub mod terminal;

pub use json::JsonReporter;
pub use terminal::TerminalReporter;

use crate::catalog::{Priority, Violation};
use crate::scanner::AnalysisResult;
use chrono::Utc;
use serde::{Deserialize, Serialize};

pub trait Reporter {
    fn report(&self, report: &ScanReport) -> String;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub mandatory: usize,
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub optional: usize,
    pub files_processed: u64,
    /// Files that could not be read. A scan with failed files is not a
    /// clean pass even with zero violations.
    pub files_failed: u64,
    pub passed: bool,
}

impl Summary {
    pub fn from_violations(
        violations: &[Violation],
        files_processed: u64,
        files_failed: u64,
        strict: bool,
    ) -> Self {
        let mut s = Self {
            mandatory: 0,
            critical: 0,
            high: 0,
            medium: 0,
            low: 0,
            optional: 0,
            files_processed,
            files_failed,
            passed: true,
        };
        for v in violations {
            match v.priority {
                Priority::Mandatory => s.mandatory += 1,
                Priority::Critical => s.critical += 1,
                Priority::High => s.high += 1,
                Priority::Medium => s.medium += 1,
                Priority::Low => s.low += 1,
                Priority::Optional => s.optional += 1,
            }
        }
        s.passed = if strict {
            violations.is_empty()
        } else {
            s.mandatory == 0 && s.critical == 0 && s.high == 0
        };
        s
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub version: String,
    pub scanned_at: String,
    pub target: String,
    pub summary: Summary,
    pub violations: Vec<Violation>,
}

impl ScanReport {
    pub fn new(
        target: impl Into<String>,
        results: &[AnalysisResult],
        files_processed: u64,
        files_failed: u64,
        strict: bool,
    ) -> Self {
        let mut violations: Vec<Violation> = results
            .iter()
            .flat_map(|r| r.violations.iter().cloned())
            .collect();
        violations.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| a.file.cmp(&b.file))
                .then_with(|| a.line.cmp(&b.line))
        });

        let summary =
            Summary::from_violations(&violations, files_processed, files_failed, strict);
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            scanned_at: Utc::now().to_rfc3339(),
            target: target.into(),
            summary,
            violations,
        }
    }
}
