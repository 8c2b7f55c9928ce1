use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Closed set of decision points the scanner can record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionKind {
    FileIncluded,
    FileExcluded,
    PatternMatched,
    PatternSkipped,
    ViolationDetected,
    ViolationFiltered,
    FixApplied,
    FixSkipped,
    ScanError,
}

impl DecisionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionKind::FileIncluded => "FILE_INCLUDED",
            DecisionKind::FileExcluded => "FILE_EXCLUDED",
            DecisionKind::PatternMatched => "PATTERN_MATCHED",
            DecisionKind::PatternSkipped => "PATTERN_SKIPPED",
            DecisionKind::ViolationDetected => "VIOLATION_DETECTED",
            DecisionKind::ViolationFiltered => "VIOLATION_FILTERED",
            DecisionKind::FixApplied => "FIX_APPLIED",
            DecisionKind::FixSkipped => "FIX_SKIPPED",
            DecisionKind::ScanError => "SCAN_ERROR",
        }
    }
}

impl std::fmt::Display for DecisionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One immutable audit-trail record. Created exactly once per decision
/// point, never mutated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    /// Monotone sequence number; the strict total order over decisions.
    pub seq: u64,
    pub timestamp: DateTime<Utc>,
    pub kind: DecisionKind,
    /// What was being done when the decision was made.
    pub context: String,
    /// Why this decision was reached.
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, serde_json::Value>,
}

/// Builder for a decision before it is committed to the trail.
#[derive(Debug, Clone)]
pub struct DecisionDraft {
    pub kind: DecisionKind,
    pub context: String,
    pub reason: String,
    pub file: Option<PathBuf>,
    pub pattern: Option<String>,
    pub confidence: Option<f64>,
    pub duration_ms: Option<f64>,
    pub details: BTreeMap<String, serde_json::Value>,
}

impl DecisionDraft {
    pub fn new(kind: DecisionKind, context: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            kind,
            context: context.into(),
            reason: reason.into(),
            file: None,
            pattern: None,
            confidence: None,
            duration_ms: None,
            details: BTreeMap::new(),
        }
    }

    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn with_duration_ms(mut self, duration_ms: f64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.details.insert(key.into(), value);
        self
    }

    pub(crate) fn into_decision(self, seq: u64) -> Decision {
        Decision {
            seq,
            timestamp: Utc::now(),
            kind: self.kind,
            context: self.context,
            reason: self.reason,
            file: self.file,
            pattern: self.pattern,
            confidence: self.confidence,
            duration_ms: self.duration_ms,
            details: self.details,
        }
    }
}
