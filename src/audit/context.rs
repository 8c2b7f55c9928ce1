//! Scan context: the root aggregate of the decision audit trail.

use crate::audit::decision::{Decision, DecisionDraft, DecisionKind};
use crate::error::{LintError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::debug;

/// Running counters kept alongside the decision list. A scan that
/// encountered errors still reports the files it did process;
/// `files_failed` keeps "0 violations" distinguishable from "N files
/// failed to scan".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    pub files_processed: u64,
    pub files_excluded: u64,
    pub files_failed: u64,
    pub patterns_checked: u64,
    pub violations_found: u64,
    pub errors: u64,
}

/// A named time window grouping related decisions.
#[derive(Debug, Clone)]
pub struct Phase {
    pub name: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub duration_ms: Option<f64>,
    /// Sequence numbers of decisions recorded while this phase was current.
    pub decision_seqs: Vec<u64>,
    started: Instant,
}

impl Phase {
    fn new(name: String) -> Self {
        Self {
            name,
            started_at: Utc::now(),
            ended_at: None,
            duration_ms: None,
            decision_seqs: Vec::new(),
            started: Instant::now(),
        }
    }

    fn close(&mut self) {
        if self.ended_at.is_none() {
            self.ended_at = Some(Utc::now());
            self.duration_ms = Some(self.started.elapsed().as_secs_f64() * 1000.0);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.ended_at.is_some()
    }
}

/// Serializable snapshot of one phase with its resolved decisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseExport {
    pub name: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub duration_ms: Option<f64>,
    pub decisions: Vec<Decision>,
}

/// Self-contained, round-trippable export of a full audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditExport {
    pub version: String,
    pub root: PathBuf,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub counters: Counters,
    pub config: serde_json::Value,
    pub phases: Vec<PhaseExport>,
    pub decisions: Vec<Decision>,
}

/// The decision audit trail for one scan run.
///
/// Decisions are append-only and sequence-ordered; at most one phase is
/// current at a time, and starting a new phase implicitly closes the
/// previous one. After [`ScanContext::finalize`] the context is read-only:
/// recording fails with [`LintError::TrailFinalized`].
#[derive(Debug)]
pub struct ScanContext {
    root: PathBuf,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    decisions: Vec<Decision>,
    phases: Vec<Phase>,
    current_phase: Option<usize>,
    counters: Counters,
    config_snapshot: serde_json::Value,
    finalized: bool,
    next_seq: u64,
}

impl ScanContext {
    pub fn new(root: impl Into<PathBuf>, config_snapshot: serde_json::Value) -> Self {
        Self {
            root: root.into(),
            started_at: Utc::now(),
            ended_at: None,
            decisions: Vec::new(),
            phases: Vec::new(),
            current_phase: None,
            counters: Counters::default(),
            config_snapshot,
            finalized: false,
            next_seq: 0,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    pub fn decisions(&self) -> &[Decision] {
        &self.decisions
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    fn ensure_open(&self) -> Result<()> {
        if self.finalized {
            Err(LintError::TrailFinalized)
        } else {
            Ok(())
        }
    }

    /// Start a named phase, implicitly closing the current one.
    pub fn start_phase(&mut self, name: impl Into<String>) -> Result<()> {
        self.ensure_open()?;
        self.close_current_phase();
        let name = name.into();
        debug!(phase = %name, "Phase started");
        self.phases.push(Phase::new(name));
        self.current_phase = Some(self.phases.len() - 1);
        Ok(())
    }

    /// Close the current phase, if any.
    pub fn end_phase(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.close_current_phase();
        Ok(())
    }

    fn close_current_phase(&mut self) {
        if let Some(idx) = self.current_phase.take() {
            self.phases[idx].close();
            debug!(phase = %self.phases[idx].name, "Phase closed");
        }
    }

    /// Append one decision. Returns the committed record.
    pub fn record(&mut self, draft: DecisionDraft) -> Result<&Decision> {
        self.ensure_open()?;

        let seq = self.next_seq;
        self.next_seq += 1;

        match draft.kind {
            DecisionKind::FileExcluded => self.counters.files_excluded += 1,
            DecisionKind::PatternMatched | DecisionKind::PatternSkipped => {
                self.counters.patterns_checked += 1
            }
            DecisionKind::ViolationDetected => self.counters.violations_found += 1,
            DecisionKind::ScanError => self.counters.errors += 1,
            _ => {}
        }

        if let Some(idx) = self.current_phase {
            self.phases[idx].decision_seqs.push(seq);
        }

        self.decisions.push(draft.into_decision(seq));
        Ok(self.decisions.last().expect("decision just pushed"))
    }

    /// Count a file that completed pattern checking.
    pub fn mark_file_processed(&mut self) {
        if !self.finalized {
            self.counters.files_processed += 1;
        }
    }

    /// Count a file whose scan was abandoned by a read or task failure.
    pub fn mark_file_failed(&mut self) {
        if !self.finalized {
            self.counters.files_failed += 1;
        }
    }

    /// Close any open phase, freeze the end timestamp, and make the trail
    /// read-only. Idempotent.
    pub fn finalize(&mut self) {
        if self.finalized {
            return;
        }
        self.close_current_phase();
        self.ended_at = Some(Utc::now());
        self.finalized = true;
        debug!(
            decisions = self.decisions.len(),
            phases = self.phases.len(),
            "Audit trail finalized"
        );
    }

    /// Build the self-contained export document.
    pub fn to_export(&self) -> AuditExport {
        let phases = self
            .phases
            .iter()
            .map(|phase| PhaseExport {
                name: phase.name.clone(),
                started_at: phase.started_at,
                ended_at: phase.ended_at,
                duration_ms: phase.duration_ms,
                decisions: phase
                    .decision_seqs
                    .iter()
                    .filter_map(|seq| self.decisions.iter().find(|d| d.seq == *seq))
                    .cloned()
                    .collect(),
            })
            .collect();

        AuditExport {
            version: env!("CARGO_PKG_VERSION").to_string(),
            root: self.root.clone(),
            started_at: self.started_at,
            ended_at: self.ended_at,
            counters: self.counters.clone(),
            config: self.config_snapshot.clone(),
            phases,
            decisions: self.decisions.clone(),
        }
    }

    /// Write the export document as pretty JSON.
    pub fn export(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.to_export())?;
        std::fs::write(path, json).map_err(|source| LintError::AuditExport {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(())
    }
}
