//! Scan orchestration.
//!
//! The orchestrator is the sole owner of the [`ScanContext`] during a scan.
//! File reads and pattern evaluation fan out over a tokio [`JoinSet`]; the
//! spawned tasks are pure with respect to the audit trail and return outcome
//! structs that the orchestrator turns into decisions at join time, so the
//! trail stays a strict total order even under concurrency.

use crate::audit::{DecisionDraft, DecisionKind, ScanContext};
use crate::catalog::{Pattern, Violation};
use crate::ensemble::{Evaluation, Verdict, build_violation, evaluate_pattern};
use crate::error::{LintError, Result};
use crate::filectx::FileContext;
use crate::scanner::external::{ExternalAnalyzer, gather};
use crate::scanner::walker::{Discovered, Walker};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

const DISCOVERY_PHASE: &str = "File Discovery";
const CHECKING_PHASE: &str = "Pattern Checking";
const EXTERNAL_PHASE: &str = "External Analysis";

/// Per-file scan outcome surfaced to the reporter.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub path: PathBuf,
    pub violations: Vec<Violation>,
    /// True when the file could not be read and was abandoned.
    pub failed: bool,
}

impl AnalysisResult {
    fn checked(path: PathBuf, violations: Vec<Violation>) -> Self {
        Self {
            path,
            violations,
            failed: false,
        }
    }

    fn failed(path: PathBuf) -> Self {
        Self {
            path,
            violations: Vec::new(),
            failed: true,
        }
    }
}

/// What a spawned evaluation task produced for one file.
enum FileOutcome {
    ReadError {
        path: PathBuf,
        message: String,
    },
    Checked {
        path: PathBuf,
        outcomes: Vec<PatternOutcome>,
    },
}

struct PatternOutcome {
    pattern_name: String,
    evaluation: Evaluation,
    violation: Option<Violation>,
}

/// Drives a scan end to end: discovery, concurrent pattern checking,
/// external analyzers, with every decision recorded on the audit trail.
pub struct Orchestrator {
    patterns: Arc<Vec<Pattern>>,
    walker: Walker,
    externals: Vec<Arc<dyn ExternalAnalyzer>>,
    min_confidence: f64,
    abort: Arc<AtomicBool>,
}

impl Orchestrator {
    pub fn new(patterns: Vec<Pattern>, walker: Walker) -> Self {
        Self {
            patterns: Arc::new(patterns),
            walker,
            externals: Vec::new(),
            min_confidence: 0.0,
            abort: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_externals(mut self, externals: Vec<Arc<dyn ExternalAnalyzer>>) -> Self {
        self.externals = externals;
        self
    }

    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.min_confidence = min_confidence.clamp(0.0, 1.0);
        self
    }

    /// Handle that makes an in-flight scan stop after the current file.
    pub fn abort_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.abort)
    }

    /// Scan a single already-discovered file. A read failure is a per-file
    /// outcome, not a scan failure.
    pub async fn scan_file(&self, path: &Path, ctx: &mut ScanContext) -> Result<AnalysisResult> {
        if !path.exists() {
            return Err(LintError::FileNotFound(path.to_path_buf()));
        }
        let outcome = evaluate_file(Arc::clone(&self.patterns), path.to_path_buf()).await;
        self.record_outcome(outcome, ctx)
    }

    /// Scan a directory tree. Structural failures (the root is not a
    /// directory, the trail is finalized) bubble; per-file failures are
    /// recorded and folded into the results.
    pub async fn scan_directory(
        &self,
        root: &Path,
        ctx: &mut ScanContext,
    ) -> Result<Vec<AnalysisResult>> {
        if !root.exists() {
            return Err(LintError::FileNotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(LintError::NotADirectory(root.to_path_buf()));
        }

        ctx.start_phase(DISCOVERY_PHASE)?;
        let files = self.discover(root, ctx)?;
        info!(files = files.len(), root = %root.display(), "discovery complete");

        ctx.start_phase(CHECKING_PHASE)?;
        let mut results = self.check_files(files, ctx).await?;

        if !self.externals.is_empty() {
            ctx.start_phase(EXTERNAL_PHASE)?;
            results.extend(self.run_externals(root, ctx).await?);
        }
        ctx.end_phase()?;

        results.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(results)
    }

    /// Walks the tree, recording one inclusion or exclusion decision per
    /// path before anything is read.
    fn discover(&self, root: &Path, ctx: &mut ScanContext) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for discovered in self.walker.discover(root) {
            match discovered {
                Discovered::Included(path) => {
                    ctx.record(
                        DecisionDraft::new(
                            DecisionKind::FileIncluded,
                            DISCOVERY_PHASE,
                            "passed exclusion policy",
                        )
                        .with_file(&path),
                    )?;
                    files.push(path);
                }
                Discovered::Excluded { path, reason } => {
                    ctx.record(
                        DecisionDraft::new(DecisionKind::FileExcluded, DISCOVERY_PHASE, reason)
                            .with_file(&path),
                    )?;
                }
                Discovered::WalkError { path, message } => {
                    warn!(path = %path.display(), error = %message, "walk error");
                    ctx.record(
                        DecisionDraft::new(DecisionKind::ScanError, DISCOVERY_PHASE, message)
                            .with_file(&path),
                    )?;
                }
            }
        }
        files.sort();
        Ok(files)
    }

    async fn check_files(
        &self,
        files: Vec<PathBuf>,
        ctx: &mut ScanContext,
    ) -> Result<Vec<AnalysisResult>> {
        let mut set = JoinSet::new();
        let mut pending = files.into_iter();
        let mut results = Vec::new();

        // Bounded fan-out keeps open file handles in check on large trees.
        const IN_FLIGHT: usize = 16;
        for path in pending.by_ref().take(IN_FLIGHT) {
            set.spawn(evaluate_file(Arc::clone(&self.patterns), path));
        }

        while let Some(joined) = set.join_next().await {
            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(error = %e, "evaluation task panicked");
                    continue;
                }
            };
            results.push(self.record_outcome(outcome, ctx)?);

            if self.abort.load(Ordering::Relaxed) {
                // Let tasks already in flight run out so every spawned file
                // still lands in the trail; only unspawned files are
                // abandoned, each with a recorded decision and a failed slot
                // in the results.
                while let Some(joined) = set.join_next().await {
                    match joined {
                        Ok(outcome) => results.push(self.record_outcome(outcome, ctx)?),
                        Err(e) => warn!(error = %e, "evaluation task panicked"),
                    }
                }
                for path in pending.by_ref() {
                    ctx.record(
                        DecisionDraft::new(
                            DecisionKind::ScanError,
                            CHECKING_PHASE,
                            "scan aborted before this file was checked",
                        )
                        .with_file(&path),
                    )?;
                    ctx.mark_file_failed();
                    results.push(AnalysisResult::failed(path));
                }
                break;
            }
            if let Some(path) = pending.next() {
                set.spawn(evaluate_file(Arc::clone(&self.patterns), path));
            }
        }
        Ok(results)
    }

    /// Turns a task outcome into audit decisions and a reporter result.
    fn record_outcome(
        &self,
        outcome: FileOutcome,
        ctx: &mut ScanContext,
    ) -> Result<AnalysisResult> {
        match outcome {
            FileOutcome::ReadError { path, message } => {
                ctx.record(
                    DecisionDraft::new(DecisionKind::ScanError, CHECKING_PHASE, message)
                        .with_file(&path),
                )?;
                ctx.mark_file_failed();
                Ok(AnalysisResult::failed(path))
            }
            FileOutcome::Checked { path, outcomes } => {
                let mut violations = Vec::new();
                for outcome in outcomes {
                    violations
                        .extend(self.record_pattern_outcome(&path, outcome, ctx)?);
                }
                ctx.mark_file_processed();
                Ok(AnalysisResult::checked(path, violations))
            }
        }
    }

    fn record_pattern_outcome(
        &self,
        path: &Path,
        outcome: PatternOutcome,
        ctx: &mut ScanContext,
    ) -> Result<Vec<Violation>> {
        let eval = &outcome.evaluation;
        for error in &eval.evaluator_errors {
            ctx.record(
                DecisionDraft::new(DecisionKind::ScanError, CHECKING_PHASE, error.clone())
                    .with_file(path)
                    .with_pattern(&outcome.pattern_name),
            )?;
        }

        let kind = if eval.verdict.is_violation() {
            DecisionKind::PatternMatched
        } else {
            DecisionKind::PatternSkipped
        };
        ctx.record(
            DecisionDraft::new(kind, CHECKING_PHASE, eval.reason.clone())
                .with_file(path)
                .with_pattern(&outcome.pattern_name)
                .with_confidence(eval.confidence)
                .with_detail("votes", serde_json::json!(eval.votes))
                .with_detail("rules_evaluated", serde_json::json!(eval.rules_evaluated)),
        )?;

        let Some(violation) = outcome.violation else {
            return Ok(Vec::new());
        };

        if violation.confidence < self.min_confidence {
            ctx.record(
                DecisionDraft::new(
                    DecisionKind::ViolationFiltered,
                    CHECKING_PHASE,
                    format!(
                        "confidence {:.2} below minimum {:.2}",
                        violation.confidence, self.min_confidence
                    ),
                )
                .with_file(path)
                .with_pattern(&outcome.pattern_name)
                .with_confidence(violation.confidence),
            )?;
            return Ok(Vec::new());
        }

        ctx.record(
            DecisionDraft::new(
                DecisionKind::ViolationDetected,
                CHECKING_PHASE,
                format!("line {}: {}", violation.line, violation.matched),
            )
            .with_file(path)
            .with_pattern(&outcome.pattern_name)
            .with_confidence(violation.confidence),
        )?;
        Ok(vec![violation])
    }

    async fn run_externals(
        &self,
        root: &Path,
        ctx: &mut ScanContext,
    ) -> Result<Vec<AnalysisResult>> {
        let mut results = Vec::new();
        for (name, outcome) in gather(&self.externals, root).await {
            match outcome {
                Ok(violations) => {
                    for violation in &violations {
                        ctx.record(
                            DecisionDraft::new(
                                DecisionKind::ViolationDetected,
                                EXTERNAL_PHASE,
                                format!("reported by external analyzer '{name}'"),
                            )
                            .with_file(&violation.file)
                            .with_pattern(&violation.pattern)
                            .with_confidence(violation.confidence),
                        )?;
                    }
                    if !violations.is_empty() {
                        results.push(AnalysisResult::checked(root.to_path_buf(), violations));
                    }
                }
                Err(e) => {
                    ctx.record(
                        DecisionDraft::new(
                            DecisionKind::ScanError,
                            EXTERNAL_PHASE,
                            e.to_string(),
                        )
                        .with_file(root),
                    )?;
                }
            }
        }
        Ok(results)
    }
}

/// Pure evaluation of one file against every pattern. Runs inside a spawned
/// task; touches no shared state.
async fn evaluate_file(patterns: Arc<Vec<Pattern>>, path: PathBuf) -> FileOutcome {
    let text = match tokio::fs::read_to_string(&path).await {
        Ok(text) => text,
        Err(e) => {
            return FileOutcome::ReadError {
                message: LintError::Read {
                    path: path.clone(),
                    source: e,
                }
                .to_string(),
                path,
            };
        }
    };

    let ctx = FileContext::new(path.clone(), text);
    let mut outcomes = Vec::with_capacity(patterns.len());
    for pattern in patterns.iter() {
        debug!(pattern = %pattern.name, file = %ctx.path_str(), "evaluating");
        let evaluation = evaluate_pattern(pattern, &ctx);
        let violation = match evaluation.verdict {
            Verdict::Violation {
                confidence,
                location,
            } => Some(build_violation(pattern, &ctx, confidence, location)),
            Verdict::NoViolation => None,
        };
        outcomes.push(PatternOutcome {
            pattern_name: pattern.name.clone(),
            evaluation,
            violation,
        });
    }
    FileOutcome::Checked { path, outcomes }
}
