//! Ensemble voting aggregator.
//!
//! Combines the votes of a pattern's enabled rules into a single verdict
//! against the pattern's quorum (`min_votes`) and `confidence_threshold`.
//! Patterns owning zero enabled rules fall back to a single substring check.
//!
//! Aggregation policy: aggregate confidence is the weight-weighted average
//! of affirmative confidences; `Suppress` amounts subtract absolutely and
//! the result is clamped to `[0, 1]`. A suppression total that cancels the
//! whole accumulated confidence is a veto and forces `NoViolation` no matter
//! how many affirmative votes preceded it.

use crate::catalog::types::{Location, Pattern, Violation};
use crate::ensemble::evaluators::evaluate_rule;
use crate::ensemble::vote::Vote;
use crate::filectx::FileContext;
use std::panic::{AssertUnwindSafe, catch_unwind};
use tracing::trace;

/// Outcome of one (pattern, file) aggregation.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Violation { confidence: f64, location: Location },
    NoViolation,
}

impl Verdict {
    pub fn is_violation(&self) -> bool {
        matches!(self, Verdict::Violation { .. })
    }
}

/// Full aggregation record for one (pattern, file) pair, carried to the
/// decision audit trail alongside the verdict.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub verdict: Verdict,
    /// Count of affirmative votes, in `[0, enabled_rules]`.
    pub votes: u32,
    /// Aggregate confidence after suppression, clamped to `[0, 1]`.
    pub confidence: f64,
    /// Total suppression applied.
    pub suppressed: f64,
    /// True when negative evidence cancelled the entire confidence.
    pub vetoed: bool,
    pub rules_evaluated: usize,
    /// Deterministic human-readable reasoning for the audit trail.
    pub reason: String,
    /// Evaluator panics caught at this boundary (bugs, not user errors).
    pub evaluator_errors: Vec<String>,
}

/// Evaluate a pattern against a file context. Pure with respect to the file
/// content: identical input yields an identical verdict and reason text.
pub fn evaluate_pattern(pattern: &Pattern, ctx: &FileContext) -> Evaluation {
    let rules = pattern.enabled_rules();
    if rules.is_empty() {
        return fallback_check(pattern, ctx);
    }

    let mut votes: u32 = 0;
    let mut weight_total: f64 = 0.0;
    let mut weighted_confidence: f64 = 0.0;
    let mut suppressed: f64 = 0.0;
    let mut location: Option<Location> = None;
    let mut evaluator_errors = Vec::new();

    // All enabled rules are evaluated before a verdict: a later
    // negative-evidence rule may still suppress an earlier affirm.
    for rule in &rules {
        let vote = match catch_unwind(AssertUnwindSafe(|| evaluate_rule(rule, ctx))) {
            Ok(vote) => vote,
            Err(_) => {
                evaluator_errors.push(format!(
                    "evaluator for rule '{}' ({}) panicked; treated as abstain",
                    rule.id,
                    rule.kind().as_str()
                ));
                Vote::Abstain
            }
        };

        trace!(
            pattern = %pattern.name,
            rule = %rule.id,
            file = %ctx.path_str(),
            ?vote,
            "Rule evaluated"
        );

        match vote {
            Vote::Affirm {
                weight,
                confidence,
                location: vote_location,
            } => {
                votes += 1;
                weight_total += weight as f64;
                weighted_confidence += confidence * weight as f64;
                if location.is_none() {
                    location = vote_location;
                }
            }
            Vote::Abstain => {}
            Vote::Suppress { amount } => {
                suppressed += amount;
            }
        }
    }

    let raw_confidence = if weight_total > 0.0 {
        (weighted_confidence / weight_total).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let vetoed = suppressed > 0.0 && suppressed >= raw_confidence;
    let confidence = (raw_confidence - suppressed).clamp(0.0, 1.0);

    let policy = pattern.policy;
    let confirmed =
        !vetoed && votes >= policy.min_votes && confidence >= policy.confidence_threshold;

    let mut reason = format!(
        "{}/{} rules affirmed, confidence {:.2} after suppression {:.2} (quorum {}, threshold {:.2})",
        votes,
        rules.len(),
        confidence,
        suppressed,
        policy.min_votes,
        policy.confidence_threshold
    );
    if vetoed {
        reason.push_str("; vetoed by negative evidence");
    }

    let verdict = if confirmed {
        Verdict::Violation {
            confidence,
            location: location.unwrap_or(Location::line(1)),
        }
    } else {
        Verdict::NoViolation
    };

    Evaluation {
        verdict,
        votes,
        confidence,
        suppressed,
        vetoed,
        rules_evaluated: rules.len(),
        reason,
        evaluator_errors,
    }
}

/// Single simple check for patterns with no enabled ensemble rules:
/// forbidden substring present, or required substring absent. Always
/// `min_votes = 1`, confidence 1.0.
fn fallback_check(pattern: &Pattern, ctx: &FileContext) -> Evaluation {
    let mut result: Option<(Location, String)> = None;

    if let Some(forbidden) = &pattern.forbidden {
        if let Some(line) = ctx.find_line(forbidden) {
            result = Some((
                Location::line(line),
                format!("forbidden substring '{forbidden}' present"),
            ));
        }
    }

    if result.is_none() {
        if let Some(required) = &pattern.required {
            if ctx.find_line(required).is_none() {
                result = Some((
                    Location::line(1),
                    format!("required substring '{required}' absent"),
                ));
            }
        }
    }

    match result {
        Some((location, reason)) => Evaluation {
            verdict: Verdict::Violation {
                confidence: 1.0,
                location,
            },
            votes: 1,
            confidence: 1.0,
            suppressed: 0.0,
            vetoed: false,
            rules_evaluated: 0,
            reason,
            evaluator_errors: Vec::new(),
        },
        None => Evaluation {
            verdict: Verdict::NoViolation,
            votes: 0,
            confidence: 0.0,
            suppressed: 0.0,
            vetoed: false,
            rules_evaluated: 0,
            reason: "fallback substring checks passed".to_string(),
            evaluator_errors: Vec::new(),
        },
    }
}

/// Project a confirmed verdict into a reportable violation.
pub fn build_violation(
    pattern: &Pattern,
    ctx: &FileContext,
    confidence: f64,
    location: Location,
) -> Violation {
    let matched = ctx
        .text
        .lines()
        .nth(location.line.saturating_sub(1))
        .map(|l| l.trim().to_string())
        .unwrap_or_default();

    Violation {
        pattern: pattern.name.clone(),
        category: pattern.category.clone(),
        priority: pattern.priority,
        file: ctx.path_str(),
        line: location.line,
        column: location.column,
        matched,
        confidence,
        suggested_fix: pattern.fix_template.clone(),
        auto_fixable: pattern.fix_template.is_some(),
    }
}
