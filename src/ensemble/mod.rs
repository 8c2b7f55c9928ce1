//! Ensemble detection engine: rule evaluators and the voting aggregator.

pub mod aggregator;
pub mod evaluators;
pub mod vote;

pub use aggregator::{Evaluation, Verdict, build_violation, evaluate_pattern};
pub use vote::Vote;
