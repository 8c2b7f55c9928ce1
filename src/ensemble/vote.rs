//! Vote outcomes produced by ensemble rule evaluators.

use crate::catalog::types::Location;

/// Result of evaluating one ensemble rule against one file.
///
/// "Rule does not apply" is a first-class, cheap outcome (`Abstain`), never
/// an error path. Negative evidence reduces aggregate confidence via
/// `Suppress` instead of casting a normal vote.
#[derive(Debug, Clone, PartialEq)]
pub enum Vote {
    /// Affirmative vote with the rule's weight and confidence.
    Affirm {
        weight: u32,
        confidence: f64,
        location: Option<Location>,
    },
    /// Rule not applicable to this file.
    Abstain,
    /// Negative evidence: subtract `amount` from the aggregate confidence.
    Suppress { amount: f64 },
}

impl Vote {
    pub fn affirm(weight: u32, confidence: f64, location: Option<Location>) -> Self {
        Vote::Affirm {
            weight,
            confidence,
            location,
        }
    }

    pub fn is_affirm(&self) -> bool {
        matches!(self, Vote::Affirm { .. })
    }

    pub fn is_abstain(&self) -> bool {
        matches!(self, Vote::Abstain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vote_predicates() {
        assert!(Vote::affirm(1, 0.5, None).is_affirm());
        assert!(Vote::Abstain.is_abstain());
        assert!(!Vote::Suppress { amount: 0.3 }.is_affirm());
    }

    #[test]
    fn test_affirm_carries_location() {
        let vote = Vote::affirm(2, 0.8, Some(Location::line(7)));
        match vote {
            Vote::Affirm {
                weight,
                confidence,
                location,
            } => {
                assert_eq!(weight, 2);
                assert_eq!(confidence, 0.8);
                assert_eq!(location, Some(Location::line(7)));
            }
            _ => panic!("expected affirm"),
        }
    }
}
