//! One evaluator per ensemble rule kind.
//!
//! Evaluators are pure functions over a compiled [`RuleCheck`] and a
//! [`FileContext`]. They never fail: configuration problems are rejected at
//! catalog-load time, and anything an evaluator cannot interpret at scan
//! time yields [`Vote::Abstain`].

mod keyword;
mod literal;
mod naming;
mod negative;
mod syntax;

use crate::catalog::types::{EnsembleRule, RuleCheck};
use crate::ensemble::vote::Vote;
use crate::filectx::FileContext;

/// Evaluate one rule against a file context. Exhaustive over the closed
/// rule-kind set.
pub fn evaluate_rule(rule: &EnsembleRule, ctx: &FileContext) -> Vote {
    match &rule.check {
        RuleCheck::Literal {
            matcher,
            confidence,
        } => literal::evaluate(matcher, *confidence, rule.weight, ctx),
        RuleCheck::SyntaxNode {
            node_kind,
            predicate,
            confidence,
        } => syntax::evaluate(node_kind, predicate, *confidence, rule.weight, ctx),
        RuleCheck::KeywordContext {
            pattern,
            keywords,
            confidence,
        } => keyword::evaluate(pattern, keywords, *confidence, rule.weight, ctx),
        RuleCheck::NegativeEvidence {
            markers,
            near,
            discount,
            scope,
        } => negative::evaluate(markers, near.as_ref(), *discount, *scope, ctx),
        RuleCheck::NamingConvention {
            triggers,
            required_prefix,
            file_pattern,
            confidence,
        } => naming::evaluate(
            triggers,
            required_prefix,
            file_pattern.as_ref(),
            *confidence,
            rule.weight,
            ctx,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::types::RuleConfig;

    #[test]
    fn test_dispatch_literal() {
        let config = RuleConfig::Literal {
            pattern: "eval(".to_string(),
            regex: false,
            confidence: Some(0.9),
        };
        let rule = EnsembleRule::new("r1", &config, 5).unwrap();
        let ctx = FileContext::new("a.py", "result = eval(expr)");
        assert!(evaluate_rule(&rule, &ctx).is_affirm());
    }

    #[test]
    fn test_dispatch_abstains_on_no_match() {
        let config = RuleConfig::Literal {
            pattern: "eval(".to_string(),
            regex: false,
            confidence: None,
        };
        let rule = EnsembleRule::new("r1", &config, 5).unwrap();
        let ctx = FileContext::new("a.py", "print(value)");
        assert!(evaluate_rule(&rule, &ctx).is_abstain());
    }
}
