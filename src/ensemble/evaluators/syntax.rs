//! Syntax-node predicate evaluator: affirms when a named structural
//! condition holds at a node of the configured kind.
//!
//! Requires the caller-supplied structural view; abstains when the view is
//! absent rather than guessing from raw text.

use crate::catalog::types::{CompiledPredicate, Location};
use crate::ensemble::vote::Vote;
use crate::filectx::{FileContext, SyntaxNode};

pub fn evaluate(
    node_kind: &str,
    predicate: &CompiledPredicate,
    confidence: f64,
    weight: u32,
    ctx: &FileContext,
) -> Vote {
    let Some(nodes) = ctx.syntax.as_ref() else {
        return Vote::Abstain;
    };

    for node in nodes.iter().filter(|n| n.kind == node_kind) {
        if predicate_holds(predicate, node) {
            return Vote::affirm(
                weight,
                confidence,
                Some(Location {
                    line: node.line,
                    column: node.column,
                }),
            );
        }
    }
    Vote::Abstain
}

fn predicate_holds(predicate: &CompiledPredicate, node: &SyntaxNode) -> bool {
    match predicate {
        CompiledPredicate::RhsWildcard => rhs_is_wildcard(&node.text),
        CompiledPredicate::NameContains(needle) => node
            .name
            .as_deref()
            .unwrap_or(&node.text)
            .to_lowercase()
            .contains(needle),
        CompiledPredicate::TextMatches(re) => re.is_match(&node.text),
    }
}

/// True when the right-hand side of an assignment-like node is a bare
/// wildcard literal: `x = "*"`, `x = '*'`, or a single-element `["*"]`.
fn rhs_is_wildcard(text: &str) -> bool {
    let Some((_, rhs)) = text.split_once('=') else {
        return false;
    };
    let rhs = rhs.trim().trim_end_matches([';', ',']);
    let rhs = rhs
        .trim_start_matches('[')
        .trim_end_matches(']')
        .trim();
    matches!(rhs, "\"*\"" | "'*'" | "*")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wildcard_node() -> SyntaxNode {
        SyntaxNode::new("assignment", "origins = \"*\"", 4).with_name("origins")
    }

    #[test]
    fn test_abstains_without_syntax_view() {
        let ctx = FileContext::new("a.py", "origins = \"*\"");
        let vote = evaluate(
            "assignment",
            &CompiledPredicate::RhsWildcard,
            0.9,
            5,
            &ctx,
        );
        assert_eq!(vote, Vote::Abstain);
    }

    #[test]
    fn test_rhs_wildcard_affirms() {
        let ctx = FileContext::new("a.py", "origins = \"*\"").with_syntax(vec![wildcard_node()]);
        let vote = evaluate(
            "assignment",
            &CompiledPredicate::RhsWildcard,
            0.9,
            5,
            &ctx,
        );
        match vote {
            Vote::Affirm { location, .. } => assert_eq!(location.unwrap().line, 4),
            _ => panic!("expected affirm"),
        }
    }

    #[test]
    fn test_node_kind_must_match() {
        let ctx = FileContext::new("a.py", "").with_syntax(vec![wildcard_node()]);
        let vote = evaluate("call", &CompiledPredicate::RhsWildcard, 0.9, 5, &ctx);
        assert_eq!(vote, Vote::Abstain);
    }

    #[test]
    fn test_rhs_wildcard_list_literal() {
        assert!(rhs_is_wildcard("origins = [\"*\"]"));
        assert!(rhs_is_wildcard("x = '*'"));
        assert!(rhs_is_wildcard("x = \"*\";"));
        assert!(!rhs_is_wildcard("x = \"*.py\""));
        assert!(!rhs_is_wildcard("no assignment here"));
    }

    #[test]
    fn test_name_contains_predicate() {
        let node = SyntaxNode::new("function_def", "def MockServer(): ...", 2)
            .with_name("MockServer");
        let ctx = FileContext::new("a.py", "").with_syntax(vec![node]);
        let vote = evaluate(
            "function_def",
            &CompiledPredicate::NameContains("mock".to_string()),
            0.9,
            1,
            &ctx,
        );
        assert!(vote.is_affirm());
    }

    #[test]
    fn test_text_matches_predicate() {
        let node = SyntaxNode::new("call", "subprocess.run(cmd, shell=True)", 9);
        let ctx = FileContext::new("a.py", "").with_syntax(vec![node]);
        let vote = evaluate(
            "call",
            &CompiledPredicate::TextMatches(regex::Regex::new(r"shell\s*=\s*True").unwrap()),
            0.9,
            1,
            &ctx,
        );
        assert!(vote.is_affirm());
    }
}
