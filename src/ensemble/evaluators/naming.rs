//! Naming-convention evaluator: affirms when a declared identifier hits the
//! trigger vocabulary (e.g. "mock", "fake", "stub") but lacks the required
//! prefix. An optional file-path regex restricts scope, typically to test
//! files.

use crate::catalog::types::Location;
use crate::ensemble::vote::Vote;
use crate::filectx::FileContext;
use regex::Regex;
use std::sync::LazyLock;

/// Shallow declaration matcher covering the languages this scanner meets in
/// practice. Not a parser; good enough to pull out declared names.
static DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:fn|def|function|class)\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap()
});

pub fn evaluate(
    triggers: &[String],
    required_prefix: &str,
    file_pattern: Option<&Regex>,
    confidence: f64,
    weight: u32,
    ctx: &FileContext,
) -> Vote {
    if let Some(re) = file_pattern {
        if !re.is_match(&ctx.path_str()) {
            return Vote::Abstain;
        }
    }

    for (line_num, line) in ctx.numbered_lines() {
        for caps in DECLARATION.captures_iter(line) {
            let name = &caps[1];
            let lowered = name.to_lowercase();
            let triggered = triggers.iter().any(|t| lowered.contains(t.as_str()));
            if triggered && !name.starts_with(required_prefix) {
                let column = caps.get(1).map(|m| m.start() + 1);
                return Vote::affirm(
                    weight,
                    confidence,
                    Some(Location {
                        line: line_num,
                        column,
                    }),
                );
            }
        }
    }
    Vote::Abstain
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triggers() -> Vec<String> {
        vec!["mock".to_string(), "fake".to_string(), "stub".to_string()]
    }

    #[test]
    fn test_unprefixed_mock_affirms() {
        let ctx = FileContext::new("test_api.py", "def mock_server():\n    pass");
        let vote = evaluate(&triggers(), "test_", None, 0.7, 2, &ctx);
        match vote {
            Vote::Affirm { location, .. } => assert_eq!(location.unwrap().line, 1),
            _ => panic!("expected affirm"),
        }
    }

    #[test]
    fn test_prefixed_identifier_passes() {
        let ctx = FileContext::new("test_api.py", "def test_mock_server():\n    pass");
        let vote = evaluate(&triggers(), "test_", None, 0.7, 2, &ctx);
        assert_eq!(vote, Vote::Abstain);
    }

    #[test]
    fn test_trigger_match_is_case_insensitive() {
        let ctx = FileContext::new("spec.ts", "function FakeClient() {}");
        assert!(evaluate(&triggers(), "test_", None, 0.7, 2, &ctx).is_affirm());
    }

    #[test]
    fn test_file_pattern_restricts_scope() {
        let test_only = Regex::new(r"test_.*\.py$").unwrap();
        let ctx = FileContext::new("src/server.py", "def mock_response():\n    pass");
        let vote = evaluate(&triggers(), "test_", Some(&test_only), 0.7, 2, &ctx);
        assert_eq!(vote, Vote::Abstain);

        let ctx = FileContext::new("test_server.py", "def mock_response():\n    pass");
        let vote = evaluate(&triggers(), "test_", Some(&test_only), 0.7, 2, &ctx);
        assert!(vote.is_affirm());
    }

    #[test]
    fn test_non_declaration_mentions_ignored() {
        let ctx = FileContext::new("test_api.py", "value = mock_data[0]");
        assert_eq!(evaluate(&triggers(), "test_", None, 0.7, 2, &ctx), Vote::Abstain);
    }

    #[test]
    fn test_rust_and_class_declarations() {
        let ctx = FileContext::new("tests/util.rs", "fn stub_handler() {}");
        assert!(evaluate(&triggers(), "test_", None, 0.7, 2, &ctx).is_affirm());

        let ctx = FileContext::new("tests/util.py", "class StubTransport:");
        assert!(evaluate(&triggers(), "Test", None, 0.7, 2, &ctx).is_affirm());
    }
}
