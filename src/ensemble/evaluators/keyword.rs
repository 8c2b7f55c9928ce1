//! Keyword-context evaluator: affirms only when the pattern match co-occurs
//! with a configured contextual keyword on the same line. Cuts the false
//! positives a bare regex would produce.

use crate::catalog::types::Location;
use crate::ensemble::vote::Vote;
use crate::filectx::FileContext;
use regex::Regex;

pub fn evaluate(
    pattern: &Regex,
    keywords: &[String],
    confidence: f64,
    weight: u32,
    ctx: &FileContext,
) -> Vote {
    for (line_num, line) in ctx.numbered_lines() {
        if !pattern.is_match(line) {
            continue;
        }
        let lowered = line.to_lowercase();
        if keywords.iter().any(|k| lowered.contains(k.as_str())) {
            let column = pattern.find(line).map(|m| m.start() + 1);
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
    Vote::Abstain
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wildcard() -> Regex {
        Regex::new(r#""\*""#).unwrap()
    }

    fn keywords() -> Vec<String> {
        vec!["origin".to_string(), "cors".to_string()]
    }

    #[test]
    fn test_affirms_with_keyword_on_line() {
        let ctx = FileContext::new("app.py", "origins = [\"*\"]");
        let vote = evaluate(&wildcard(), &keywords(), 0.8, 4, &ctx);
        match vote {
            Vote::Affirm { location, .. } => assert_eq!(location.unwrap().line, 1),
            _ => panic!("expected affirm"),
        }
    }

    #[test]
    fn test_abstains_without_keyword() {
        // Same wildcard text, but no contextual keyword on the line.
        let ctx = FileContext::new("app.py", "names = glob.glob(\"*\")");
        let vote = evaluate(&wildcard(), &keywords(), 0.8, 4, &ctx);
        assert_eq!(vote, Vote::Abstain);
    }

    #[test]
    fn test_keyword_match_is_case_insensitive() {
        let ctx = FileContext::new("app.py", "CORS_ALLOWED = \"*\"");
        assert!(evaluate(&wildcard(), &keywords(), 0.8, 4, &ctx).is_affirm());
    }

    #[test]
    fn test_keyword_on_other_line_does_not_count() {
        let ctx = FileContext::new("app.py", "# cors settings\nx = \"*\"");
        assert_eq!(evaluate(&wildcard(), &keywords(), 0.8, 4, &ctx), Vote::Abstain);
    }
}
