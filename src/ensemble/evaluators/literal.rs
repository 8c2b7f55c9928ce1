//! Literal/regex evaluator: affirms when the configured pattern is found
//! anywhere in the file text.

use crate::catalog::types::{Location, TextMatcher};
use crate::ensemble::vote::Vote;
use crate::filectx::FileContext;

pub fn evaluate(matcher: &TextMatcher, confidence: f64, weight: u32, ctx: &FileContext) -> Vote {
    for (line_num, line) in ctx.numbered_lines() {
        if let Some(column) = match_column(matcher, line) {
            return Vote::affirm(
                weight,
                confidence,
                Some(Location {
                    line: line_num,
                    column: Some(column),
                }),
            );
        }
    }
    Vote::Abstain
}

/// 1-based column of the first match on the line, if any.
fn match_column(matcher: &TextMatcher, line: &str) -> Option<usize> {
    match matcher {
        TextMatcher::Substring(s) => line.find(s.as_str()).map(|i| i + 1),
        TextMatcher::Pattern(re) => re.find(line).map(|m| m.start() + 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    #[test]
    fn test_substring_match_with_location() {
        let matcher = TextMatcher::Substring("eval(".to_string());
        let ctx = FileContext::new("a.py", "x = 1\ny = eval(x)");
        let vote = evaluate(&matcher, 0.6, 3, &ctx);
        match vote {
            Vote::Affirm {
                weight,
                confidence,
                location,
            } => {
                assert_eq!(weight, 3);
                assert_eq!(confidence, 0.6);
                let loc = location.unwrap();
                assert_eq!(loc.line, 2);
                assert_eq!(loc.column, Some(5));
            }
            _ => panic!("expected affirm"),
        }
    }

    #[test]
    fn test_regex_match() {
        let matcher = TextMatcher::Pattern(Regex::new(r"eval\s*\(").unwrap());
        let ctx = FileContext::new("a.py", "y = eval (x)");
        assert!(evaluate(&matcher, 0.6, 1, &ctx).is_affirm());
    }

    #[test]
    fn test_no_match_abstains() {
        let matcher = TextMatcher::Substring("eval(".to_string());
        let ctx = FileContext::new("a.py", "print('hello')");
        assert_eq!(evaluate(&matcher, 0.6, 1, &ctx), Vote::Abstain);
    }

    #[test]
    fn test_first_match_wins() {
        let matcher = TextMatcher::Substring("eval(".to_string());
        let ctx = FileContext::new("a.py", "eval(a)\neval(b)");
        match evaluate(&matcher, 0.6, 1, &ctx) {
            Vote::Affirm { location, .. } => assert_eq!(location.unwrap().line, 1),
            _ => panic!("expected affirm"),
        }
    }
}
