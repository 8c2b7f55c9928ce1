//! Negative-evidence evaluator: looks for exonerating context and returns
//! `Suppress` to discount or veto the other evaluators' votes for the same
//! (file, pattern) pair. Typical markers: glob/fnmatch calls, test fixture
//! paths, pattern-definition string literals.

use crate::catalog::types::NegativeScope;
use crate::ensemble::vote::Vote;
use crate::filectx::FileContext;
use regex::Regex;

pub fn evaluate(
    markers: &[String],
    near: Option<&Regex>,
    discount: f64,
    scope: NegativeScope,
    ctx: &FileContext,
) -> Vote {
    let suppressed = match scope {
        NegativeScope::File => markers.iter().any(|m| ctx.text.contains(m.as_str())),
        NegativeScope::Line => ctx.numbered_lines().any(|(_, line)| {
            let near_ok = near.is_none_or(|re| re.is_match(line));
            near_ok && markers.iter().any(|m| line.contains(m.as_str()))
        }),
    };

    if suppressed {
        Vote::Suppress { amount: discount }
    } else {
        Vote::Abstain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glob_markers() -> Vec<String> {
        vec!["glob(".to_string(), "fnmatch".to_string()]
    }

    #[test]
    fn test_line_scope_requires_co_occurrence() {
        let near = Regex::new(r#""\*""#).unwrap();
        // Wildcard inside a glob call: exonerating.
        let ctx = FileContext::new("a.py", "files = glob.glob(\"*\")");
        let vote = evaluate(&glob_markers(), Some(&near), 0.9, NegativeScope::Line, &ctx);
        assert_eq!(vote, Vote::Suppress { amount: 0.9 });

        // Wildcard with no marker on the line: no suppression.
        let ctx = FileContext::new("a.py", "origins = [\"*\"]");
        let vote = evaluate(&glob_markers(), Some(&near), 0.9, NegativeScope::Line, &ctx);
        assert_eq!(vote, Vote::Abstain);
    }

    #[test]
    fn test_line_scope_marker_on_unrelated_line() {
        let near = Regex::new(r#""\*""#).unwrap();
        // Marker exists in the file but not on the wildcard line.
        let ctx = FileContext::new("a.py", "import fnmatch\norigins = [\"*\"]");
        let vote = evaluate(&glob_markers(), Some(&near), 0.9, NegativeScope::Line, &ctx);
        assert_eq!(vote, Vote::Abstain);
    }

    #[test]
    fn test_file_scope_suppresses_anywhere() {
        let ctx = FileContext::new("conftest.py", "import fnmatch\nx = 1");
        let vote = evaluate(&glob_markers(), None, 0.5, NegativeScope::File, &ctx);
        assert_eq!(vote, Vote::Suppress { amount: 0.5 });
    }

    #[test]
    fn test_no_marker_abstains() {
        let ctx = FileContext::new("a.py", "x = 1");
        let vote = evaluate(&glob_markers(), None, 0.5, NegativeScope::File, &ctx);
        assert_eq!(vote, Vote::Abstain);
    }

    #[test]
    fn test_line_scope_without_near_regex() {
        let ctx = FileContext::new("a.py", "files = glob.glob(pattern)");
        let vote = evaluate(&glob_markers(), None, 0.4, NegativeScope::Line, &ctx);
        assert_eq!(vote, Vote::Suppress { amount: 0.4 });
    }
}
