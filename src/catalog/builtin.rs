//! Builtin default catalog, used when no SQLite catalog is supplied.
//!
//! One constructor per pattern; each exercises at least one rule kind, so
//! this file doubles as executable documentation of the configuration model.

use crate::catalog::types::{
    EnsembleRule, NegativeScope, Pattern, Priority, RuleConfig,
};

pub fn default_patterns() -> Vec<Pattern> {
    vec![
        no_eval(),
        cors_wildcard_origin(),
        unprefixed_test_double(),
        wildcard_assignment(),
        no_debug_print(),
        license_header(),
    ]
}

fn rule(id: &str, config: RuleConfig, weight: u32) -> EnsembleRule {
    EnsembleRule::new(id, &config, weight).expect("builtin rule config is valid")
}

fn no_eval() -> Pattern {
    Pattern::new("no-eval", "security", Priority::Critical)
        .with_description("Dynamic code execution via eval")
        .with_rationale(
            "eval on user-reachable input is the classic injection sink; \
             safe alternatives exist for every common use",
        )
        .with_fix_template("Replace eval() with ast.literal_eval() or an explicit dispatch table")
        .with_policy(1, 0.5)
        .with_rule(rule(
            "no-eval/literal",
            RuleConfig::Literal {
                pattern: r"\beval\s*\(".to_string(),
                regex: true,
                confidence: Some(0.9),
            },
            5,
        ))
}

fn cors_wildcard_origin() -> Pattern {
    Pattern::new("cors-wildcard-origin", "security", Priority::High)
        .with_description("CORS allows any origin via wildcard")
        .with_rationale(
            "a wildcard origin defeats the browser same-origin protection; \
             bare wildcard strings in non-CORS code are common, so matching \
             needs origin context plus glob-call exoneration",
        )
        .with_fix_template("List the allowed origins explicitly")
        .with_policy(1, 0.5)
        .with_rule(rule(
            "cors-wildcard-origin/keyword",
            RuleConfig::KeywordContext {
                pattern: r#"["']\*["']"#.to_string(),
                keywords: vec![
                    "origin".to_string(),
                    "origins".to_string(),
                    "cors".to_string(),
                ],
                confidence: Some(0.8),
            },
            5,
        ))
        .with_rule(rule(
            "cors-wildcard-origin/glob-exoneration",
            RuleConfig::NegativeEvidence {
                markers: vec![
                    "glob(".to_string(),
                    "fnmatch".to_string(),
                    "Glob::new".to_string(),
                ],
                near: Some(r#"["']\*["']"#.to_string()),
                discount: 1.0,
                scope: NegativeScope::Line,
            },
            1,
        ))
}

fn unprefixed_test_double() -> Pattern {
    Pattern::new("unprefixed-test-double", "naming", Priority::Medium)
        .with_description("Test double declared without the required prefix")
        .with_rationale(
            "mock/fake/stub helpers without the agreed prefix leak into \
             production imports unnoticed",
        )
        .with_policy(1, 0.5)
        .with_rule(rule(
            "unprefixed-test-double/naming",
            RuleConfig::NamingConvention {
                triggers: vec![
                    "mock".to_string(),
                    "fake".to_string(),
                    "stub".to_string(),
                ],
                required_prefix: "test_".to_string(),
                file_pattern: Some(r"(^|[/\\])(tests?[/\\]|test_)".to_string()),
                confidence: Some(0.7),
            },
            3,
        ))
}

fn wildcard_assignment() -> Pattern {
    Pattern::new("wildcard-assignment", "config", Priority::Medium)
        .with_description("Configuration value assigned a bare wildcard literal")
        .with_rationale(
            "a bare \"*\" assignment usually means a permission or filter \
             was opened wide as a shortcut; needs the structural view to \
             avoid flagging wildcards inside larger expressions",
        )
        .with_policy(1, 0.5)
        .with_rule(rule(
            "wildcard-assignment/syntax",
            RuleConfig::SyntaxNode {
                node_kind: "assignment".to_string(),
                predicate: crate::catalog::types::NodePredicate::RhsWildcard,
                confidence: Some(0.9),
            },
            5,
        ))
}

/// Fallback-only pattern: no ensemble rules, forbidden-substring check.
fn no_debug_print() -> Pattern {
    Pattern::new("no-debug-print", "style", Priority::Low)
        .with_description("Leftover debug printing")
        .with_rationale("console.log output in committed code is noise at best")
        .with_fix_template("Route output through the project logger")
        .with_forbidden("console.log(")
}

/// Disabled by default: enable per project via the catalog store.
fn license_header() -> Pattern {
    Pattern::new("license-header", "compliance", Priority::Optional)
        .with_description("Source file carries an SPDX license identifier")
        .with_rationale("projects that require headers want every file tagged")
        .with_required("SPDX-License-Identifier")
        .disabled()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::types::RuleKind;

    #[test]
    fn test_default_patterns_load() {
        let patterns = default_patterns();
        assert_eq!(patterns.len(), 6);
        // Unique names.
        let mut names: Vec<&str> = patterns.iter().map(|p| p.name.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 6);
    }

    #[test]
    fn test_every_rule_kind_is_exercised() {
        let patterns = default_patterns();
        let kinds: Vec<RuleKind> = patterns
            .iter()
            .flat_map(|p| p.rules.iter().map(|r| r.kind()))
            .collect();
        for kind in [
            RuleKind::Literal,
            RuleKind::SyntaxNode,
            RuleKind::KeywordContext,
            RuleKind::NegativeEvidence,
            RuleKind::NamingConvention,
        ] {
            assert!(kinds.contains(&kind), "missing rule kind {kind:?}");
        }
    }

    #[test]
    fn test_policies_are_valid() {
        for pattern in default_patterns() {
            assert!(
                pattern.policy.validate().is_ok(),
                "invalid policy on {}",
                pattern.name
            );
        }
    }

    #[test]
    fn test_fallback_pattern_has_no_rules() {
        let patterns = default_patterns();
        let fallback = patterns
            .iter()
            .find(|p| p.name == "no-debug-print")
            .unwrap();
        assert!(fallback.rules.is_empty());
        assert!(fallback.forbidden.is_some());
    }

    #[test]
    fn test_license_header_soft_disabled() {
        let patterns = default_patterns();
        let license = patterns.iter().find(|p| p.name == "license-header").unwrap();
        assert!(!license.enabled);
    }
}
