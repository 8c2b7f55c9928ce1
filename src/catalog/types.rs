use crate::error::{LintError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Priority tier for a pattern. Ordering is ascending, so
/// `Mandatory > Critical > High > Medium > Low > Optional`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Optional,
    Low,
    #[default]
    Medium,
    High,
    Critical,
    Mandatory,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Optional => "optional",
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
            Priority::Mandatory => "mandatory",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "optional" => Some(Priority::Optional),
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            "critical" => Some(Priority::Critical),
            "mandatory" => Some(Priority::Mandatory),
            _ => None,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

/// Per-pattern voting configuration. Both conditions must be satisfied
/// before a verdict of violation is confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VotePolicy {
    /// Minimum count of affirmative rule votes.
    pub min_votes: u32,
    /// Minimum aggregate confidence, in `[0, 1]`.
    pub confidence_threshold: f64,
}

impl Default for VotePolicy {
    fn default() -> Self {
        Self {
            min_votes: 1,
            confidence_threshold: 0.5,
        }
    }
}

impl VotePolicy {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.min_votes == 0 {
            return Err("min_votes must be positive".to_string());
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(format!(
                "confidence_threshold {} outside [0, 1]",
                self.confidence_threshold
            ));
        }
        Ok(())
    }
}

/// Closed set of ensemble rule kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Literal,
    SyntaxNode,
    KeywordContext,
    NegativeEvidence,
    NamingConvention,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::Literal => "literal",
            RuleKind::SyntaxNode => "syntax_node",
            RuleKind::KeywordContext => "keyword_context",
            RuleKind::NegativeEvidence => "negative_evidence",
            RuleKind::NamingConvention => "naming_convention",
        }
    }
}

/// Named structural condition checked by syntax-node rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "check")]
pub enum NodePredicate {
    /// Right-hand side of the node is a bare wildcard literal (`"*"`).
    RhsWildcard,
    /// Node name contains the given needle (case-insensitive).
    NameContains { needle: String },
    /// Node text matches the given regex.
    TextMatches { pattern: String },
}

/// Scope of a negative-evidence rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NegativeScope {
    /// Markers must co-occur with the `near` trigger on one line.
    #[default]
    Line,
    /// Markers anywhere in the file suppress.
    File,
}

/// Raw, serializable configuration payload for one ensemble rule.
///
/// One variant per rule kind; the payload is validated and compiled into a
/// [`RuleCheck`] exactly once at catalog-load time, never at evaluation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum RuleConfig {
    Literal {
        /// Substring or regex to search for.
        pattern: String,
        /// Interpret `pattern` as a regex instead of a plain substring.
        #[serde(default)]
        regex: bool,
        /// Fixed confidence for an affirmative vote.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        confidence: Option<f64>,
    },
    SyntaxNode {
        /// Syntax-node kind the predicate applies to (e.g. "assignment").
        node_kind: String,
        #[serde(flatten)]
        predicate: NodePredicate,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        confidence: Option<f64>,
    },
    KeywordContext {
        /// Regex the line must match.
        pattern: String,
        /// Contextual keywords; at least one must co-occur on the line.
        keywords: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        confidence: Option<f64>,
    },
    NegativeEvidence {
        /// Exonerating markers (e.g. `glob(`, `fnmatch`).
        markers: Vec<String>,
        /// Optional regex a line must also match for line-scoped suppression.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        near: Option<String>,
        /// Amount subtracted from aggregate confidence, in `[0, 1]`.
        discount: f64,
        #[serde(default)]
        scope: NegativeScope,
    },
    NamingConvention {
        /// Trigger vocabulary matched against declared identifiers.
        triggers: Vec<String>,
        /// Prefix the identifier must carry to be exempt.
        required_prefix: String,
        /// Optional regex restricting the rule to matching file paths.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file_pattern: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        confidence: Option<f64>,
    },
}

impl RuleConfig {
    pub fn kind(&self) -> RuleKind {
        match self {
            RuleConfig::Literal { .. } => RuleKind::Literal,
            RuleConfig::SyntaxNode { .. } => RuleKind::SyntaxNode,
            RuleConfig::KeywordContext { .. } => RuleKind::KeywordContext,
            RuleConfig::NegativeEvidence { .. } => RuleKind::NegativeEvidence,
            RuleConfig::NamingConvention { .. } => RuleKind::NamingConvention,
        }
    }
}

/// Validated, compiled form of a rule configuration.
///
/// Construction is the single validation point: regexes are compiled,
/// numeric ranges checked, empty vocabularies rejected. Evaluation over a
/// `RuleCheck` cannot fail.
#[derive(Debug, Clone)]
pub enum RuleCheck {
    Literal {
        matcher: TextMatcher,
        confidence: f64,
    },
    SyntaxNode {
        node_kind: String,
        predicate: CompiledPredicate,
        confidence: f64,
    },
    KeywordContext {
        pattern: Regex,
        keywords: Vec<String>,
        confidence: f64,
    },
    NegativeEvidence {
        markers: Vec<String>,
        near: Option<Regex>,
        discount: f64,
        scope: NegativeScope,
    },
    NamingConvention {
        triggers: Vec<String>,
        required_prefix: String,
        file_pattern: Option<Regex>,
        confidence: f64,
    },
}

/// Plain-substring or regex text matcher for literal rules.
#[derive(Debug, Clone)]
pub enum TextMatcher {
    Substring(String),
    Pattern(Regex),
}

impl TextMatcher {
    pub fn is_match(&self, line: &str) -> bool {
        match self {
            TextMatcher::Substring(s) => line.contains(s.as_str()),
            TextMatcher::Pattern(re) => re.is_match(line),
        }
    }
}

/// Compiled form of [`NodePredicate`].
#[derive(Debug, Clone)]
pub enum CompiledPredicate {
    RhsWildcard,
    NameContains(String),
    TextMatches(Regex),
}

fn check_confidence(confidence: Option<f64>, default: f64) -> std::result::Result<f64, String> {
    let value = confidence.unwrap_or(default);
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("confidence {value} outside [0, 1]"))
    }
}

impl RuleCheck {
    /// Compile a raw configuration, validating kind/payload consistency.
    pub fn compile(config: &RuleConfig) -> std::result::Result<Self, String> {
        match config {
            RuleConfig::Literal {
                pattern,
                regex,
                confidence,
            } => {
                if pattern.is_empty() {
                    return Err("literal pattern must not be empty".to_string());
                }
                let matcher = if *regex {
                    TextMatcher::Pattern(
                        Regex::new(pattern).map_err(|e| format!("bad regex: {e}"))?,
                    )
                } else {
                    TextMatcher::Substring(pattern.clone())
                };
                Ok(RuleCheck::Literal {
                    matcher,
                    confidence: check_confidence(*confidence, 0.6)?,
                })
            }
            RuleConfig::SyntaxNode {
                node_kind,
                predicate,
                confidence,
            } => {
                if node_kind.is_empty() {
                    return Err("node_kind must not be empty".to_string());
                }
                let predicate = match predicate {
                    NodePredicate::RhsWildcard => CompiledPredicate::RhsWildcard,
                    NodePredicate::NameContains { needle } => {
                        if needle.is_empty() {
                            return Err("name_contains needle must not be empty".to_string());
                        }
                        CompiledPredicate::NameContains(needle.to_lowercase())
                    }
                    NodePredicate::TextMatches { pattern } => CompiledPredicate::TextMatches(
                        Regex::new(pattern).map_err(|e| format!("bad regex: {e}"))?,
                    ),
                };
                Ok(RuleCheck::SyntaxNode {
                    node_kind: node_kind.clone(),
                    predicate,
                    confidence: check_confidence(*confidence, 0.9)?,
                })
            }
            RuleConfig::KeywordContext {
                pattern,
                keywords,
                confidence,
            } => {
                if keywords.is_empty() {
                    return Err("keyword_context requires at least one keyword".to_string());
                }
                Ok(RuleCheck::KeywordContext {
                    pattern: Regex::new(pattern).map_err(|e| format!("bad regex: {e}"))?,
                    keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
                    confidence: check_confidence(*confidence, 0.8)?,
                })
            }
            RuleConfig::NegativeEvidence {
                markers,
                near,
                discount,
                scope,
            } => {
                if markers.is_empty() {
                    return Err("negative_evidence requires at least one marker".to_string());
                }
                if !(0.0..=1.0).contains(discount) {
                    return Err(format!("discount {discount} outside [0, 1]"));
                }
                let near = match near {
                    Some(p) => {
                        Some(Regex::new(p).map_err(|e| format!("bad regex: {e}"))?)
                    }
                    None => None,
                };
                Ok(RuleCheck::NegativeEvidence {
                    markers: markers.clone(),
                    near,
                    discount: *discount,
                    scope: *scope,
                })
            }
            RuleConfig::NamingConvention {
                triggers,
                required_prefix,
                file_pattern,
                confidence,
            } => {
                if triggers.is_empty() {
                    return Err("naming_convention requires at least one trigger".to_string());
                }
                if required_prefix.is_empty() {
                    return Err("required_prefix must not be empty".to_string());
                }
                let file_pattern = match file_pattern {
                    Some(p) => {
                        Some(Regex::new(p).map_err(|e| format!("bad regex: {e}"))?)
                    }
                    None => None,
                };
                Ok(RuleCheck::NamingConvention {
                    triggers: triggers.iter().map(|t| t.to_lowercase()).collect(),
                    required_prefix: required_prefix.clone(),
                    file_pattern,
                    confidence: check_confidence(*confidence, 0.7)?,
                })
            }
        }
    }

    pub fn kind(&self) -> RuleKind {
        match self {
            RuleCheck::Literal { .. } => RuleKind::Literal,
            RuleCheck::SyntaxNode { .. } => RuleKind::SyntaxNode,
            RuleCheck::KeywordContext { .. } => RuleKind::KeywordContext,
            RuleCheck::NegativeEvidence { .. } => RuleKind::NegativeEvidence,
            RuleCheck::NamingConvention { .. } => RuleKind::NamingConvention,
        }
    }
}

/// One independent detection strategy contributing a vote toward its
/// owning pattern's verdict.
#[derive(Debug, Clone)]
pub struct EnsembleRule {
    pub id: String,
    /// Raw configuration, kept for persistence and export.
    pub config: RuleConfig,
    /// Compiled form used at evaluation time.
    pub check: RuleCheck,
    /// Vote weight; also the evaluation-order tie-break (descending).
    pub weight: u32,
    pub enabled: bool,
}

impl EnsembleRule {
    pub fn new(id: impl Into<String>, config: &RuleConfig, weight: u32) -> Result<Self> {
        let id = id.into();
        let check = RuleCheck::compile(config).map_err(|message| LintError::RuleConfig {
            pattern: id.clone(),
            message,
        })?;
        Ok(Self {
            id,
            config: config.clone(),
            check,
            weight,
            enabled: true,
        })
    }

    pub fn kind(&self) -> RuleKind {
        self.check.kind()
    }
}

/// Usage statistics tracked per pattern across scans.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageStats {
    pub times_checked: u64,
    pub times_matched: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used: Option<chrono::DateTime<chrono::Utc>>,
}

impl UsageStats {
    pub fn success_rate(&self) -> f64 {
        if self.times_checked == 0 {
            0.0
        } else {
            self.times_matched as f64 / self.times_checked as f64
        }
    }
}

/// A named code-quality rule with its ensemble of detection strategies.
#[derive(Debug, Clone)]
pub struct Pattern {
    pub name: String,
    pub category: String,
    pub priority: Priority,
    pub description: String,
    pub rationale: String,
    pub fix_template: Option<String>,
    pub enabled: bool,
    pub policy: VotePolicy,
    pub rules: Vec<EnsembleRule>,
    /// Fallback check when no ensemble rules are enabled: violation if this
    /// substring is present.
    pub forbidden: Option<String>,
    /// Fallback check: violation if this substring is absent.
    pub required: Option<String>,
    pub usage: UsageStats,
}

impl Pattern {
    pub fn new(name: impl Into<String>, category: impl Into<String>, priority: Priority) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            priority,
            description: String::new(),
            rationale: String::new(),
            fix_template: None,
            enabled: true,
            policy: VotePolicy::default(),
            rules: Vec::new(),
            forbidden: None,
            required: None,
            usage: UsageStats::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = rationale.into();
        self
    }

    pub fn with_fix_template(mut self, template: impl Into<String>) -> Self {
        self.fix_template = Some(template.into());
        self
    }

    pub fn with_policy(mut self, min_votes: u32, confidence_threshold: f64) -> Self {
        self.policy = VotePolicy {
            min_votes,
            confidence_threshold,
        };
        self
    }

    pub fn with_rule(mut self, rule: EnsembleRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_forbidden(mut self, substring: impl Into<String>) -> Self {
        self.forbidden = Some(substring.into());
        self
    }

    pub fn with_required(mut self, substring: impl Into<String>) -> Self {
        self.required = Some(substring.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Enabled rules in descending weight order (id as stable tie-break).
    pub fn enabled_rules(&self) -> Vec<&EnsembleRule> {
        let mut rules: Vec<&EnsembleRule> =
            self.rules.iter().filter(|r| r.enabled).collect();
        rules.sort_by(|a, b| b.weight.cmp(&a.weight).then_with(|| a.id.cmp(&b.id)));
        rules
    }
}

/// A confirmed pattern violation at a concrete location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    pub pattern: String,
    pub category: String,
    pub priority: Priority,
    pub file: String,
    pub line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
    pub matched: String,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_fix: Option<String>,
    pub auto_fixable: bool,
}

/// Line/column position inside a file. Lines are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
}

impl Location {
    pub fn line(line: usize) -> Self {
        Self { line, column: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::Mandatory > Priority::Critical);
        assert!(Priority::Critical > Priority::High);
        assert!(Priority::High > Priority::Medium);
        assert!(Priority::Medium > Priority::Low);
        assert!(Priority::Low > Priority::Optional);
    }

    #[test]
    fn test_priority_display() {
        assert_eq!(format!("{}", Priority::Mandatory), "MANDATORY");
        assert_eq!(format!("{}", Priority::Optional), "OPTIONAL");
    }

    #[test]
    fn test_priority_parse_roundtrip() {
        for p in [
            Priority::Optional,
            Priority::Low,
            Priority::Medium,
            Priority::High,
            Priority::Critical,
            Priority::Mandatory,
        ] {
            assert_eq!(Priority::parse(p.as_str()), Some(p));
        }
        assert_eq!(Priority::parse("urgent"), None);
    }

    #[test]
    fn test_vote_policy_default() {
        let policy = VotePolicy::default();
        assert_eq!(policy.min_votes, 1);
        assert_eq!(policy.confidence_threshold, 0.5);
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_vote_policy_rejects_zero_quorum() {
        let policy = VotePolicy {
            min_votes: 0,
            confidence_threshold: 0.5,
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_vote_policy_rejects_out_of_range_threshold() {
        let policy = VotePolicy {
            min_votes: 1,
            confidence_threshold: 1.5,
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_rule_config_kind_tags() {
        let config = RuleConfig::Literal {
            pattern: "eval(".to_string(),
            regex: false,
            confidence: None,
        };
        assert_eq!(config.kind(), RuleKind::Literal);

        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["kind"], "literal");
    }

    #[test]
    fn test_rule_config_deserialization() {
        let json = r#"{
            "kind": "keyword_context",
            "pattern": "\\*",
            "keywords": ["origin", "cors"]
        }"#;
        let config: RuleConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.kind(), RuleKind::KeywordContext);
    }

    #[test]
    fn test_rule_config_unknown_kind_rejected() {
        let json = r#"{"kind": "quantum", "pattern": "x"}"#;
        assert!(serde_json::from_str::<RuleConfig>(json).is_err());
    }

    #[test]
    fn test_compile_literal_substring() {
        let config = RuleConfig::Literal {
            pattern: "eval(".to_string(),
            regex: false,
            confidence: Some(0.9),
        };
        let check = RuleCheck::compile(&config).unwrap();
        assert_eq!(check.kind(), RuleKind::Literal);
        match check {
            RuleCheck::Literal { matcher, confidence } => {
                assert!(matcher.is_match("eval(x)"));
                assert!(!matcher.is_match("evaluate(x)"));
                assert_eq!(confidence, 0.9);
            }
            _ => panic!("expected literal check"),
        }
    }

    #[test]
    fn test_compile_literal_bad_regex() {
        let config = RuleConfig::Literal {
            pattern: "(unclosed".to_string(),
            regex: true,
            confidence: None,
        };
        assert!(RuleCheck::compile(&config).is_err());
    }

    #[test]
    fn test_compile_rejects_empty_pattern() {
        let config = RuleConfig::Literal {
            pattern: String::new(),
            regex: false,
            confidence: None,
        };
        assert!(RuleCheck::compile(&config).is_err());
    }

    #[test]
    fn test_compile_rejects_out_of_range_confidence() {
        let config = RuleConfig::Literal {
            pattern: "x".to_string(),
            regex: false,
            confidence: Some(1.5),
        };
        assert!(RuleCheck::compile(&config).is_err());
    }

    #[test]
    fn test_compile_negative_evidence_rejects_empty_markers() {
        let config = RuleConfig::NegativeEvidence {
            markers: vec![],
            near: None,
            discount: 0.5,
            scope: NegativeScope::Line,
        };
        assert!(RuleCheck::compile(&config).is_err());
    }

    #[test]
    fn test_compile_negative_evidence_rejects_bad_discount() {
        let config = RuleConfig::NegativeEvidence {
            markers: vec!["glob(".to_string()],
            near: None,
            discount: 2.0,
            scope: NegativeScope::File,
        };
        assert!(RuleCheck::compile(&config).is_err());
    }

    #[test]
    fn test_compile_naming_convention() {
        let config = RuleConfig::NamingConvention {
            triggers: vec!["Mock".to_string()],
            required_prefix: "test_".to_string(),
            file_pattern: None,
            confidence: None,
        };
        let check = RuleCheck::compile(&config).unwrap();
        assert_eq!(check.kind(), RuleKind::NamingConvention);
    }

    #[test]
    fn test_ensemble_rule_new_validates() {
        let config = RuleConfig::Literal {
            pattern: "(bad".to_string(),
            regex: true,
            confidence: None,
        };
        let err = EnsembleRule::new("r1", &config, 10).unwrap_err();
        assert!(err.to_string().contains("Invalid rule configuration"));
    }

    #[test]
    fn test_enabled_rules_sorted_by_weight() {
        let low = RuleConfig::Literal {
            pattern: "a".to_string(),
            regex: false,
            confidence: None,
        };
        let high = RuleConfig::Literal {
            pattern: "b".to_string(),
            regex: false,
            confidence: None,
        };
        let mut disabled = EnsembleRule::new("off", &low, 99).unwrap();
        disabled.enabled = false;

        let pattern = Pattern::new("p", "style", Priority::Medium)
            .with_rule(EnsembleRule::new("weak", &low, 1).unwrap())
            .with_rule(EnsembleRule::new("strong", &high, 10).unwrap())
            .with_rule(disabled);

        let rules = pattern.enabled_rules();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].id, "strong");
        assert_eq!(rules[1].id, "weak");
    }

    #[test]
    fn test_usage_stats_success_rate() {
        let stats = UsageStats {
            times_checked: 10,
            times_matched: 3,
            last_used: None,
        };
        assert_eq!(stats.success_rate(), 0.3);
        assert_eq!(UsageStats::default().success_rate(), 0.0);
    }

    #[test]
    fn test_pattern_builder() {
        let pattern = Pattern::new("no-eval", "security", Priority::Critical)
            .with_description("eval call")
            .with_policy(2, 0.7)
            .with_forbidden("eval(");
        assert_eq!(pattern.policy.min_votes, 2);
        assert_eq!(pattern.forbidden.as_deref(), Some("eval("));
        assert!(pattern.enabled);
        assert!(!pattern.disabled().enabled);
    }

    #[test]
    fn test_violation_serialization_skips_empty_column() {
        let v = Violation {
            pattern: "no-eval".to_string(),
            category: "security".to_string(),
            priority: Priority::Critical,
            file: "a.py".to_string(),
            line: 3,
            column: None,
            matched: "eval(x)".to_string(),
            confidence: 0.9,
            suggested_fix: None,
            auto_fixable: false,
        };
        let json = serde_json::to_string(&v).unwrap();
        assert!(!json.contains("column"));
        assert!(json.contains("\"priority\":\"critical\""));
    }
}
