//! Rule-based content classification
//!
//! Compiles keyword lists, regex patterns and PII detectors into a
//! classifier that reports which harm categories a piece of text falls
//! into and at what severity. Used by the local moderation backend when no
//! vendor classifier is wired in.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

/// Severity assigned to a rule match when the rule does not set one
pub const DEFAULT_SEVERITY: u8 = 6;

/// Highest severity a rule may carry
pub const MAX_SEVERITY: u8 = 7;

/// Guardrails errors
#[derive(Debug, Error)]
pub enum GuardrailError {
    /// Invalid regex pattern in configuration
    #[error("invalid regex pattern in rule `{rule}`: {message}")]
    InvalidPattern {
        /// Name of the offending rule
        rule: String,
        /// Compiler error message
        message: String,
    },
    /// Severity outside the accepted range
    #[error("rule `{rule}` has severity {severity}, maximum is {MAX_SEVERITY}")]
    InvalidSeverity {
        /// Name of the offending rule
        rule: String,
        /// Configured severity
        severity: u8,
    },
}

/// A single classification rule
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum Rule {
    /// Case-insensitive substring match against a keyword list
    Keyword {
        /// Rule name for logging
        name: String,
        /// Category reported on match
        category: String,
        /// Keywords to match against
        keywords: Vec<String>,
        /// Severity reported on match
        #[serde(default = "default_severity")]
        severity: u8,
    },
    /// Regular expression match
    Regex {
        /// Rule name for logging
        name: String,
        /// Category reported on match
        category: String,
        /// Pattern to match
        pattern: String,
        /// Severity reported on match
        #[serde(default = "default_severity")]
        severity: u8,
    },
    /// Common PII patterns
    Pii {
        /// Rule name for logging
        name: String,
        /// Category reported on match
        #[serde(default = "default_pii_category")]
        category: String,
        /// PII types to detect
        #[serde(default)]
        detect: Vec<PiiType>,
        /// Severity reported on match
        #[serde(default = "default_severity")]
        severity: u8,
    },
}

const fn default_severity() -> u8 {
    DEFAULT_SEVERITY
}

fn default_pii_category() -> String {
    "PersonalData".to_owned()
}

/// Types of PII to detect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PiiType {
    /// US Social Security numbers (XXX-XX-XXXX)
    Ssn,
    /// Credit card numbers (13-19 digit sequences)
    CreditCard,
    /// Email addresses
    Email,
    /// US phone numbers
    Phone,
}

/// The rule set used when nothing is configured
///
/// A single keyword rule flagging text containing "inappropriate".
#[must_use]
pub fn default_rules() -> Vec<Rule> {
    vec![Rule::Keyword {
        name: "inappropriate-language".to_owned(),
        category: "Hate".to_owned(),
        keywords: vec!["inappropriate".to_owned()],
        severity: DEFAULT_SEVERITY,
    }]
}

/// Compiled rule set
#[derive(Debug)]
pub struct Classifier {
    rules: Vec<CompiledRule>,
}

#[derive(Debug)]
struct CompiledRule {
    name: String,
    category: String,
    severity: u8,
    matcher: RuleMatcher,
}

#[derive(Debug)]
enum RuleMatcher {
    Keywords(Vec<String>),
    Regex(Regex),
    Pii(Vec<PiiType>),
}

/// One rule that matched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryMatch {
    /// Rule that produced the match
    pub rule: String,
    /// Category the rule reports
    pub category: String,
    /// Severity the rule reports
    pub severity: u8,
    /// Human-readable reason
    pub reason: String,
}

/// Outcome of classifying one text
#[derive(Debug, Clone, Default)]
pub struct Classification {
    /// Every rule that matched, in rule order
    pub matches: Vec<CategoryMatch>,
}

impl Classification {
    /// Highest severity among the matches, zero when nothing matched
    #[must_use]
    pub fn max_severity(&self) -> u8 {
        self.matches.iter().map(|m| m.severity).max().unwrap_or(0)
    }

    /// Whether any match reaches `threshold`
    #[must_use]
    pub fn is_flagged(&self, threshold: u8) -> bool {
        !self.matches.is_empty() && self.max_severity() >= threshold
    }
}

impl Classifier {
    /// Compile a set of rules
    ///
    /// # Errors
    ///
    /// Returns an error if a regex pattern is invalid or a severity is out of range
    pub fn new(rules: &[Rule]) -> Result<Self, GuardrailError> {
        let compiled = rules.iter().map(compile_rule).collect::<Result<Vec<_>, _>>()?;

        Ok(Self { rules: compiled })
    }

    /// Classify text against every rule
    #[must_use]
    pub fn classify(&self, content: &str) -> Classification {
        let lower = content.to_lowercase();

        let matches = self
            .rules
            .iter()
            .filter_map(|rule| {
                let reason = rule.matcher.matches(content, &lower)?;
                tracing::debug!(rule = %rule.name, category = %rule.category, %reason, "guardrail rule matched");
                Some(CategoryMatch {
                    rule: rule.name.clone(),
                    category: rule.category.clone(),
                    severity: rule.severity,
                    reason,
                })
            })
            .collect();

        Classification { matches }
    }

    /// Returns true if no rules are configured
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Distinct categories this classifier can report, in rule order
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();
        for rule in &self.rules {
            if !categories.contains(&rule.category.as_str()) {
                categories.push(&rule.category);
            }
        }
        categories
    }
}

impl RuleMatcher {
    fn matches(&self, original: &str, lowered: &str) -> Option<String> {
        match self {
            Self::Keywords(keywords) => keywords
                .iter()
                .find(|keyword| lowered.contains(keyword.as_str()))
                .map(|keyword| format!("matched keyword: {keyword}")),
            Self::Regex(pattern) => pattern
                .is_match(original)
                .then(|| format!("matched pattern: {}", pattern.as_str())),
            Self::Pii(detectors) => detectors
                .iter()
                .find(|pii_type| pii_regex(**pii_type).is_match(original))
                .map(|pii_type| format!("detected {pii_type:?} pattern")),
        }
    }
}

fn compile_rule(rule: &Rule) -> Result<CompiledRule, GuardrailError> {
    let (name, category, severity, matcher) = match rule {
        Rule::Keyword {
            name,
            category,
            keywords,
            severity,
        } => {
            let lowered = keywords.iter().map(|k| k.to_lowercase()).collect();
            (name, category, *severity, RuleMatcher::Keywords(lowered))
        }
        Rule::Regex {
            name,
            category,
            pattern,
            severity,
        } => {
            let compiled = Regex::new(pattern).map_err(|e| GuardrailError::InvalidPattern {
                rule: name.clone(),
                message: e.to_string(),
            })?;
            (name, category, *severity, RuleMatcher::Regex(compiled))
        }
        Rule::Pii {
            name,
            category,
            detect,
            severity,
        } => (name, category, *severity, RuleMatcher::Pii(detect.clone())),
    };

    if severity > MAX_SEVERITY {
        return Err(GuardrailError::InvalidSeverity {
            rule: name.clone(),
            severity,
        });
    }

    Ok(CompiledRule {
        name: name.clone(),
        category: category.clone(),
        severity,
        matcher,
    })
}

/// Get the compiled regex for a PII type
fn pii_regex(pii_type: PiiType) -> &'static Regex {
    match pii_type {
        PiiType::Ssn => ssn_regex(),
        PiiType::CreditCard => credit_card_regex(),
        PiiType::Email => email_regex(),
        PiiType::Phone => phone_regex(),
    }
}

fn ssn_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").expect("valid SSN regex"))
}

fn credit_card_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(?:\d[ -]*?){13,19}\b").expect("valid credit card regex"))
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("valid email regex"))
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(?:\+?1[-.\s]?)?\(?[2-9]\d{2}\)?[-.\s]?\d{3}[-.\s]?\d{4}\b").expect("valid phone regex")
    })
}
