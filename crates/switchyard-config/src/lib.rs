#![allow(clippy::must_use_candidate)]

mod env;
pub mod logging;
mod loader;
pub mod pricing;

use indexmap::IndexMap;
use serde::Deserialize;
use switchyard_core::InvocationParams;
use switchyard_core::summary::DEFAULT_CONTEXT_TOKENS;
use switchyard_guardrails::Rule;

pub use env::ExpandError;
pub use logging::{LogFormat, LoggingConfig};
pub use pricing::PricingEntry;

/// Top-level Switchyard configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Default invocation parameters per provider id
    #[serde(default)]
    pub providers: IndexMap<String, InvocationParams>,
    /// Model prices for cost estimation
    #[serde(default)]
    pub pricing: Vec<PricingEntry>,
    /// Long-text summarisation
    #[serde(default)]
    pub summary: SummaryConfig,
    /// Rules for the local moderation backend
    #[serde(default)]
    pub moderation: ModerationConfig,
}

/// Summarisation settings
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SummaryConfig {
    /// Context window of the summarising model, in tokens
    #[serde(default = "default_context_tokens")]
    pub context_tokens: u32,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            context_tokens: DEFAULT_CONTEXT_TOKENS,
        }
    }
}

const fn default_context_tokens() -> u32 {
    DEFAULT_CONTEXT_TOKENS
}

/// Local moderation rules
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModerationConfig {
    /// Classification rules; a single "inappropriate" keyword rule when unset
    #[serde(default = "switchyard_guardrails::default_rules")]
    pub rules: Vec<Rule>,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            rules: switchyard_guardrails::default_rules(),
        }
    }
}
