//! Token and cost estimation
//!
//! Token counts are a character heuristic (four characters per token), not
//! tokenizer-accurate. Every built-in provider estimator uses it, and the
//! router falls back to it for providers without one.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capability::ProviderId;
use crate::types::{PromptMessage, ToolSpec, Usage};

/// Characters per estimated token
pub const CHARS_PER_TOKEN: usize = 4;

/// Estimated tokens in a piece of text
pub fn estimate_text_tokens(text: &str) -> u32 {
    u32::try_from(text.chars().count() / CHARS_PER_TOKEN).unwrap_or(u32::MAX)
}

/// Estimated prompt tokens of a conversation
///
/// Sums the per-message estimate; tool definitions are not counted.
pub fn generic_token_count(messages: &[PromptMessage], _tools: &[ToolSpec]) -> u32 {
    messages
        .iter()
        .fold(0u32, |total, m| total.saturating_add(estimate_text_tokens(&m.content)))
}

/// Estimated tokens of each text, in input order
pub fn generic_embedding_token_count(texts: &[String]) -> Vec<u32> {
    texts.iter().map(|t| estimate_text_tokens(t)).collect()
}

/// Failure inside a provider token estimator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("token estimation failed: {0}")]
pub struct EstimateError(pub String);

/// Provider-specific token estimation
pub trait TokenEstimator: Send + Sync {
    /// Prompt tokens of a conversation
    fn count_tokens(&self, messages: &[PromptMessage], tools: &[ToolSpec]) -> Result<u32, EstimateError>;

    /// Tokens of each embedding input, same length and order as `texts`
    fn count_embedding_tokens(&self, texts: &[String]) -> Result<Vec<u32>, EstimateError>;
}

/// The four-characters-per-token heuristic as a [`TokenEstimator`]
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicEstimator;

impl TokenEstimator for HeuristicEstimator {
    fn count_tokens(&self, messages: &[PromptMessage], tools: &[ToolSpec]) -> Result<u32, EstimateError> {
        Ok(generic_token_count(messages, tools))
    }

    fn count_embedding_tokens(&self, texts: &[String]) -> Result<Vec<u32>, EstimateError> {
        Ok(generic_embedding_token_count(texts))
    }
}

/// Price of one model in USD per million tokens
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelPrice {
    /// Cost per million input tokens
    pub input_per_mtok: f64,
    /// Cost per million output tokens
    pub output_per_mtok: f64,
}

/// Estimated cost of one invocation, in USD
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    /// Cost of the prompt tokens
    pub input_cost: f64,
    /// Cost of the completion tokens
    pub output_cost: f64,
    /// Sum of both
    pub total_cost: f64,
}

/// Per-model prices keyed by provider and model name
#[derive(Debug, Clone, Default)]
pub struct PricingTable {
    prices: IndexMap<(ProviderId, String), ModelPrice>,
}

impl PricingTable {
    /// Empty table; every estimate is zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the price of a model, replacing any earlier entry
    pub fn insert(&mut self, provider: ProviderId, model: impl Into<String>, price: ModelPrice) {
        self.prices.insert((provider, model.into()), price);
    }

    /// Price of a model, if known
    pub fn get(&self, provider: ProviderId, model: &str) -> Option<ModelPrice> {
        self.prices.get(&(provider, model.to_owned())).copied()
    }

    /// Number of priced models
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    /// Whether no model is priced
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Cost of `usage` on a model; unpriced models cost nothing
    pub fn estimate(&self, provider: ProviderId, model: &str, usage: &Usage) -> CostEstimate {
        let Some(price) = self.get(provider, model) else {
            return CostEstimate::default();
        };

        let input_cost = (f64::from(usage.prompt_tokens) / 1_000_000.0) * price.input_per_mtok;
        let output_cost = (f64::from(usage.completion_tokens) / 1_000_000.0) * price.output_per_mtok;

        CostEstimate {
            input_cost,
            output_cost,
            total_cost: input_cost + output_cost,
        }
    }
}

impl FromIterator<(ProviderId, String, ModelPrice)> for PricingTable {
    fn from_iter<I: IntoIterator<Item = (ProviderId, String, ModelPrice)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (provider, model, price) in iter {
            table.insert(provider, model, price);
        }
        table
    }
}
