use serde::Deserialize;

/// Price of one model, in USD per million tokens
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PricingEntry {
    /// Provider id, e.g. `openai`
    pub provider: String,
    /// Model name as reported in results
    pub model: String,
    /// Cost per million input tokens
    pub input_per_mtok: f64,
    /// Cost per million output tokens
    pub output_per_mtok: f64,
}
