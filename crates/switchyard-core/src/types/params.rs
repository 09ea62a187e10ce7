use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Model invocation parameters
///
/// Every field is optional. Absent fields are omitted from the provider
/// request so the vendor default applies, except where a provider requires
/// the field (see the per-provider translators).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InvocationParams {
    /// Target model name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Sampling temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Nucleus sampling threshold
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// Top-k sampling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Frequency penalty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
    /// Presence penalty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
    /// Stop sequences
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<Vec<String>>,
}

impl InvocationParams {
    /// Parameters selecting only a model
    pub fn with_model(model: impl Into<String>) -> Self {
        Self {
            model: Some(model.into()),
            ..Self::default()
        }
    }

    /// Read parameters from an untyped key/value bag
    ///
    /// Keys are accepted in snake_case or camelCase. Numbers may be given as
    /// strings. Values of the wrong type are ignored, and a value that is not
    /// an object yields empty parameters.
    pub fn from_value(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            return Self::default();
        };

        Self {
            model: lookup(map, &["model", "model_name", "modelName"]).and_then(as_string),
            temperature: lookup(map, &["temperature"]).and_then(as_f64),
            top_p: lookup(map, &["top_p", "topP"]).and_then(as_f64),
            top_k: lookup(map, &["top_k", "topK"]).and_then(as_u32),
            max_tokens: lookup(map, &["max_tokens", "maxTokens", "max_output_tokens", "maxOutputTokens"])
                .and_then(as_u32),
            frequency_penalty: lookup(map, &["frequency_penalty", "frequencyPenalty"]).and_then(as_f64),
            presence_penalty: lookup(map, &["presence_penalty", "presencePenalty"]).and_then(as_f64),
            stop_sequences: lookup(map, &["stop_sequences", "stopSequences", "stop"]).and_then(as_strings),
        }
    }

    /// Fill every unset field from `defaults`
    #[must_use]
    pub fn or(&self, defaults: &Self) -> Self {
        Self {
            model: self.model.clone().or_else(|| defaults.model.clone()),
            temperature: self.temperature.or(defaults.temperature),
            top_p: self.top_p.or(defaults.top_p),
            top_k: self.top_k.or(defaults.top_k),
            max_tokens: self.max_tokens.or(defaults.max_tokens),
            frequency_penalty: self.frequency_penalty.or(defaults.frequency_penalty),
            presence_penalty: self.presence_penalty.or(defaults.presence_penalty),
            stop_sequences: self.stop_sequences.clone().or_else(|| defaults.stop_sequences.clone()),
        }
    }

    /// Model name, or `default` when none is set or the name is blank
    pub fn model_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.model.as_deref().filter(|m| !m.trim().is_empty()).unwrap_or(default)
    }
}

/// First present, non-null value among the key aliases
fn lookup<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().filter_map(|key| map.get(*key)).find(|v| !v.is_null())
}

fn as_string(value: &Value) -> Option<String> {
    value.as_str().map(str::trim).filter(|s| !s.is_empty()).map(str::to_owned)
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_strings(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::String(s) => Some(vec![s.clone()]),
        Value::Array(items) => Some(items.iter().filter_map(|v| v.as_str().map(str::to_owned)).collect()),
        _ => None,
    }
}
