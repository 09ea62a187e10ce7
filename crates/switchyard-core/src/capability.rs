//! Routing keys: which operation, on which backend family

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Backend family a request is routed to
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ProviderId {
    /// `OpenAI` (chat, embeddings, speech, transcription, moderation)
    OpenAi,
    /// Anthropic Messages API
    Anthropic,
    /// Google Generative Language API
    Google,
    /// Hugging Face text-embeddings-inference
    HuggingFace,
    /// Cohere rerank
    Cohere,
    /// BAAI general embedding rerankers
    Bge,
    /// Azure AI speech and content safety
    Azure,
}

/// Category of AI operation
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Capability {
    /// Blocking chat completion
    Chat,
    /// Streaming chat completion
    ChatStream,
    /// Text embedding
    Embedding,
    /// Document reranking
    Rerank,
    /// Speech synthesis
    TextToSpeech,
    /// Speech recognition
    SpeechToText,
    /// Content moderation
    Moderation,
    /// Prompt token estimation
    TokenCount,
    /// Per-text embedding token estimation
    EmbeddingTokenCount,
    /// Voice catalogue listing
    ListVoices,
}

/// How the router behaves when a capability has no route for a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityClass {
    /// Miss and failure surface to the caller
    Required,
    /// Miss falls back to the generic estimator, failure yields zero
    Estimation,
    /// Miss and failure yield an empty list
    Listing,
    /// Miss and failure yield "not flagged"
    Moderation,
}

impl Capability {
    /// Miss/failure policy for this capability
    pub const fn class(self) -> CapabilityClass {
        match self {
            Self::Chat | Self::ChatStream | Self::Embedding | Self::Rerank | Self::TextToSpeech | Self::SpeechToText => {
                CapabilityClass::Required
            }
            Self::TokenCount | Self::EmbeddingTokenCount => CapabilityClass::Estimation,
            Self::ListVoices => CapabilityClass::Listing,
            Self::Moderation => CapabilityClass::Moderation,
        }
    }
}

/// Provider identifier as supplied by a caller
///
/// Keeps the original spelling for error messages while resolving it to a
/// [`ProviderId`] once. Unknown spellings resolve to `None` and miss every
/// route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderKey {
    raw: String,
    id: Option<ProviderId>,
}

impl ProviderKey {
    /// Resolve a caller-supplied provider name
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let id = ProviderId::from_str(raw.trim()).ok();
        Self { raw, id }
    }

    /// Resolved provider, if the name is known
    pub const fn id(&self) -> Option<ProviderId> {
        self.id
    }

    /// Provider name exactly as supplied
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for ProviderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<ProviderId> for ProviderKey {
    fn from(id: ProviderId) -> Self {
        Self {
            raw: id.to_string(),
            id: Some(id),
        }
    }
}

impl From<&str> for ProviderKey {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<String> for ProviderKey {
    fn from(raw: String) -> Self {
        Self::parse(raw)
    }
}

impl From<&String> for ProviderKey {
    fn from(raw: &String) -> Self {
        Self::parse(raw.as_str())
    }
}
