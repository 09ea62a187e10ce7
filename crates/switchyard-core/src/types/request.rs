use serde::{Deserialize, Serialize};

use super::message::PromptMessage;
use super::tool::ToolSpec;

/// Chat completion request
///
/// Whether the call streams is decided by the entry point used, never by
/// request content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Conversation messages, in order
    pub messages: Vec<PromptMessage>,
    /// Functions the model may call
    #[serde(default)]
    pub tools: Vec<ToolSpec>,
    /// Stop sequences; when non-empty these take precedence over the
    /// parameter set's stop sequences
    #[serde(default)]
    pub stop: Vec<String>,
}

impl ChatRequest {
    /// Request with messages only
    pub const fn new(messages: Vec<PromptMessage>) -> Self {
        Self {
            messages,
            tools: Vec::new(),
            stop: Vec::new(),
        }
    }

    /// Attach tool definitions
    #[must_use]
    pub fn with_tools(mut self, tools: Vec<ToolSpec>) -> Self {
        self.tools = tools;
        self
    }

    /// Attach stop sequences
    #[must_use]
    pub fn with_stop(mut self, stop: Vec<String>) -> Self {
        self.stop = stop;
        self
    }
}

/// Text embedding request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingRequest {
    /// Texts to embed; one vector is returned per text, in order
    pub texts: Vec<String>,
    /// End-user identifier forwarded for abuse monitoring
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

/// Document rerank request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RerankRequest {
    /// Query documents are ranked against
    pub query: String,
    /// Candidate documents
    pub documents: Vec<String>,
    /// End-user identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Keep only the best `top_n` items
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_n: Option<usize>,
    /// Drop items scoring below this value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_threshold: Option<f64>,
}

/// Speech synthesis request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TtsRequest {
    /// Text to speak
    pub text: String,
    /// End-user identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Voice identifier; the provider default is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
}

/// Speech recognition request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SttRequest {
    /// Encoded audio
    pub audio: Vec<u8>,
    /// End-user identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Original file name, used as a format hint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Spoken language hint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Content moderation request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationRequest {
    /// Text to classify
    pub text: String,
    /// End-user identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}
