use futures_util::stream;
use serde::{Deserialize, Serialize};

use super::stream::{ChatStream, StreamDelta, StreamEvent, StreamToolCall};
use super::tool::ToolCall;

/// Reason the model stopped generating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural end of generation or a stop sequence
    Stop,
    /// Hit the token limit
    Length,
    /// Model decided to call a tool
    ToolCalls,
    /// Content was filtered by safety systems
    ContentFilter,
}

/// Token usage statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Tokens consumed by the prompt
    pub prompt_tokens: u32,
    /// Tokens generated in the completion
    pub completion_tokens: u32,
    /// Total tokens
    pub total_tokens: u32,
}

impl Usage {
    /// Usage for a prompt with no completion, e.g. an embedding call
    pub const fn prompt_only(prompt_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens: 0,
            total_tokens: prompt_tokens,
        }
    }
}

/// Normalized chat completion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResult {
    /// Provider response identifier
    pub id: String,
    /// Model that produced the result
    pub model: String,
    /// Text of the first choice; absent when the provider returned no choices
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Why the first choice stopped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,
    /// Tool calls of the first choice
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// Token usage
    pub usage: Usage,
}

impl ChatResult {
    /// The stream a streaming call would have produced for this result
    ///
    /// One delta with the whole content and tool calls, the usage, then `Done`.
    pub fn into_events(self) -> Vec<StreamEvent> {
        let mut events = Vec::with_capacity(self.tool_calls.len() + 3);

        events.push(StreamEvent::Delta(StreamDelta {
            index: 0,
            content: self.content,
            tool_call: None,
            finish_reason: if self.tool_calls.is_empty() {
                self.finish_reason
            } else {
                None
            },
        }));

        let tool_count = self.tool_calls.len();
        for (i, call) in self.tool_calls.into_iter().enumerate() {
            events.push(StreamEvent::Delta(StreamDelta {
                index: 0,
                content: None,
                tool_call: Some(StreamToolCall {
                    index: u32::try_from(i).unwrap_or(u32::MAX),
                    id: Some(call.id),
                    name: Some(call.name),
                    arguments: Some(call.arguments),
                }),
                finish_reason: if i + 1 == tool_count { self.finish_reason } else { None },
            }));
        }

        events.push(StreamEvent::Usage(self.usage));
        events.push(StreamEvent::Done);
        events
    }

    /// [`Self::into_events`] as a [`ChatStream`]
    pub fn into_stream(self) -> ChatStream {
        Box::pin(stream::iter(self.into_events().into_iter().map(Ok)))
    }
}

/// Normalized embedding response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingResult {
    /// One vector per input text, in input order
    pub embeddings: Vec<Vec<f32>>,
    /// Model that produced the vectors
    pub model: String,
    /// Token usage
    pub usage: Usage,
}

/// One reranked document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RerankItem {
    /// Position of the document in the request
    pub index: usize,
    /// Provider-defined relevance; scales differ between providers
    pub relevance_score: f64,
    /// Document text
    pub document: String,
}

/// Normalized rerank response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RerankResult {
    /// Items by descending score, ties by ascending index
    pub items: Vec<RerankItem>,
    /// Model that scored the documents
    pub model: String,
}

/// Normalized transcription
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcription {
    /// Recognized text
    pub text: String,
}

/// A synthesis voice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TtsVoice {
    /// Identifier passed back in [`crate::TtsRequest::voice`]
    pub id: String,
    /// Display name
    pub name: String,
    /// BCP 47 language tag, absent for multilingual voices
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}
