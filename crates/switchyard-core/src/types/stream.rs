use std::pin::Pin;

use futures_util::Stream;
use serde::{Deserialize, Serialize};

use super::result::{FinishReason, Usage};
use crate::error::InvocationError;

/// Normalized streaming chat events
pub type ChatStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, InvocationError>> + Send>>;

/// Synthesized audio, one encoded chunk per item
///
/// Finite and single-pass; chunks are passed through without re-encoding.
pub type AudioStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>, InvocationError>> + Send>>;

/// Event within a streaming chat response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamEvent {
    /// Incremental content delta
    Delta(StreamDelta),
    /// Usage statistics
    Usage(Usage),
    /// Stream has completed
    Done,
}

/// Incremental update within a streaming response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamDelta {
    /// Choice index this delta belongs to
    pub index: u32,
    /// Incremental text content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Incremental tool call data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call: Option<StreamToolCall>,
    /// Reason generation finished (present on final delta)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,
}

impl StreamDelta {
    /// Delta carrying only text
    pub fn text(index: u32, content: impl Into<String>) -> Self {
        Self {
            index,
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// Delta carrying only a finish reason
    pub fn finish(index: u32, reason: FinishReason) -> Self {
        Self {
            index,
            finish_reason: Some(reason),
            ..Self::default()
        }
    }
}

/// Partial tool call within a stream delta
///
/// Identifier and name arrive on the first fragment of a call; arguments
/// arrive as JSON fragments to be concatenated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamToolCall {
    /// Sequential index of the call within the response
    pub index: u32,
    /// Call identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Function name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Arguments fragment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
}
