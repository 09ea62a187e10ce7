//! Canonical, provider-independent request and result shapes
//!
//! Every translator reads these types and every normalizer produces them.
//! They are plain request-scoped values: built by the caller, never mutated
//! by the router.

pub mod message;
pub mod params;
pub mod request;
pub mod result;
pub mod stream;
pub mod tool;

pub use message::{PromptMessage, Role};
pub use params::InvocationParams;
pub use request::{ChatRequest, EmbeddingRequest, ModerationRequest, RerankRequest, SttRequest, TtsRequest};
pub use result::{
    ChatResult, EmbeddingResult, FinishReason, RerankItem, RerankResult, Transcription, TtsVoice, Usage,
};
pub use stream::{AudioStream, ChatStream, StreamDelta, StreamEvent, StreamToolCall};
pub use tool::{ToolCall, ToolSpec};
