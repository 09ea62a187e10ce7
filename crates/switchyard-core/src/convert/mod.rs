//! Translators and normalizers, one codec per (capability, provider) pair
//!
//! A codec is a zero-sized type tying a provider's wire request and response
//! types to two pure functions: `translate` builds the wire request from the
//! canonical request and `normalize` maps the wire response back. Neither
//! performs I/O; the backend port in between does.

pub mod anthropic;
pub mod azure;
pub mod bge;
pub mod cohere;
pub mod google;
pub mod huggingface;
pub mod openai;

use std::fmt::Debug;

use crate::capability::ProviderId;
use crate::error::NormalizeError;
use crate::types::{
    ChatRequest, ChatResult, EmbeddingRequest, EmbeddingResult, InvocationParams, ModerationRequest, RerankRequest,
    RerankResult, StreamEvent, SttRequest, Transcription, TtsRequest,
};

pub use anthropic::{AnthropicChat, AnthropicStreamState};
pub use azure::{AzureModeration, AzureSpeech, AzureTranscription};
pub use bge::BgeRerank;
pub use cohere::CohereRerank;
pub use google::{GoogleChat, GoogleStreamState};
pub use huggingface::HuggingFaceEmbedding;
pub use openai::{OpenAiChat, OpenAiEmbedding, OpenAiModeration, OpenAiSpeech, OpenAiTranscription};

/// Chat completion codec
pub trait ChatCodec: Send + Sync + 'static {
    /// Provider this codec is registered under
    const PROVIDER: ProviderId;
    /// Model used when the parameters name none
    const DEFAULT_MODEL: &'static str;

    /// Wire request
    type Request: Debug + Send + Sync + 'static;
    /// Wire response of a blocking call
    type Response: Send + 'static;
    /// Wire frame of a streaming call
    type Chunk: Send + 'static;
    /// Per-stream converter state
    type StreamState: Default + Send + 'static;

    /// Build the wire request; `stream` comes from the entry point used
    fn translate(request: &ChatRequest, params: &InvocationParams, stream: bool) -> Self::Request;

    /// Map a blocking response to the canonical result
    fn normalize(request: &Self::Request, response: Self::Response) -> Result<ChatResult, NormalizeError>;

    /// Map one streamed frame to zero or more canonical events
    fn normalize_chunk(state: &mut Self::StreamState, chunk: Self::Chunk) -> Vec<StreamEvent>;
}

/// Text embedding codec
pub trait EmbeddingCodec: Send + Sync + 'static {
    /// Provider this codec is registered under
    const PROVIDER: ProviderId;
    /// Model used when the parameters name none
    const DEFAULT_MODEL: &'static str;

    /// Wire request
    type Request: Debug + Send + Sync + 'static;
    /// Wire response
    type Response: Send + 'static;

    /// Build the wire request
    fn translate(request: &EmbeddingRequest, params: &InvocationParams) -> Self::Request;

    /// Map the response to vectors in input order
    fn normalize(request: &Self::Request, response: Self::Response) -> Result<EmbeddingResult, NormalizeError>;
}

/// Rerank codec
pub trait RerankCodec: Send + Sync + 'static {
    /// Provider this codec is registered under
    const PROVIDER: ProviderId;
    /// Model used when the parameters name none
    const DEFAULT_MODEL: &'static str;

    /// Wire request
    type Request: Debug + Send + Sync + 'static;
    /// Wire response
    type Response: Send + 'static;

    /// Build the wire request
    fn translate(request: &RerankRequest, params: &InvocationParams) -> Self::Request;

    /// Map the response to items carrying their original document index
    fn normalize(request: &Self::Request, response: Self::Response) -> Result<RerankResult, NormalizeError>;
}

/// Speech synthesis codec
///
/// Audio is passed through untouched, so there is no response mapping.
pub trait TtsCodec: Send + Sync + 'static {
    /// Provider this codec is registered under
    const PROVIDER: ProviderId;
    /// Model or voice family used when the parameters name none
    const DEFAULT_MODEL: &'static str;

    /// Wire request
    type Request: Debug + Send + Sync + 'static;

    /// Build the wire request
    fn translate(request: &TtsRequest, params: &InvocationParams) -> Self::Request;
}

/// Speech recognition codec
pub trait SttCodec: Send + Sync + 'static {
    /// Provider this codec is registered under
    const PROVIDER: ProviderId;
    /// Model used when the parameters name none
    const DEFAULT_MODEL: &'static str;

    /// Wire request
    type Request: Debug + Send + Sync + 'static;
    /// Wire response
    type Response: Send + 'static;

    /// Build the wire request
    fn translate(request: &SttRequest, params: &InvocationParams) -> Self::Request;

    /// Map the response to recognized text
    fn normalize(request: &Self::Request, response: Self::Response) -> Result<Transcription, NormalizeError>;
}

/// Content moderation codec
pub trait ModerationCodec: Send + Sync + 'static {
    /// Provider this codec is registered under
    const PROVIDER: ProviderId;
    /// Model used when the parameters name none
    const DEFAULT_MODEL: &'static str;

    /// Wire request
    type Request: Debug + Send + Sync + 'static;
    /// Wire response
    type Response: Send + 'static;

    /// Build the wire request
    fn translate(request: &ModerationRequest, params: &InvocationParams) -> Self::Request;

    /// Map the response to a flagged verdict
    fn normalize(request: &Self::Request, response: Self::Response) -> Result<bool, NormalizeError>;
}

/// Stop sequences for a chat call: the request's own list wins when non-empty
pub(crate) fn stop_sequences(request: &ChatRequest, params: &InvocationParams) -> Option<Vec<String>> {
    if request.stop.is_empty() {
        params.stop_sequences.clone().filter(|stop| !stop.is_empty())
    } else {
        Some(request.stop.clone())
    }
}

/// Description as an optional wire field
pub(crate) fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_owned())
}
