//! Backend ports: the I/O boundary the router calls through
//!
//! Each port is generic over the codec whose wire types it carries, so a
//! backend can only be registered next to the translator and normalizer that
//! speak its format. Implementations own transport, credentials and retry;
//! the router imposes no timeout of its own.

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;

use crate::convert::{ChatCodec, EmbeddingCodec, ModerationCodec, RerankCodec, SttCodec, TtsCodec};
use crate::error::BackendError;

/// Stream of wire frames produced by a backend
pub type WireStream<T> = Pin<Box<dyn Stream<Item = Result<T, BackendError>> + Send>>;

/// Chat completion backend
#[async_trait]
pub trait ChatBackend<C: ChatCodec>: Send + Sync {
    /// Send a blocking completion request
    async fn invoke(&self, request: &C::Request) -> Result<C::Response, BackendError>;

    /// Send a streaming completion request
    async fn invoke_stream(&self, request: &C::Request) -> Result<WireStream<C::Chunk>, BackendError>;
}

/// Text embedding backend
#[async_trait]
pub trait EmbeddingBackend<C: EmbeddingCodec>: Send + Sync {
    /// Embed the request's inputs
    async fn embed(&self, request: &C::Request) -> Result<C::Response, BackendError>;
}

/// Rerank backend
#[async_trait]
pub trait RerankBackend<C: RerankCodec>: Send + Sync {
    /// Score the request's documents against its query
    async fn rerank(&self, request: &C::Request) -> Result<C::Response, BackendError>;
}

/// Speech synthesis backend
#[async_trait]
pub trait TtsBackend<C: TtsCodec>: Send + Sync {
    /// Synthesize audio, yielding encoded chunks as they arrive
    async fn synthesize(&self, request: &C::Request) -> Result<WireStream<Vec<u8>>, BackendError>;
}

/// Speech recognition backend
#[async_trait]
pub trait SttBackend<C: SttCodec>: Send + Sync {
    /// Recognize speech in the request's audio
    async fn transcribe(&self, request: &C::Request) -> Result<C::Response, BackendError>;
}

/// Content moderation backend
#[async_trait]
pub trait ModerationBackend<C: ModerationCodec>: Send + Sync {
    /// Classify the request's text
    async fn classify(&self, request: &C::Request) -> Result<C::Response, BackendError>;
}
