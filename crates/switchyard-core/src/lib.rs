//! Provider abstraction core for Switchyard
//!
//! Routes provider-agnostic chat, embedding, rerank, speech and moderation
//! requests to a backend chosen by provider id. Each `(capability, provider)`
//! route translates the canonical request into the vendor's wire format,
//! calls the registered backend port and normalizes the response. Token
//! counting, voice listing and moderation degrade to safe defaults instead of
//! failing.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod callback;
pub mod capability;
pub mod convert;
pub mod error;
pub mod estimate;
pub mod port;
pub mod protocol;
mod registry;
pub mod router;
pub mod standin;
pub mod summary;
pub mod types;
pub mod voices;

pub use callback::{InvocationCallback, InvocationContext};
pub use capability::{Capability, CapabilityClass, ProviderId, ProviderKey};
pub use error::{
    BackendError, InvocationError, InvocationErrorKind, NormalizeError, TranslationError, UnsupportedProviderError,
};
pub use estimate::{CostEstimate, HeuristicEstimator, ModelPrice, PricingTable, TokenEstimator};
pub use port::{ChatBackend, EmbeddingBackend, ModerationBackend, RerankBackend, SttBackend, TtsBackend, WireStream};
pub use router::{CapabilityRouter, RouterBuilder};
pub use summary::Summarizer;
pub use types::{
    AudioStream, ChatRequest, ChatResult, ChatStream, EmbeddingRequest, EmbeddingResult, FinishReason,
    InvocationParams, ModerationRequest, PromptMessage, RerankItem, RerankRequest, RerankResult, Role, StreamEvent,
    SttRequest, ToolSpec, Transcription, TtsRequest, TtsVoice, Usage,
};
pub use voices::VoiceCatalog;
