//! The dispatch table
//!
//! Each registration pairs a backend port with the codec its wire types
//! belong to, then erases the codec so routes of different providers can
//! share one table. The table is filled once by the router builder and only
//! read afterwards.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::{StreamExt, stream};
use indexmap::IndexMap;

use crate::capability::{Capability, ProviderId};
use crate::convert::{ChatCodec, EmbeddingCodec, ModerationCodec, RerankCodec, SttCodec, TtsCodec};
use crate::error::{BackendError, InvocationErrorKind};
use crate::estimate::TokenEstimator;
use crate::port::{
    ChatBackend, EmbeddingBackend, ModerationBackend, RerankBackend, SttBackend, TtsBackend, WireStream,
};
use crate::types::{
    ChatRequest, ChatResult, EmbeddingRequest, EmbeddingResult, InvocationParams, ModerationRequest, RerankRequest,
    RerankResult, StreamEvent, SttRequest, Transcription, TtsRequest,
};
use crate::voices::VoiceCatalog;

/// Translate, invoke and normalize a chat call for one provider
#[async_trait]
pub(crate) trait ChatRoute: Send + Sync {
    fn default_model(&self) -> &'static str;

    async fn invoke(&self, request: &ChatRequest, params: &InvocationParams)
    -> Result<ChatResult, InvocationErrorKind>;

    async fn invoke_stream(
        &self,
        request: &ChatRequest,
        params: &InvocationParams,
    ) -> Result<WireStream<StreamEvent>, InvocationErrorKind>;
}

#[async_trait]
pub(crate) trait EmbeddingRoute: Send + Sync {
    async fn embed(
        &self,
        request: &EmbeddingRequest,
        params: &InvocationParams,
    ) -> Result<EmbeddingResult, InvocationErrorKind>;
}

#[async_trait]
pub(crate) trait RerankRoute: Send + Sync {
    async fn rerank(&self, request: &RerankRequest, params: &InvocationParams)
    -> Result<RerankResult, InvocationErrorKind>;
}

#[async_trait]
pub(crate) trait TtsRoute: Send + Sync {
    async fn synthesize(
        &self,
        request: &TtsRequest,
        params: &InvocationParams,
    ) -> Result<WireStream<Vec<u8>>, InvocationErrorKind>;
}

#[async_trait]
pub(crate) trait SttRoute: Send + Sync {
    async fn transcribe(
        &self,
        request: &SttRequest,
        params: &InvocationParams,
    ) -> Result<Transcription, InvocationErrorKind>;
}

#[async_trait]
pub(crate) trait ModerationRoute: Send + Sync {
    async fn moderate(&self, request: &ModerationRequest, params: &InvocationParams)
    -> Result<bool, InvocationErrorKind>;
}

/// A backend port bound to its codec
pub(crate) struct Binding<B: ?Sized> {
    backend: Arc<B>,
}

impl<B: ?Sized> Binding<B> {
    pub(crate) const fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl<C: ChatCodec> ChatRoute for Binding<dyn ChatBackend<C>> {
    fn default_model(&self) -> &'static str {
        C::DEFAULT_MODEL
    }

    async fn invoke(
        &self,
        request: &ChatRequest,
        params: &InvocationParams,
    ) -> Result<ChatResult, InvocationErrorKind> {
        let wire = C::translate(request, params, false);
        tracing::trace!(provider = %C::PROVIDER, request = ?wire, "translated chat request");

        let response = self.backend.invoke(&wire).await?;
        Ok(C::normalize(&wire, response)?)
    }

    async fn invoke_stream(
        &self,
        request: &ChatRequest,
        params: &InvocationParams,
    ) -> Result<WireStream<StreamEvent>, InvocationErrorKind> {
        let wire = C::translate(request, params, true);
        tracing::trace!(provider = %C::PROVIDER, request = ?wire, "translated chat stream request");

        let chunks = self.backend.invoke_stream(&wire).await?;

        let mut state = C::StreamState::default();
        let events = chunks.flat_map(move |chunk| {
            let events: Vec<Result<StreamEvent, BackendError>> = match chunk {
                Ok(chunk) => C::normalize_chunk(&mut state, chunk).into_iter().map(Ok).collect(),
                Err(e) => vec![Err(e)],
            };
            stream::iter(events)
        });

        Ok(Box::pin(events))
    }
}

#[async_trait]
impl<C: EmbeddingCodec> EmbeddingRoute for Binding<dyn EmbeddingBackend<C>> {
    async fn embed(
        &self,
        request: &EmbeddingRequest,
        params: &InvocationParams,
    ) -> Result<EmbeddingResult, InvocationErrorKind> {
        let wire = C::translate(request, params);
        let response = self.backend.embed(&wire).await?;
        Ok(C::normalize(&wire, response)?)
    }
}

#[async_trait]
impl<C: RerankCodec> RerankRoute for Binding<dyn RerankBackend<C>> {
    async fn rerank(
        &self,
        request: &RerankRequest,
        params: &InvocationParams,
    ) -> Result<RerankResult, InvocationErrorKind> {
        let wire = C::translate(request, params);
        let response = self.backend.rerank(&wire).await?;
        Ok(C::normalize(&wire, response)?)
    }
}

#[async_trait]
impl<C: TtsCodec> TtsRoute for Binding<dyn TtsBackend<C>> {
    async fn synthesize(
        &self,
        request: &TtsRequest,
        params: &InvocationParams,
    ) -> Result<WireStream<Vec<u8>>, InvocationErrorKind> {
        let wire = C::translate(request, params);
        Ok(self.backend.synthesize(&wire).await?)
    }
}

#[async_trait]
impl<C: SttCodec> SttRoute for Binding<dyn SttBackend<C>> {
    async fn transcribe(
        &self,
        request: &SttRequest,
        params: &InvocationParams,
    ) -> Result<Transcription, InvocationErrorKind> {
        let wire = C::translate(request, params);
        let response = self.backend.transcribe(&wire).await?;
        Ok(C::normalize(&wire, response)?)
    }
}

#[async_trait]
impl<C: ModerationCodec> ModerationRoute for Binding<dyn ModerationBackend<C>> {
    async fn moderate(
        &self,
        request: &ModerationRequest,
        params: &InvocationParams,
    ) -> Result<bool, InvocationErrorKind> {
        let wire = C::translate(request, params);
        let response = self.backend.classify(&wire).await?;
        Ok(C::normalize(&wire, response)?)
    }
}

/// What a table entry dispatches to
#[derive(Clone)]
pub(crate) enum Route {
    Chat(Arc<dyn ChatRoute>),
    Embedding(Arc<dyn EmbeddingRoute>),
    Rerank(Arc<dyn RerankRoute>),
    Tts(Arc<dyn TtsRoute>),
    Stt(Arc<dyn SttRoute>),
    Moderation(Arc<dyn ModerationRoute>),
    Estimator(Arc<dyn TokenEstimator>),
    Voices(Arc<dyn VoiceCatalog>),
}

/// Routes keyed by exact `(capability, provider)` match
#[derive(Clone, Default)]
pub(crate) struct DispatchTable {
    routes: IndexMap<(Capability, ProviderId), Route>,
}

impl DispatchTable {
    /// Add or replace a route
    pub(crate) fn insert(&mut self, capability: Capability, provider: ProviderId, route: Route) {
        if self.routes.insert((capability, provider), route).is_some() {
            tracing::debug!(%capability, %provider, "replaced route");
        }
    }

    pub(crate) fn get(&self, capability: Capability, provider: ProviderId) -> Option<&Route> {
        self.routes.get(&(capability, provider))
    }

    pub(crate) fn keys(&self) -> impl Iterator<Item = (Capability, ProviderId)> + '_ {
        self.routes.keys().copied()
    }
}
