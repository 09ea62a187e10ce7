//! Capability router: one entry point per capability over the dispatch table

use std::cmp::Ordering;
use std::error::Error as StdError;
use std::fmt::Write as _;
use std::sync::Arc;

use futures_util::{StreamExt, stream};
use indexmap::IndexMap;

use crate::callback::{InvocationCallback, InvocationContext};
use crate::capability::{Capability, ProviderId, ProviderKey};
use crate::convert::{ChatCodec, EmbeddingCodec, ModerationCodec, RerankCodec, SttCodec, TtsCodec};
use crate::error::{
    InvocationError, InvocationErrorKind, NormalizeError, TranslationError, UnsupportedProviderError,
};
use crate::estimate::{
    CostEstimate, HeuristicEstimator, PricingTable, TokenEstimator, generic_embedding_token_count,
    generic_token_count,
};
use crate::port::{
    ChatBackend, EmbeddingBackend, ModerationBackend, RerankBackend, SttBackend, TtsBackend, WireStream,
};
use crate::registry::{Binding, DispatchTable, Route};
use crate::types::{
    AudioStream, ChatRequest, ChatResult, ChatStream, EmbeddingRequest, EmbeddingResult, InvocationParams,
    ModerationRequest, PromptMessage, RerankItem, RerankRequest, RerankResult, StreamEvent, SttRequest, ToolSpec,
    Transcription, TtsRequest, TtsVoice, Usage,
};
use crate::voices::{AzureVoices, OpenAiVoices, VoiceCatalog};

/// Builds a [`CapabilityRouter`]
///
/// Registrations are keyed by the codec's provider; registering the same
/// `(capability, provider)` pair twice keeps the later one.
#[derive(Clone, Default)]
pub struct RouterBuilder {
    table: DispatchTable,
    defaults: IndexMap<ProviderId, InvocationParams>,
    pricing: PricingTable,
}

impl RouterBuilder {
    /// Empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Route blocking and streaming chat for `C::PROVIDER` to `backend`
    #[must_use]
    pub fn register_chat<C: ChatCodec>(mut self, backend: Arc<dyn ChatBackend<C>>) -> Self {
        let route = Route::Chat(Arc::new(Binding::new(backend)));
        self.table.insert(Capability::Chat, C::PROVIDER, route.clone());
        self.table.insert(Capability::ChatStream, C::PROVIDER, route);
        self
    }

    /// Route embedding for `C::PROVIDER` to `backend`
    #[must_use]
    pub fn register_embedding<C: EmbeddingCodec>(mut self, backend: Arc<dyn EmbeddingBackend<C>>) -> Self {
        let route = Route::Embedding(Arc::new(Binding::new(backend)));
        self.table.insert(Capability::Embedding, C::PROVIDER, route);
        self
    }

    /// Route reranking for `C::PROVIDER` to `backend`
    #[must_use]
    pub fn register_rerank<C: RerankCodec>(mut self, backend: Arc<dyn RerankBackend<C>>) -> Self {
        let route = Route::Rerank(Arc::new(Binding::new(backend)));
        self.table.insert(Capability::Rerank, C::PROVIDER, route);
        self
    }

    /// Route speech synthesis for `C::PROVIDER` to `backend`
    #[must_use]
    pub fn register_tts<C: TtsCodec>(mut self, backend: Arc<dyn TtsBackend<C>>) -> Self {
        let route = Route::Tts(Arc::new(Binding::new(backend)));
        self.table.insert(Capability::TextToSpeech, C::PROVIDER, route);
        self
    }

    /// Route speech recognition for `C::PROVIDER` to `backend`
    #[must_use]
    pub fn register_stt<C: SttCodec>(mut self, backend: Arc<dyn SttBackend<C>>) -> Self {
        let route = Route::Stt(Arc::new(Binding::new(backend)));
        self.table.insert(Capability::SpeechToText, C::PROVIDER, route);
        self
    }

    /// Route moderation for `C::PROVIDER` to `backend`
    #[must_use]
    pub fn register_moderation<C: ModerationCodec>(mut self, backend: Arc<dyn ModerationBackend<C>>) -> Self {
        let route = Route::Moderation(Arc::new(Binding::new(backend)));
        self.table.insert(Capability::Moderation, C::PROVIDER, route);
        self
    }

    /// Prompt token estimator for `provider`
    #[must_use]
    pub fn register_token_count(mut self, provider: ProviderId, estimator: Arc<dyn TokenEstimator>) -> Self {
        self.table
            .insert(Capability::TokenCount, provider, Route::Estimator(estimator));
        self
    }

    /// Embedding token estimator for `provider`
    #[must_use]
    pub fn register_embedding_token_count(mut self, provider: ProviderId, estimator: Arc<dyn TokenEstimator>) -> Self {
        self.table
            .insert(Capability::EmbeddingTokenCount, provider, Route::Estimator(estimator));
        self
    }

    /// One estimator for both prompt and embedding token counts
    #[must_use]
    pub fn token_estimator(self, provider: ProviderId, estimator: Arc<dyn TokenEstimator>) -> Self {
        self.register_token_count(provider, Arc::clone(&estimator))
            .register_embedding_token_count(provider, estimator)
    }

    /// Voice catalogue for `provider`
    #[must_use]
    pub fn register_voices(mut self, provider: ProviderId, catalog: Arc<dyn VoiceCatalog>) -> Self {
        self.table.insert(Capability::ListVoices, provider, Route::Voices(catalog));
        self
    }

    /// Heuristic estimators and static voice catalogues of the built-in providers
    #[must_use]
    pub fn with_builtin_estimators(self) -> Self {
        let heuristic: Arc<dyn TokenEstimator> = Arc::new(HeuristicEstimator);

        let mut builder = self;
        for provider in [ProviderId::OpenAi, ProviderId::Anthropic, ProviderId::Google] {
            builder = builder.register_token_count(provider, Arc::clone(&heuristic));
        }
        for provider in [ProviderId::OpenAi, ProviderId::HuggingFace] {
            builder = builder.register_embedding_token_count(provider, Arc::clone(&heuristic));
        }

        builder
            .register_voices(ProviderId::OpenAi, Arc::new(OpenAiVoices))
            .register_voices(ProviderId::Azure, Arc::new(AzureVoices))
    }

    /// Parameters merged under every call routed to `provider`
    #[must_use]
    pub fn defaults(mut self, provider: ProviderId, params: InvocationParams) -> Self {
        self.defaults.insert(provider, params);
        self
    }

    /// Prices used by [`CapabilityRouter::estimate_cost`]
    #[must_use]
    pub fn pricing(mut self, pricing: PricingTable) -> Self {
        self.pricing = pricing;
        self
    }

    /// Freeze the table
    pub fn build(self) -> CapabilityRouter {
        CapabilityRouter {
            table: self.table,
            defaults: self.defaults,
            pricing: self.pricing,
        }
    }
}

/// Routes canonical requests to registered backends
///
/// Immutable once built; share it behind an `Arc`.
#[derive(Clone)]
pub struct CapabilityRouter {
    table: DispatchTable,
    defaults: IndexMap<ProviderId, InvocationParams>,
    pricing: PricingTable,
}

impl std::fmt::Debug for CapabilityRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityRouter")
            .field("routes", &self.routes())
            .field("defaults", &self.defaults)
            .field("priced_models", &self.pricing.len())
            .finish()
    }
}

impl CapabilityRouter {
    /// Start building a router
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// Registered `(capability, provider)` pairs, in registration order
    pub fn routes(&self) -> Vec<(Capability, ProviderId)> {
        self.table.keys().collect()
    }

    /// Whether `provider` has a route for `capability`
    pub fn supports(&self, capability: Capability, provider: impl Into<ProviderKey>) -> bool {
        self.find(capability, &provider.into()).is_some()
    }

    /// Blocking chat completion
    pub async fn chat(
        &self,
        provider: impl Into<ProviderKey>,
        request: &ChatRequest,
        params: &InvocationParams,
        callbacks: &[Arc<dyn InvocationCallback>],
    ) -> Result<ChatResult, InvocationError> {
        let key = provider.into();
        let capability = Capability::Chat;

        let Some((id, Route::Chat(route))) = self.find(capability, &key) else {
            return Err(unsupported(capability, &key));
        };

        let params = self.params_for(id, params);
        let context = InvocationContext::new(capability, id, params.model_or(route.default_model()));
        tracing::debug!(%capability, provider = %id, model = %context.model, "routing chat request");

        let outcome = match validate_chat(request) {
            Ok(()) => {
                for callback in callbacks {
                    callback.on_before_invoke(&context, request, &params);
                }
                route.invoke(request, &params).await
            }
            Err(e) => Err(e.into()),
        };

        match outcome {
            Ok(result) => {
                for callback in callbacks {
                    callback.on_after_invoke(&context, Some(&result));
                }
                Ok(result)
            }
            Err(kind) => {
                let error = failure(capability, &key, kind);
                for callback in callbacks {
                    callback.on_invoke_error(&context, &error);
                }
                Err(error)
            }
        }
    }

    /// Streaming chat completion
    ///
    /// The stream always ends with a single [`StreamEvent::Done`] unless a
    /// frame fails, in which case the error is its last item.
    pub async fn chat_stream(
        &self,
        provider: impl Into<ProviderKey>,
        request: &ChatRequest,
        params: &InvocationParams,
        callbacks: &[Arc<dyn InvocationCallback>],
    ) -> Result<ChatStream, InvocationError> {
        let key = provider.into();
        let capability = Capability::ChatStream;

        let Some((id, Route::Chat(route))) = self.find(capability, &key) else {
            return Err(unsupported(capability, &key));
        };

        let params = self.params_for(id, params);
        let context = InvocationContext::new(capability, id, params.model_or(route.default_model()));
        tracing::debug!(%capability, provider = %id, model = %context.model, "routing chat stream request");

        let outcome = match validate_chat(request) {
            Ok(()) => {
                for callback in callbacks {
                    callback.on_before_invoke(&context, request, &params);
                }
                route.invoke_stream(request, &params).await
            }
            Err(e) => Err(e.into()),
        };

        match outcome {
            Ok(events) => Ok(observe_stream(events, context, key, callbacks.to_vec())),
            Err(kind) => {
                let error = failure(capability, &key, kind);
                for callback in callbacks {
                    callback.on_invoke_error(&context, &error);
                }
                Err(error)
            }
        }
    }

    /// Embed texts; one vector per text, in input order
    pub async fn embed(
        &self,
        provider: impl Into<ProviderKey>,
        request: &EmbeddingRequest,
        params: &InvocationParams,
    ) -> Result<EmbeddingResult, InvocationError> {
        let key = provider.into();
        let capability = Capability::Embedding;

        let Some((id, Route::Embedding(route))) = self.find(capability, &key) else {
            return Err(unsupported(capability, &key));
        };

        let params = self.params_for(id, params);
        tracing::debug!(%capability, provider = %id, texts = request.texts.len(), "routing embedding request");

        let outcome = match route.embed(request, &params).await {
            Ok(result) if result.embeddings.len() != request.texts.len() => Err(NormalizeError::CountMismatch {
                expected: request.texts.len(),
                actual: result.embeddings.len(),
            }
            .into()),
            other => other,
        };

        outcome.map_err(|kind| failure(capability, &key, kind))
    }

    /// Rank documents against a query
    ///
    /// Items come back by descending score, ties by ascending index. Without
    /// `top_n` or `score_threshold` every document appears exactly once.
    pub async fn rerank(
        &self,
        provider: impl Into<ProviderKey>,
        request: &RerankRequest,
        params: &InvocationParams,
    ) -> Result<RerankResult, InvocationError> {
        let key = provider.into();
        let capability = Capability::Rerank;

        let Some((id, Route::Rerank(route))) = self.find(capability, &key) else {
            return Err(unsupported(capability, &key));
        };

        let params = self.params_for(id, params);
        tracing::debug!(
            %capability,
            provider = %id,
            documents = request.documents.len(),
            "routing rerank request"
        );

        let outcome = match validate_rerank(request) {
            Ok(()) => route.rerank(request, &params).await,
            Err(e) => Err(e.into()),
        };

        let result = outcome
            .and_then(|result| {
                check_permutation(&result.items, request.documents.len())?;
                Ok(result)
            })
            .map_err(|kind| failure(capability, &key, kind))?;

        Ok(rank(result, request))
    }

    /// Synthesize speech; audio chunks are passed through unchanged
    pub async fn text_to_speech(
        &self,
        provider: impl Into<ProviderKey>,
        request: &TtsRequest,
        params: &InvocationParams,
    ) -> Result<AudioStream, InvocationError> {
        let key = provider.into();
        let capability = Capability::TextToSpeech;

        let Some((id, Route::Tts(route))) = self.find(capability, &key) else {
            return Err(unsupported(capability, &key));
        };

        let params = self.params_for(id, params);
        tracing::debug!(%capability, provider = %id, "routing speech synthesis request");

        let outcome = if request.text.trim().is_empty() {
            Err(TranslationError::EmptyField { field: "text" }.into())
        } else {
            route.synthesize(request, &params).await
        };

        let chunks = outcome.map_err(|kind| failure(capability, &key, kind))?;
        Ok(audio_stream(chunks, key))
    }

    /// Recognize speech
    pub async fn speech_to_text(
        &self,
        provider: impl Into<ProviderKey>,
        request: &SttRequest,
        params: &InvocationParams,
    ) -> Result<Transcription, InvocationError> {
        let key = provider.into();
        let capability = Capability::SpeechToText;

        let Some((id, Route::Stt(route))) = self.find(capability, &key) else {
            return Err(unsupported(capability, &key));
        };

        let params = self.params_for(id, params);
        tracing::debug!(
            %capability,
            provider = %id,
            bytes = request.audio.len(),
            "routing transcription request"
        );

        let outcome = if request.audio.is_empty() {
            Err(TranslationError::EmptyField { field: "audio" }.into())
        } else {
            route.transcribe(request, &params).await
        };

        outcome.map_err(|kind| failure(capability, &key, kind))
    }

    /// Whether the text is flagged
    ///
    /// Fails open: a provider without a moderation route, or a failed call,
    /// yields `false`. Callers relying on moderation must check
    /// [`Self::supports`] first.
    pub async fn moderate(
        &self,
        provider: impl Into<ProviderKey>,
        request: &ModerationRequest,
        params: &InvocationParams,
    ) -> bool {
        let key = provider.into();
        let capability = Capability::Moderation;

        let Some((id, Route::Moderation(route))) = self.find(capability, &key) else {
            tracing::warn!(%capability, provider = %key, "no moderation route, treating text as not flagged");
            return false;
        };

        let params = self.params_for(id, params);
        match route.moderate(request, &params).await {
            Ok(flagged) => flagged,
            Err(kind) => {
                tracing::warn!(
                    %capability,
                    provider = %key,
                    error = %error_chain(&kind),
                    "moderation failed, treating text as not flagged"
                );
                false
            }
        }
    }

    /// Estimated prompt tokens
    ///
    /// Providers without an estimator use the generic heuristic; a failing
    /// estimator yields zero.
    pub fn count_tokens(
        &self,
        provider: impl Into<ProviderKey>,
        messages: &[PromptMessage],
        tools: &[ToolSpec],
    ) -> u32 {
        let key = provider.into();
        let capability = Capability::TokenCount;

        let Some((_, Route::Estimator(estimator))) = self.find(capability, &key) else {
            tracing::debug!(%capability, provider = %key, "no estimator, using generic token count");
            return generic_token_count(messages, tools);
        };

        estimator.count_tokens(messages, tools).unwrap_or_else(|e| {
            tracing::warn!(%capability, provider = %key, error = %e, "token estimation failed");
            0
        })
    }

    /// Estimated tokens of each embedding input
    ///
    /// Always the same length as `texts`: zeros when the estimator fails or
    /// returns the wrong number of counts.
    pub fn count_embedding_tokens(&self, provider: impl Into<ProviderKey>, texts: &[String]) -> Vec<u32> {
        let key = provider.into();
        let capability = Capability::EmbeddingTokenCount;

        let Some((_, Route::Estimator(estimator))) = self.find(capability, &key) else {
            tracing::debug!(%capability, provider = %key, "no estimator, using generic embedding token count");
            return generic_embedding_token_count(texts);
        };

        match estimator.count_embedding_tokens(texts) {
            Ok(counts) if counts.len() == texts.len() => counts,
            Ok(counts) => {
                tracing::warn!(
                    %capability,
                    provider = %key,
                    expected = texts.len(),
                    actual = counts.len(),
                    "estimator returned wrong number of counts"
                );
                vec![0; texts.len()]
            }
            Err(e) => {
                tracing::warn!(%capability, provider = %key, error = %e, "embedding token estimation failed");
                vec![0; texts.len()]
            }
        }
    }

    /// Voices offered by a TTS provider; empty on miss or failure
    pub async fn list_voices(&self, provider: impl Into<ProviderKey>, language: Option<&str>) -> Vec<TtsVoice> {
        let key = provider.into();
        let capability = Capability::ListVoices;

        let Some((_, Route::Voices(catalog))) = self.find(capability, &key) else {
            tracing::debug!(%capability, provider = %key, "no voice catalogue");
            return Vec::new();
        };

        catalog.list_voices(language).await.unwrap_or_else(|e| {
            tracing::warn!(%capability, provider = %key, error = %e, "listing voices failed");
            Vec::new()
        })
    }

    /// Cost of `usage` on `model`; zero when the provider or model is unpriced
    pub fn estimate_cost(&self, provider: impl Into<ProviderKey>, model: &str, usage: &Usage) -> CostEstimate {
        provider
            .into()
            .id()
            .map(|id| self.pricing.estimate(id, model, usage))
            .unwrap_or_default()
    }

    fn find(&self, capability: Capability, key: &ProviderKey) -> Option<(ProviderId, &Route)> {
        let id = key.id()?;
        self.table.get(capability, id).map(|route| (id, route))
    }

    fn params_for(&self, provider: ProviderId, params: &InvocationParams) -> InvocationParams {
        match self.defaults.get(&provider) {
            Some(defaults) => params.or(defaults),
            None => params.clone(),
        }
    }
}

fn unsupported(capability: Capability, key: &ProviderKey) -> InvocationError {
    tracing::error!(%capability, provider = %key, "no route registered");
    InvocationError::from(UnsupportedProviderError {
        capability,
        provider: key.as_str().to_owned(),
    })
}

fn failure(capability: Capability, key: &ProviderKey, kind: InvocationErrorKind) -> InvocationError {
    tracing::error!(%capability, provider = %key, error = %error_chain(&kind), "invocation failed");
    InvocationError::new(capability, key.as_str(), kind)
}

/// An error and its sources joined with ": "
fn error_chain(error: &dyn StdError) -> String {
    let mut chain = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let _ = write!(chain, ": {cause}");
        source = cause.source();
    }
    chain
}

fn validate_chat(request: &ChatRequest) -> Result<(), TranslationError> {
    if request.messages.is_empty() {
        return Err(TranslationError::EmptyMessages);
    }
    Ok(())
}

fn validate_rerank(request: &RerankRequest) -> Result<(), TranslationError> {
    if request.query.trim().is_empty() {
        return Err(TranslationError::EmptyField { field: "query" });
    }
    if request.top_n == Some(0) {
        return Err(TranslationError::ZeroTopN);
    }
    Ok(())
}

/// Every index in `0..len` exactly once
fn check_permutation(items: &[RerankItem], len: usize) -> Result<(), NormalizeError> {
    let mut seen = vec![false; len];
    for item in items {
        let slot = seen.get_mut(item.index).ok_or(NormalizeError::IndexOutOfRange {
            index: item.index,
            len,
        })?;
        if *slot {
            return Err(NormalizeError::DuplicateIndex { index: item.index });
        }
        *slot = true;
    }

    if items.len() != len {
        return Err(NormalizeError::CountMismatch {
            expected: len,
            actual: items.len(),
        });
    }
    Ok(())
}

/// Sort by descending score, ties by index, then apply threshold and `top_n`
///
/// NaN scores rank after every real score.
fn rank(mut result: RerankResult, request: &RerankRequest) -> RerankResult {
    result.items.sort_by(|a, b| {
        score_desc(a.relevance_score, b.relevance_score).then(a.index.cmp(&b.index))
    });

    if let Some(threshold) = request.score_threshold {
        result.items.retain(|item| item.relevance_score >= threshold);
    }
    if let Some(top_n) = request.top_n {
        result.items.truncate(top_n);
    }

    result
}

fn score_desc(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (false, false) => b.total_cmp(&a),
        (a_nan, b_nan) => a_nan.cmp(&b_nan),
    }
}

struct Observed {
    events: WireStream<StreamEvent>,
    context: InvocationContext,
    key: ProviderKey,
    callbacks: Vec<Arc<dyn InvocationCallback>>,
}

impl Observed {
    fn emit(&self, event: &StreamEvent) {
        for callback in &self.callbacks {
            callback.on_new_chunk(&self.context, event);
        }
    }

    fn finish(&self) {
        for callback in &self.callbacks {
            callback.on_after_invoke(&self.context, None);
        }
    }
}

/// Fire callbacks per event and guarantee a single trailing `Done`
fn observe_stream(
    events: WireStream<StreamEvent>,
    context: InvocationContext,
    key: ProviderKey,
    callbacks: Vec<Arc<dyn InvocationCallback>>,
) -> ChatStream {
    let observed = Observed {
        events,
        context,
        key,
        callbacks,
    };

    Box::pin(stream::unfold(Some(observed), |state| async move {
        let mut state = state?;

        match state.events.next().await {
            Some(Ok(StreamEvent::Done)) | None => {
                let event = StreamEvent::Done;
                state.emit(&event);
                state.finish();
                Some((Ok(event), None))
            }
            Some(Ok(event)) => {
                state.emit(&event);
                Some((Ok(event), Some(state)))
            }
            Some(Err(e)) => {
                let error = failure(state.context.capability, &state.key, e.into());
                for callback in &state.callbacks {
                    callback.on_invoke_error(&state.context, &error);
                }
                Some((Err(error), None))
            }
        }
    }))
}

fn audio_stream(chunks: WireStream<Vec<u8>>, key: ProviderKey) -> AudioStream {
    Box::pin(chunks.map(move |chunk| chunk.map_err(|e| failure(Capability::TextToSpeech, &key, e.into()))))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(index: usize, relevance_score: f64) -> RerankItem {
        RerankItem {
            index,
            relevance_score,
            document: format!("d{index}"),
        }
    }

    fn request(top_n: Option<usize>, score_threshold: Option<f64>) -> RerankRequest {
        RerankRequest {
            query: "q".to_owned(),
            documents: vec!["d0".to_owned(), "d1".to_owned(), "d2".to_owned()],
            top_n,
            score_threshold,
            ..RerankRequest::default()
        }
    }

    #[test]
    fn permutation_accepts_any_order() {
        let items = vec![item(2, 0.1), item(0, 0.5), item(1, 0.3)];
        assert!(check_permutation(&items, 3).is_ok());
    }

    #[test]
    fn permutation_rejects_drops_duplicates_and_range() {
        assert_eq!(
            check_permutation(&[item(0, 0.1), item(1, 0.1)], 3),
            Err(NormalizeError::CountMismatch { expected: 3, actual: 2 })
        );
        assert_eq!(
            check_permutation(&[item(0, 0.1), item(0, 0.2), item(1, 0.1)], 3),
            Err(NormalizeError::DuplicateIndex { index: 0 })
        );
        assert_eq!(
            check_permutation(&[item(3, 0.1)], 3),
            Err(NormalizeError::IndexOutOfRange { index: 3, len: 3 })
        );
    }

    #[test]
    fn rank_sorts_desc_with_index_tiebreak() {
        let result = RerankResult {
            items: vec![item(0, 0.2), item(2, 0.9), item(1, 0.9)],
            model: "m".to_owned(),
        };

        let ranked = rank(result, &request(None, None));
        let order: Vec<usize> = ranked.items.iter().map(|i| i.index).collect();
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn rank_puts_nan_scores_last() {
        let result = RerankResult {
            items: vec![item(0, f64::NAN), item(1, 0.1), item(2, -f64::NAN), item(3, 0.7)],
            model: "m".to_owned(),
        };

        let ranked = rank(result.clone(), &request(None, None));
        let order: Vec<usize> = ranked.items.iter().map(|i| i.index).collect();
        assert_eq!(order, vec![3, 1, 0, 2]);

        let ranked = rank(result, &request(None, Some(0.0)));
        assert_eq!(ranked.items.len(), 2);
    }

    #[test]
    fn rank_applies_threshold_then_top_n() {
        let result = RerankResult {
            items: vec![item(0, 0.8), item(1, 0.7), item(2, 0.6)],
            model: "m".to_owned(),
        };

        let ranked = rank(result.clone(), &request(None, Some(0.65)));
        assert_eq!(ranked.items.len(), 2);

        let ranked = rank(result, &request(Some(1), Some(0.65)));
        assert_eq!(ranked.items.len(), 1);
        assert_eq!(ranked.items[0].index, 0);
    }

    #[test]
    fn rerank_validation() {
        let mut blank = request(None, None);
        blank.query = "   ".to_owned();
        assert_eq!(validate_rerank(&blank), Err(TranslationError::EmptyField { field: "query" }));
        assert_eq!(validate_rerank(&request(Some(0), None)), Err(TranslationError::ZeroTopN));
        assert_eq!(validate_rerank(&request(Some(5), None)), Ok(()));
    }

    #[test]
    fn error_chain_joins_sources() {
        let kind = InvocationErrorKind::from(NormalizeError::MissingField { field: "usage" });
        assert_eq!(error_chain(&kind), "normalization failed: response is missing `usage`");
    }

    #[test]
    fn miss_paths_use_generic_estimates_and_empty_defaults() {
        let router = CapabilityRouter::builder().build();
        let messages = vec![PromptMessage::user("hello world"), PromptMessage::user("ab")];

        assert_eq!(router.count_tokens("nobody", &messages, &[]), 2);
        assert_eq!(router.count_embedding_tokens(ProviderId::Cohere, &["12345678".to_owned()]), vec![2]);
        assert!(router.routes().is_empty());
        assert_eq!(
            router.estimate_cost("openai", "gpt-4o", &Usage::prompt_only(100)),
            CostEstimate::default()
        );
    }

    #[test]
    fn builtin_estimators_cover_the_table() {
        let router = CapabilityRouter::builder().with_builtin_estimators().build();

        assert!(router.supports(Capability::TokenCount, "anthropic"));
        assert!(router.supports(Capability::EmbeddingTokenCount, "huggingface"));
        assert!(!router.supports(Capability::EmbeddingTokenCount, "anthropic"));
        assert!(router.supports(Capability::ListVoices, ProviderId::Azure));
        assert!(!router.supports(Capability::ListVoices, ProviderId::Google));
    }
}
