//! Recording fake backends
//!
//! A fake answers from a scripted closure and remembers every wire request
//! it was handed, so tests can assert both on what the router returned and
//! on what reached the port.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures_util::stream;
use switchyard_core::convert::{ChatCodec, EmbeddingCodec, ModerationCodec, RerankCodec, SttCodec, TtsCodec};
use switchyard_core::estimate::EstimateError;
use switchyard_core::{
    BackendError, ChatBackend, EmbeddingBackend, ModerationBackend, PromptMessage, RerankBackend, SttBackend,
    TokenEstimator, ToolSpec, TtsBackend, TtsVoice, VoiceCatalog, WireStream,
};

type Reply<Req, Resp> = Box<dyn Fn(&Req) -> Result<Resp, BackendError> + Send + Sync>;

/// Call counter and request log
struct Log<Req> {
    calls: AtomicUsize,
    requests: Mutex<Vec<Req>>,
}

impl<Req: Clone> Log<Req> {
    const fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn record(&self, request: &Req) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn requests(&self) -> Vec<Req> {
        self.requests.lock().unwrap().clone()
    }
}

/// Fake backend for the port of codec `C`
pub struct Fake<C, Req, Resp> {
    log: Log<Req>,
    reply: Reply<Req, Resp>,
    codec: PhantomData<fn() -> C>,
}

pub type FakeEmbedding<C> = Fake<C, <C as EmbeddingCodec>::Request, <C as EmbeddingCodec>::Response>;
pub type FakeRerank<C> = Fake<C, <C as RerankCodec>::Request, <C as RerankCodec>::Response>;
pub type FakeTts<C> = Fake<C, <C as TtsCodec>::Request, Vec<Vec<u8>>>;
pub type FakeStt<C> = Fake<C, <C as SttCodec>::Request, <C as SttCodec>::Response>;
pub type FakeModeration<C> = Fake<C, <C as ModerationCodec>::Request, <C as ModerationCodec>::Response>;

impl<C, Req: Clone, Resp> Fake<C, Req, Resp> {
    /// Answer every request with `reply`
    pub fn new(reply: impl Fn(&Req) -> Result<Resp, BackendError> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            log: Log::new(),
            reply: Box::new(reply),
            codec: PhantomData,
        })
    }

    /// Fail every request with `message`
    pub fn failing(message: &'static str) -> Arc<Self> {
        Self::new(move |_| Err(BackendError::new(message)))
    }

    pub fn calls(&self) -> usize {
        self.log.calls()
    }

    pub fn requests(&self) -> Vec<Req> {
        self.log.requests()
    }

    pub fn last_request(&self) -> Req {
        self.requests().pop().expect("no request recorded")
    }

    fn respond(&self, request: &Req) -> Result<Resp, BackendError> {
        self.log.record(request);
        (self.reply)(request)
    }
}

#[async_trait]
impl<C> EmbeddingBackend<C> for Fake<C, C::Request, C::Response>
where
    C: EmbeddingCodec,
    C::Request: Clone,
{
    async fn embed(&self, request: &C::Request) -> Result<C::Response, BackendError> {
        self.respond(request)
    }
}

#[async_trait]
impl<C> RerankBackend<C> for Fake<C, C::Request, C::Response>
where
    C: RerankCodec,
    C::Request: Clone,
{
    async fn rerank(&self, request: &C::Request) -> Result<C::Response, BackendError> {
        self.respond(request)
    }
}

#[async_trait]
impl<C> TtsBackend<C> for Fake<C, C::Request, Vec<Vec<u8>>>
where
    C: TtsCodec,
    C::Request: Clone,
{
    async fn synthesize(&self, request: &C::Request) -> Result<WireStream<Vec<u8>>, BackendError> {
        let chunks = self.respond(request)?;
        Ok(Box::pin(stream::iter(chunks.into_iter().map(Ok))))
    }
}

#[async_trait]
impl<C> SttBackend<C> for Fake<C, C::Request, C::Response>
where
    C: SttCodec,
    C::Request: Clone,
{
    async fn transcribe(&self, request: &C::Request) -> Result<C::Response, BackendError> {
        self.respond(request)
    }
}

#[async_trait]
impl<C> ModerationBackend<C> for Fake<C, C::Request, C::Response>
where
    C: ModerationCodec,
    C::Request: Clone,
{
    async fn classify(&self, request: &C::Request) -> Result<C::Response, BackendError> {
        self.respond(request)
    }
}

type Frames<C> =
    Box<dyn Fn(&<C as ChatCodec>::Request) -> Vec<Result<<C as ChatCodec>::Chunk, BackendError>> + Send + Sync>;

/// Fake chat backend; blocking and streaming calls share one request log
pub struct FakeChat<C: ChatCodec> {
    log: Log<C::Request>,
    reply: Reply<C::Request, C::Response>,
    frames: Frames<C>,
    refuse_stream: Option<&'static str>,
}

impl<C> FakeChat<C>
where
    C: ChatCodec,
    C::Request: Clone,
{
    /// Answer blocking calls with `reply`; streams yield nothing
    pub fn replying(
        reply: impl Fn(&C::Request) -> Result<C::Response, BackendError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            log: Log::new(),
            reply: Box::new(reply),
            frames: Box::new(|_| Vec::new()),
            refuse_stream: None,
        })
    }

    /// Answer streaming calls with `frames`; blocking calls fail
    pub fn streaming(
        frames: impl Fn(&C::Request) -> Vec<Result<C::Chunk, BackendError>> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            log: Log::new(),
            reply: Box::new(|_| Err(BackendError::new("blocking call not scripted"))),
            frames: Box::new(frames),
            refuse_stream: None,
        })
    }

    /// Fail blocking calls and refuse to open streams
    pub fn failing(message: &'static str) -> Arc<Self> {
        Arc::new(Self {
            log: Log::new(),
            reply: Box::new(move |_| Err(BackendError::new(message))),
            frames: Box::new(|_| Vec::new()),
            refuse_stream: Some(message),
        })
    }

    pub fn calls(&self) -> usize {
        self.log.calls()
    }

    pub fn requests(&self) -> Vec<C::Request> {
        self.log.requests()
    }

    pub fn last_request(&self) -> C::Request {
        self.requests().pop().expect("no request recorded")
    }
}

#[async_trait]
impl<C> ChatBackend<C> for FakeChat<C>
where
    C: ChatCodec,
    C::Request: Clone,
{
    async fn invoke(&self, request: &C::Request) -> Result<C::Response, BackendError> {
        self.log.record(request);
        (self.reply)(request)
    }

    async fn invoke_stream(&self, request: &C::Request) -> Result<WireStream<C::Chunk>, BackendError> {
        self.log.record(request);
        if let Some(message) = self.refuse_stream {
            return Err(BackendError::new(message));
        }
        Ok(Box::pin(stream::iter((self.frames)(request))))
    }
}

/// Estimator that always fails, or miscounts embeddings
pub struct BrokenEstimator {
    pub short_by: Option<usize>,
}

impl TokenEstimator for BrokenEstimator {
    fn count_tokens(&self, _messages: &[PromptMessage], _tools: &[ToolSpec]) -> Result<u32, EstimateError> {
        Err(EstimateError("tokenizer unavailable".to_owned()))
    }

    fn count_embedding_tokens(&self, texts: &[String]) -> Result<Vec<u32>, EstimateError> {
        match self.short_by {
            Some(n) => Ok(vec![1; texts.len().saturating_sub(n)]),
            None => Err(EstimateError("tokenizer unavailable".to_owned())),
        }
    }
}

/// Voice catalogue whose listing always fails
pub struct UnreachableVoices;

#[async_trait]
impl VoiceCatalog for UnreachableVoices {
    async fn list_voices(&self, _language: Option<&str>) -> Result<Vec<TtsVoice>, BackendError> {
        Err(BackendError::new("voice listing endpoint unreachable"))
    }
}
