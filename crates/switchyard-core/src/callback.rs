//! Progress callbacks for chat invocations

use uuid::Uuid;

use crate::capability::{Capability, ProviderId};
use crate::error::InvocationError;
use crate::types::{ChatRequest, ChatResult, InvocationParams, StreamEvent};

/// What a callback is being told about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationContext {
    /// `Chat` or `ChatStream`
    pub capability: Capability,
    /// Provider the call was routed to
    pub provider: ProviderId,
    /// Model named in the wire request
    pub model: String,
    /// Unique per routed call; shared by every event of one stream
    pub invocation_id: Uuid,
}

impl InvocationContext {
    pub(crate) fn new(capability: Capability, provider: ProviderId, model: impl Into<String>) -> Self {
        Self {
            capability,
            provider,
            model: model.into(),
            invocation_id: Uuid::new_v4(),
        }
    }
}

/// Observer of chat invocations
///
/// All methods default to no-ops. Callbacks see results but cannot alter them.
pub trait InvocationCallback: Send + Sync {
    /// Before the backend is called
    fn on_before_invoke(&self, _context: &InvocationContext, _request: &ChatRequest, _params: &InvocationParams) {}

    /// For every event a stream yields, including the final `Done`
    fn on_new_chunk(&self, _context: &InvocationContext, _event: &StreamEvent) {}

    /// After a blocking call returns, or once a stream has ended;
    /// streams pass `None`
    fn on_after_invoke(&self, _context: &InvocationContext, _result: Option<&ChatResult>) {}

    /// When the call or a stream frame fails
    fn on_invoke_error(&self, _context: &InvocationContext, _error: &InvocationError) {}
}
