//! Callback that writes down what it was told

use std::sync::Mutex;

use switchyard_core::{
    ChatRequest, ChatResult, InvocationCallback, InvocationContext, InvocationError, InvocationParams, StreamEvent,
};

/// One recorded hook call
#[derive(Debug, Clone)]
pub enum Seen {
    Before { context: InvocationContext, messages: usize },
    Chunk { context: InvocationContext, event: StreamEvent },
    After { context: InvocationContext, result: Option<ChatResult> },
    Error { context: InvocationContext, message: String },
}

impl Seen {
    pub const fn hook(&self) -> &'static str {
        match self {
            Self::Before { .. } => "before",
            Self::Chunk { .. } => "chunk",
            Self::After { .. } => "after",
            Self::Error { .. } => "error",
        }
    }

    pub const fn context(&self) -> &InvocationContext {
        match self {
            Self::Before { context, .. }
            | Self::Chunk { context, .. }
            | Self::After { context, .. }
            | Self::Error { context, .. } => context,
        }
    }
}

/// Every callback invocation, in order
#[derive(Default)]
pub struct RecordingCallback {
    seen: Mutex<Vec<Seen>>,
}

impl RecordingCallback {
    pub fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }

    /// Names of the hooks fired, in order
    pub fn hooks(&self) -> Vec<&'static str> {
        self.seen().iter().map(Seen::hook).collect()
    }

    fn push(&self, seen: Seen) {
        self.seen.lock().unwrap().push(seen);
    }
}

impl InvocationCallback for RecordingCallback {
    fn on_before_invoke(&self, context: &InvocationContext, request: &ChatRequest, _params: &InvocationParams) {
        self.push(Seen::Before {
            context: context.clone(),
            messages: request.messages.len(),
        });
    }

    fn on_new_chunk(&self, context: &InvocationContext, event: &StreamEvent) {
        self.push(Seen::Chunk {
            context: context.clone(),
            event: event.clone(),
        });
    }

    fn on_after_invoke(&self, context: &InvocationContext, result: Option<&ChatResult>) {
        self.push(Seen::After {
            context: context.clone(),
            result: result.cloned(),
        });
    }

    fn on_invoke_error(&self, context: &InvocationContext, error: &InvocationError) {
        self.push(Seen::Error {
            context: context.clone(),
            message: error.to_string(),
        });
    }
}
