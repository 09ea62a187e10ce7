//! Condensing long text through a routed chat provider

use std::sync::Arc;

use crate::capability::ProviderKey;
use crate::error::InvocationError;
use crate::estimate::{CHARS_PER_TOKEN, estimate_text_tokens};
use crate::router::CapabilityRouter;
use crate::types::{ChatRequest, InvocationParams, PromptMessage};

/// Context window assumed when none is configured
pub const DEFAULT_CONTEXT_TOKENS: u32 = 4096;

/// Re-summarisation passes after the first
const MAX_EXTRA_PASSES: usize = 3;

const SYSTEM_PROMPT: &str = "You are a summarization assistant. Summarize the user's text concisely, \
keeping names, numbers and decisions. Reply with the summary only.";

/// Summarises text that does not fit comfortably in a model's context
#[derive(Debug, Clone)]
pub struct Summarizer {
    router: Arc<CapabilityRouter>,
    provider: ProviderKey,
    params: InvocationParams,
    context_tokens: u32,
}

impl Summarizer {
    /// Summarise with the chat route of `provider`
    pub fn new(router: Arc<CapabilityRouter>, provider: impl Into<ProviderKey>) -> Self {
        Self {
            router,
            provider: provider.into(),
            params: InvocationParams::default(),
            context_tokens: DEFAULT_CONTEXT_TOKENS,
        }
    }

    /// Parameters for every summarisation call
    #[must_use]
    pub fn with_params(mut self, params: InvocationParams) -> Self {
        self.params = params;
        self
    }

    /// Context window of the summarising model, in tokens
    #[must_use]
    pub fn with_context_tokens(mut self, context_tokens: u32) -> Self {
        self.context_tokens = context_tokens.max(1);
        self
    }

    /// Summarise `text` following `instruction`
    ///
    /// Text estimated under 60% of the context window is returned as is.
    pub async fn summarize(&self, text: &str, instruction: &str) -> Result<String, InvocationError> {
        if estimate_text_tokens(text) < percent(self.context_tokens, 60) {
            return Ok(text.to_owned());
        }

        let mut summary = self.summarize_chunks(text, instruction).await?;
        let limit = percent(self.context_tokens, 70);

        for pass in 0..MAX_EXTRA_PASSES {
            let before = estimate_text_tokens(&summary);
            if before <= limit {
                break;
            }

            let next = self.summarize_chunks(&summary, instruction).await?;
            let after = estimate_text_tokens(&next);
            tracing::debug!(pass, before, after, "re-summarized");

            let shrinking = after < before;
            summary = next;
            if !shrinking {
                break;
            }
        }

        Ok(summary)
    }

    async fn summarize_chunks(&self, text: &str, instruction: &str) -> Result<String, InvocationError> {
        let chunks = split_chunks(text, self.context_tokens);
        tracing::debug!(provider = %self.provider, chunks = chunks.len(), "summarizing");

        let system = if instruction.trim().is_empty() {
            SYSTEM_PROMPT.to_owned()
        } else {
            format!("{SYSTEM_PROMPT}\n{instruction}")
        };

        let mut summaries = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let request = ChatRequest::new(vec![PromptMessage::system(system.clone()), PromptMessage::user(chunk)]);
            let result = self
                .router
                .chat(self.provider.clone(), &request, &self.params, &[])
                .await?;
            summaries.push(result.content.unwrap_or_default());
        }

        Ok(summaries.join("\n"))
    }
}

fn percent(tokens: u32, pct: u32) -> u32 {
    tokens.saturating_mul(pct) / 100
}

/// Split on newlines, cut overlong lines, and pack lines into chunks under
/// 70% of the window
fn split_chunks(text: &str, context_tokens: u32) -> Vec<String> {
    let window_chars = usize::try_from(context_tokens / 2)
        .unwrap_or(usize::MAX)
        .saturating_mul(CHARS_PER_TOKEN)
        .max(1);
    let limit = percent(context_tokens, 70);

    let pieces = text.lines().filter(|l| !l.trim().is_empty()).flat_map(|line| {
        let chars: Vec<char> = line.chars().collect();
        chars
            .chunks(window_chars)
            .map(|window| window.iter().collect::<String>())
            .collect::<Vec<_>>()
    });

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_tokens = 0u32;

    for piece in pieces {
        let tokens = estimate_text_tokens(&piece);
        if !current.is_empty() && current_tokens.saturating_add(tokens) >= limit {
            chunks.push(std::mem::take(&mut current));
            current_tokens = 0;
        }
        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(&piece);
        current_tokens = current_tokens.saturating_add(tokens);
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
