//! Conversion between canonical types and Anthropic wire format

use super::{ChatCodec, non_empty, stop_sequences};
use crate::capability::ProviderId;
use crate::error::NormalizeError;
use crate::protocol::anthropic::{
    AnthropicMessage, AnthropicRequest, AnthropicResponse, AnthropicResponseBlock, AnthropicStreamContentBlock,
    AnthropicStreamDelta, AnthropicStreamEvent, AnthropicTool, AnthropicUsage,
};
use crate::types::{
    ChatRequest, ChatResult, FinishReason, InvocationParams, StreamDelta, StreamEvent, StreamToolCall, ToolCall, Usage,
};

/// Default chat model
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-latest";

/// Default max tokens when not specified (Anthropic requires this field)
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Anthropic Messages API
#[derive(Debug, Clone, Copy, Default)]
pub struct AnthropicChat;

impl ChatCodec for AnthropicChat {
    const PROVIDER: ProviderId = ProviderId::Anthropic;
    const DEFAULT_MODEL: &'static str = DEFAULT_MODEL;

    type Request = AnthropicRequest;
    type Response = AnthropicResponse;
    type Chunk = AnthropicStreamEvent;
    type StreamState = AnthropicStreamState;

    fn translate(request: &ChatRequest, params: &InvocationParams, stream: bool) -> AnthropicRequest {
        AnthropicRequest {
            model: params.model_or(DEFAULT_MODEL).to_owned(),
            max_tokens: params.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            // One wire message per canonical message with the role kept as is.
            // `system` and `tool` turns are not hoisted; callers targeting the
            // live Messages API pass the system prompt through the backend.
            messages: request
                .messages
                .iter()
                .map(|m| AnthropicMessage {
                    role: m.role.as_str().to_owned(),
                    content: m.content.clone(),
                })
                .collect(),
            temperature: params.temperature,
            top_p: params.top_p,
            top_k: params.top_k,
            stop_sequences: stop_sequences(request, params),
            stream,
            tools: request
                .tools
                .iter()
                .map(|t| AnthropicTool {
                    name: t.name.clone(),
                    description: non_empty(&t.description),
                    input_schema: t.parameters.clone(),
                })
                .collect(),
        }
    }

    fn normalize(_request: &AnthropicRequest, response: AnthropicResponse) -> Result<ChatResult, NormalizeError> {
        let usage = response.usage.ok_or(NormalizeError::MissingField { field: "usage" })?;

        let mut text: Option<String> = None;
        let mut tool_calls = Vec::new();

        for block in response.content {
            match block {
                AnthropicResponseBlock::Text { text: fragment } => {
                    text.get_or_insert_with(String::new).push_str(&fragment);
                }
                AnthropicResponseBlock::ToolUse { id, name, input } => tool_calls.push(ToolCall {
                    id,
                    name,
                    arguments: input.to_string(),
                }),
            }
        }

        Ok(ChatResult {
            id: response.id,
            model: response.model,
            content: text,
            finish_reason: response.stop_reason.as_deref().and_then(parse_stop_reason),
            tool_calls,
            usage: usage_from_wire(usage),
        })
    }

    fn normalize_chunk(state: &mut AnthropicStreamState, chunk: AnthropicStreamEvent) -> Vec<StreamEvent> {
        state.convert_event(&chunk)
    }
}

fn parse_stop_reason(s: &str) -> Option<FinishReason> {
    match s {
        "end_turn" | "stop_sequence" => Some(FinishReason::Stop),
        "max_tokens" => Some(FinishReason::Length),
        "tool_use" => Some(FinishReason::ToolCalls),
        "refusal" => Some(FinishReason::ContentFilter),
        _ => None,
    }
}

const fn usage_from_wire(usage: AnthropicUsage) -> Usage {
    Usage {
        prompt_tokens: usage.input_tokens,
        completion_tokens: usage.output_tokens,
        total_tokens: usage.input_tokens + usage.output_tokens,
    }
}

/// Stateful converter for Anthropic SSE events
///
/// Anthropic numbers content blocks across all block types, so a tool use
/// following a text block has block index 1. Tool calls are numbered
/// separately here, 0-based in the order they start.
#[derive(Debug, Default)]
pub struct AnthropicStreamState {
    /// Index of the tool call currently being streamed
    current_tool_call: Option<u32>,
    /// Index the next tool call will receive
    next_tool_call: u32,
    /// Prompt tokens reported by `message_start`
    input_tokens: u32,
}

impl AnthropicStreamState {
    /// Create a new stream state tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert an Anthropic stream event to canonical stream events
    pub fn convert_event(&mut self, event: &AnthropicStreamEvent) -> Vec<StreamEvent> {
        match event {
            AnthropicStreamEvent::MessageStart { message } => {
                if let Some(usage) = message.usage {
                    self.input_tokens = usage.input_tokens;
                }
                Vec::new()
            }

            AnthropicStreamEvent::Ping => Vec::new(),

            AnthropicStreamEvent::ContentBlockStart { content_block, .. } => match content_block {
                AnthropicStreamContentBlock::Text { .. } => Vec::new(),
                AnthropicStreamContentBlock::ToolUse { id, name } => {
                    let index = self.next_tool_call;
                    self.next_tool_call += 1;
                    self.current_tool_call = Some(index);

                    vec![StreamEvent::Delta(StreamDelta {
                        tool_call: Some(StreamToolCall {
                            index,
                            id: Some(id.clone()),
                            name: Some(name.clone()),
                            arguments: None,
                        }),
                        ..StreamDelta::default()
                    })]
                }
            },

            AnthropicStreamEvent::ContentBlockDelta { delta, .. } => match delta {
                AnthropicStreamDelta::TextDelta { text } => vec![StreamEvent::Delta(StreamDelta::text(0, text.clone()))],
                AnthropicStreamDelta::InputJsonDelta { partial_json } => {
                    let Some(index) = self.current_tool_call else {
                        tracing::debug!("input_json_delta outside a tool_use block, dropping");
                        return Vec::new();
                    };

                    vec![StreamEvent::Delta(StreamDelta {
                        tool_call: Some(StreamToolCall {
                            index,
                            arguments: Some(partial_json.clone()),
                            ..StreamToolCall::default()
                        }),
                        ..StreamDelta::default()
                    })]
                }
            },

            AnthropicStreamEvent::ContentBlockStop { .. } => {
                self.current_tool_call = None;
                Vec::new()
            }

            AnthropicStreamEvent::MessageDelta { delta, usage } => {
                let mut events = Vec::new();

                if let Some(reason) = delta.stop_reason.as_deref().and_then(parse_stop_reason) {
                    events.push(StreamEvent::Delta(StreamDelta::finish(0, reason)));
                }

                if let Some(usage) = usage {
                    let prompt_tokens = if usage.input_tokens > 0 {
                        usage.input_tokens
                    } else {
                        self.input_tokens
                    };
                    events.push(StreamEvent::Usage(Usage {
                        prompt_tokens,
                        completion_tokens: usage.output_tokens,
                        total_tokens: prompt_tokens + usage.output_tokens,
                    }));
                }

                events
            }

            AnthropicStreamEvent::MessageStop => vec![StreamEvent::Done],
        }
    }
}
