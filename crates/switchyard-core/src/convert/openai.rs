//! Conversion between canonical types and `OpenAI` wire formats

use super::{
    ChatCodec, EmbeddingCodec, ModerationCodec, SttCodec, TtsCodec, non_empty, stop_sequences,
};
use crate::capability::ProviderId;
use crate::error::NormalizeError;
use crate::protocol::openai::{
    OpenAiChatRequest, OpenAiChatResponse, OpenAiEmbeddingRequest, OpenAiEmbeddingResponse, OpenAiFunction,
    OpenAiMessage, OpenAiModerationRequest, OpenAiModerationResponse, OpenAiSpeechRequest, OpenAiStreamChoice,
    OpenAiStreamChunk, OpenAiStreamOptions, OpenAiTool, OpenAiToolCall, OpenAiTranscriptionRequest,
    OpenAiTranscriptionResponse, OpenAiUsage,
};
use crate::types::{
    ChatRequest, ChatResult, EmbeddingRequest, EmbeddingResult, FinishReason, InvocationParams, ModerationRequest,
    StreamDelta, StreamEvent, StreamToolCall, SttRequest, ToolCall, Transcription, TtsRequest, Usage,
};

/// Default chat model
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
/// Default embedding model
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";
/// Default speech model
pub const DEFAULT_SPEECH_MODEL: &str = "tts-1";
/// Default voice
pub const DEFAULT_VOICE: &str = "alloy";
/// Default audio container
pub const DEFAULT_AUDIO_FORMAT: &str = "mp3";
/// Default playback speed
pub const DEFAULT_SPEED: f64 = 1.0;
/// Default transcription model
pub const DEFAULT_TRANSCRIPTION_MODEL: &str = "whisper-1";
/// Default transcription language
pub const DEFAULT_TRANSCRIPTION_LANGUAGE: &str = "en";
/// Default transcription response format
pub const DEFAULT_TRANSCRIPTION_FORMAT: &str = "json";
/// Default moderation model
pub const DEFAULT_MODERATION_MODEL: &str = "text-moderation-latest";

/// `OpenAI` chat completions
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAiChat;

impl ChatCodec for OpenAiChat {
    const PROVIDER: ProviderId = ProviderId::OpenAi;
    const DEFAULT_MODEL: &'static str = DEFAULT_CHAT_MODEL;

    type Request = OpenAiChatRequest;
    type Response = OpenAiChatResponse;
    type Chunk = OpenAiStreamChunk;
    type StreamState = ();

    fn translate(request: &ChatRequest, params: &InvocationParams, stream: bool) -> OpenAiChatRequest {
        OpenAiChatRequest {
            model: params.model_or(DEFAULT_CHAT_MODEL).to_owned(),
            messages: request
                .messages
                .iter()
                .map(|m| OpenAiMessage {
                    role: m.role.as_str().to_owned(),
                    content: m.content.clone(),
                })
                .collect(),
            temperature: params.temperature,
            top_p: params.top_p,
            max_tokens: params.max_tokens,
            stop: stop_sequences(request, params),
            frequency_penalty: params.frequency_penalty,
            presence_penalty: params.presence_penalty,
            stream,
            tools: request
                .tools
                .iter()
                .map(|t| OpenAiTool {
                    tool_type: "function".to_owned(),
                    function: OpenAiFunction {
                        name: t.name.clone(),
                        description: non_empty(&t.description),
                        parameters: Some(t.parameters.clone()),
                    },
                })
                .collect(),
            stream_options: stream.then_some(OpenAiStreamOptions { include_usage: true }),
        }
    }

    fn normalize(_request: &OpenAiChatRequest, response: OpenAiChatResponse) -> Result<ChatResult, NormalizeError> {
        let usage = response.usage.ok_or(NormalizeError::MissingField { field: "usage" })?;
        let first = response.choices.into_iter().next();

        let (content, finish_reason, tool_calls) = match first {
            Some(choice) => (
                choice.message.content,
                choice.finish_reason.as_deref().and_then(parse_finish_reason),
                choice
                    .message
                    .tool_calls
                    .unwrap_or_default()
                    .into_iter()
                    .map(tool_call_from_wire)
                    .collect(),
            ),
            None => (None, None, Vec::new()),
        };

        Ok(ChatResult {
            id: response.id,
            model: response.model,
            content,
            finish_reason,
            tool_calls,
            usage: usage_from_wire(usage),
        })
    }

    fn normalize_chunk(_state: &mut (), chunk: OpenAiStreamChunk) -> Vec<StreamEvent> {
        let mut events: Vec<StreamEvent> = chunk
            .choices
            .iter()
            .map(|choice| StreamEvent::Delta(stream_choice_to_delta(choice)))
            .collect();

        if let Some(usage) = chunk.usage {
            events.push(StreamEvent::Usage(usage_from_wire(usage)));
        }

        events
    }
}

/// Convert an `OpenAI` stream choice to a canonical stream delta
fn stream_choice_to_delta(choice: &OpenAiStreamChoice) -> StreamDelta {
    let tool_call = choice
        .delta
        .tool_calls
        .as_ref()
        .and_then(|calls| calls.first())
        .map(|tc| StreamToolCall {
            index: tc.index,
            id: tc.id.clone(),
            name: tc.function.as_ref().and_then(|f| f.name.clone()),
            arguments: tc.function.as_ref().and_then(|f| f.arguments.clone()),
        });

    StreamDelta {
        index: choice.index,
        content: choice.delta.content.clone(),
        tool_call,
        finish_reason: choice.finish_reason.as_deref().and_then(parse_finish_reason),
    }
}

fn tool_call_from_wire(call: OpenAiToolCall) -> ToolCall {
    ToolCall {
        id: call.id,
        name: call.function.name,
        arguments: call.function.arguments,
    }
}

const fn usage_from_wire(usage: OpenAiUsage) -> Usage {
    Usage {
        prompt_tokens: usage.prompt_tokens,
        completion_tokens: usage.completion_tokens,
        total_tokens: usage.total_tokens,
    }
}

fn parse_finish_reason(s: &str) -> Option<FinishReason> {
    match s {
        "stop" => Some(FinishReason::Stop),
        "length" => Some(FinishReason::Length),
        "tool_calls" | "function_call" => Some(FinishReason::ToolCalls),
        "content_filter" => Some(FinishReason::ContentFilter),
        _ => None,
    }
}

/// `OpenAI` embeddings
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAiEmbedding;

impl EmbeddingCodec for OpenAiEmbedding {
    const PROVIDER: ProviderId = ProviderId::OpenAi;
    const DEFAULT_MODEL: &'static str = DEFAULT_EMBEDDING_MODEL;

    type Request = OpenAiEmbeddingRequest;
    type Response = OpenAiEmbeddingResponse;

    fn translate(request: &EmbeddingRequest, params: &InvocationParams) -> OpenAiEmbeddingRequest {
        OpenAiEmbeddingRequest {
            model: params.model_or(DEFAULT_EMBEDDING_MODEL).to_owned(),
            input: request.texts.clone(),
            encoding_format: "float".to_owned(),
            user: request.user.clone(),
        }
    }

    fn normalize(
        request: &OpenAiEmbeddingRequest,
        response: OpenAiEmbeddingResponse,
    ) -> Result<EmbeddingResult, NormalizeError> {
        let usage = response.usage.ok_or(NormalizeError::MissingField { field: "usage" })?;

        let len = request.input.len();
        if response.data.len() != len {
            return Err(NormalizeError::CountMismatch {
                expected: len,
                actual: response.data.len(),
            });
        }

        // Entries may arrive in any order; place each by its input index
        let mut slots: Vec<Option<Vec<f32>>> = vec![None; len];
        for item in response.data {
            let slot = slots.get_mut(item.index).ok_or(NormalizeError::IndexOutOfRange {
                index: item.index,
                len,
            })?;
            if slot.is_some() {
                return Err(NormalizeError::DuplicateIndex { index: item.index });
            }
            *slot = Some(item.embedding);
        }

        Ok(EmbeddingResult {
            // Count matched and no index repeated, so every slot is filled
            embeddings: slots.into_iter().flatten().collect(),
            model: response.model,
            usage: Usage {
                prompt_tokens: usage.prompt_tokens,
                completion_tokens: 0,
                total_tokens: usage.total_tokens,
            },
        })
    }
}

/// `OpenAI` speech synthesis
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAiSpeech;

impl TtsCodec for OpenAiSpeech {
    const PROVIDER: ProviderId = ProviderId::OpenAi;
    const DEFAULT_MODEL: &'static str = DEFAULT_SPEECH_MODEL;

    type Request = OpenAiSpeechRequest;

    fn translate(request: &TtsRequest, params: &InvocationParams) -> OpenAiSpeechRequest {
        OpenAiSpeechRequest {
            model: params.model_or(DEFAULT_SPEECH_MODEL).to_owned(),
            input: request.text.clone(),
            voice: request.voice.clone().unwrap_or_else(|| DEFAULT_VOICE.to_owned()),
            response_format: DEFAULT_AUDIO_FORMAT.to_owned(),
            speed: DEFAULT_SPEED,
        }
    }
}

/// `OpenAI` Whisper transcription
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAiTranscription;

impl SttCodec for OpenAiTranscription {
    const PROVIDER: ProviderId = ProviderId::OpenAi;
    const DEFAULT_MODEL: &'static str = DEFAULT_TRANSCRIPTION_MODEL;

    type Request = OpenAiTranscriptionRequest;
    type Response = OpenAiTranscriptionResponse;

    fn translate(request: &SttRequest, params: &InvocationParams) -> OpenAiTranscriptionRequest {
        OpenAiTranscriptionRequest {
            file: request.audio.clone(),
            filename: request.filename.clone().unwrap_or_else(|| "audio.mp3".to_owned()),
            model: params.model_or(DEFAULT_TRANSCRIPTION_MODEL).to_owned(),
            language: request
                .language
                .clone()
                .unwrap_or_else(|| DEFAULT_TRANSCRIPTION_LANGUAGE.to_owned()),
            response_format: DEFAULT_TRANSCRIPTION_FORMAT.to_owned(),
        }
    }

    fn normalize(
        _request: &OpenAiTranscriptionRequest,
        response: OpenAiTranscriptionResponse,
    ) -> Result<Transcription, NormalizeError> {
        Ok(Transcription { text: response.text })
    }
}

/// `OpenAI` moderation
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAiModeration;

impl ModerationCodec for OpenAiModeration {
    const PROVIDER: ProviderId = ProviderId::OpenAi;
    const DEFAULT_MODEL: &'static str = DEFAULT_MODERATION_MODEL;

    type Request = OpenAiModerationRequest;
    type Response = OpenAiModerationResponse;

    fn translate(request: &ModerationRequest, params: &InvocationParams) -> OpenAiModerationRequest {
        OpenAiModerationRequest {
            model: params.model_or(DEFAULT_MODERATION_MODEL).to_owned(),
            input: request.text.clone(),
        }
    }

    fn normalize(_request: &OpenAiModerationRequest, response: OpenAiModerationResponse) -> Result<bool, NormalizeError> {
        Ok(response.results.first().is_some_and(|r| r.flagged))
    }
}
