//! Canned wire responses

use serde_json::json;
use switchyard_core::protocol::anthropic::{AnthropicResponse, AnthropicStreamEvent};
use switchyard_core::protocol::cohere::CohereRerankResponse;
use switchyard_core::protocol::openai::{OpenAiChatResponse, OpenAiEmbeddingResponse, OpenAiStreamChunk};
use switchyard_core::{ChatRequest, PromptMessage};

pub fn hello() -> ChatRequest {
    ChatRequest::new(vec![PromptMessage::system("Be brief."), PromptMessage::user("Hello")])
}

pub fn openai_chat(model: &str, content: &str) -> OpenAiChatResponse {
    serde_json::from_value(json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": model,
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
    }))
    .expect("valid chat completion")
}

pub fn openai_text_chunk(content: &str) -> OpenAiStreamChunk {
    serde_json::from_value(json!({
        "id": "chatcmpl-1",
        "object": "chat.completion.chunk",
        "model": "gpt-4o-mini",
        "choices": [{"index": 0, "delta": {"content": content}}]
    }))
    .expect("valid chunk")
}

pub fn openai_finish_chunk() -> OpenAiStreamChunk {
    serde_json::from_value(json!({
        "id": "chatcmpl-1",
        "model": "gpt-4o-mini",
        "choices": [{"index": 0, "delta": {}, "finish_reason": "stop"}]
    }))
    .expect("valid chunk")
}

pub fn openai_usage_chunk(prompt_tokens: u32, completion_tokens: u32) -> OpenAiStreamChunk {
    serde_json::from_value(json!({
        "id": "chatcmpl-1",
        "model": "gpt-4o-mini",
        "choices": [],
        "usage": {
            "prompt_tokens": prompt_tokens,
            "completion_tokens": completion_tokens,
            "total_tokens": prompt_tokens + completion_tokens
        }
    }))
    .expect("valid chunk")
}

pub fn anthropic_message(model: &str, text: &str) -> AnthropicResponse {
    serde_json::from_value(json!({
        "id": "msg_1",
        "type": "message",
        "role": "assistant",
        "model": model,
        "content": [{"type": "text", "text": text}],
        "stop_reason": "end_turn",
        "usage": {"input_tokens": 9, "output_tokens": 4}
    }))
    .expect("valid message")
}

/// A complete text-only event sequence, `message_stop` included
pub fn anthropic_events(parts: &[&str]) -> Vec<AnthropicStreamEvent> {
    let mut events = vec![
        json!({"type": "message_start", "message": {"id": "msg_1", "model": "claude", "usage": {"input_tokens": 9}}}),
        json!({"type": "content_block_start", "index": 0, "content_block": {"type": "text", "text": ""}}),
        json!({"type": "ping"}),
    ];
    events.extend(
        parts
            .iter()
            .map(|text| json!({"type": "content_block_delta", "index": 0, "delta": {"type": "text_delta", "text": text}})),
    );
    events.extend([
        json!({"type": "content_block_stop", "index": 0}),
        json!({"type": "message_delta", "delta": {"stop_reason": "end_turn"}, "usage": {"output_tokens": 4}}),
        json!({"type": "message_stop"}),
    ]);

    events
        .into_iter()
        .map(|event| serde_json::from_value(event).expect("valid stream event"))
        .collect()
}

/// One vector per input, listed in reverse input order
pub fn openai_embeddings_reversed(inputs: &[String]) -> OpenAiEmbeddingResponse {
    let data: Vec<_> = inputs
        .iter()
        .enumerate()
        .rev()
        .map(|(index, text)| json!({"object": "embedding", "index": index, "embedding": [index as f32, text.len() as f32]}))
        .collect();

    serde_json::from_value(json!({
        "object": "list",
        "data": data,
        "model": "text-embedding-3-small",
        "usage": {"prompt_tokens": 5, "total_tokens": 5}
    }))
    .expect("valid embeddings")
}

pub fn cohere_scores(scores: &[(usize, f64)]) -> CohereRerankResponse {
    let results: Vec<_> = scores
        .iter()
        .map(|(index, score)| json!({"index": index, "relevance_score": score}))
        .collect();

    serde_json::from_value(json!({"id": "rr-1", "results": results})).expect("valid rerank response")
}
