//! Conversion between canonical types and Google Generative Language wire format

use super::{ChatCodec, non_empty, stop_sequences};
use crate::capability::ProviderId;
use crate::error::NormalizeError;
use crate::protocol::google::{
    GoogleCandidate, GoogleContent, GoogleFunctionDeclaration, GoogleGenerationConfig, GooglePart, GoogleRequest,
    GoogleResponse, GoogleTool, GoogleUsageMetadata,
};
use crate::types::{
    ChatRequest, ChatResult, FinishReason, InvocationParams, Role, StreamDelta, StreamEvent, StreamToolCall, ToolCall,
    Usage,
};

/// Default chat model
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Google `generateContent`
#[derive(Debug, Clone, Copy, Default)]
pub struct GoogleChat;

impl ChatCodec for GoogleChat {
    const PROVIDER: ProviderId = ProviderId::Google;
    const DEFAULT_MODEL: &'static str = DEFAULT_MODEL;

    type Request = GoogleRequest;
    type Response = GoogleResponse;
    type Chunk = GoogleResponse;
    type StreamState = GoogleStreamState;

    fn translate(request: &ChatRequest, params: &InvocationParams, stream: bool) -> GoogleRequest {
        // One content per message in request order. `system` is not moved
        // into `systemInstruction`, so the live API needs the backend to do it.
        let contents = request
            .messages
            .iter()
            .map(|m| GoogleContent {
                role: Some(google_role(m.role).to_owned()),
                parts: vec![GooglePart::Text(m.content.clone())],
            })
            .collect();

        let generation_config = GoogleGenerationConfig {
            temperature: params.temperature,
            top_p: params.top_p,
            top_k: params.top_k,
            max_output_tokens: params.max_tokens,
            stop_sequences: stop_sequences(request, params),
            presence_penalty: params.presence_penalty,
            frequency_penalty: params.frequency_penalty,
        };

        // All declarations share one tool wrapper
        let tools = if request.tools.is_empty() {
            Vec::new()
        } else {
            vec![GoogleTool {
                function_declarations: request
                    .tools
                    .iter()
                    .map(|t| GoogleFunctionDeclaration {
                        name: t.name.clone(),
                        description: non_empty(&t.description),
                        parameters: Some(t.parameters.clone()),
                    })
                    .collect(),
            }]
        };

        GoogleRequest {
            model: params.model_or(DEFAULT_MODEL).to_owned(),
            stream,
            contents,
            generation_config,
            tools,
        }
    }

    fn normalize(request: &GoogleRequest, response: GoogleResponse) -> Result<ChatResult, NormalizeError> {
        let usage = response
            .usage_metadata
            .ok_or(NormalizeError::MissingField { field: "usageMetadata" })?;

        let (content, finish_reason, tool_calls) = match response.candidates.into_iter().next() {
            Some(candidate) => candidate_parts(candidate),
            None => (None, None, Vec::new()),
        };

        Ok(ChatResult {
            id: response.response_id.unwrap_or_default(),
            model: response.model_version.unwrap_or_else(|| request.model.clone()),
            content,
            finish_reason,
            tool_calls,
            usage: usage_from_wire(usage),
        })
    }

    fn normalize_chunk(state: &mut GoogleStreamState, chunk: GoogleResponse) -> Vec<StreamEvent> {
        let mut events = Vec::new();

        for (i, candidate) in chunk.candidates.iter().enumerate() {
            let index = candidate.index.unwrap_or_else(|| u32::try_from(i).unwrap_or(u32::MAX));

            for part in &candidate.content.parts {
                match part {
                    GooglePart::Text(text) => events.push(StreamEvent::Delta(StreamDelta::text(index, text.clone()))),
                    GooglePart::FunctionCall(fc) => {
                        events.push(StreamEvent::Delta(StreamDelta {
                            index,
                            tool_call: Some(StreamToolCall {
                                index: state.next_tool_call,
                                id: Some(format!("call_{}", fc.name)),
                                name: Some(fc.name.clone()),
                                arguments: Some(fc.args.to_string()),
                            }),
                            ..StreamDelta::default()
                        }));
                        state.next_tool_call += 1;
                    }
                }
            }

            if let Some(reason) = candidate.finish_reason.as_deref().and_then(parse_finish_reason) {
                events.push(StreamEvent::Delta(StreamDelta::finish(index, reason)));
            }
        }

        if let Some(usage) = chunk.usage_metadata {
            events.push(StreamEvent::Usage(usage_from_wire(usage)));
        }

        events
    }
}

/// Tool call numbering across the frames of one stream
///
/// Gemini sends each function call whole; calls are numbered in arrival
/// order over the whole stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoogleStreamState {
    next_tool_call: u32,
}

/// Google role names; assistant turns are "model", tool results "function"
const fn google_role(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "model",
        Role::Tool => "function",
    }
}

fn candidate_parts(candidate: GoogleCandidate) -> (Option<String>, Option<FinishReason>, Vec<ToolCall>) {
    let mut text: Option<String> = None;
    let mut tool_calls = Vec::new();

    for part in candidate.content.parts {
        match part {
            GooglePart::Text(fragment) => text.get_or_insert_with(String::new).push_str(&fragment),
            GooglePart::FunctionCall(fc) => tool_calls.push(ToolCall {
                id: format!("call_{}", fc.name),
                arguments: fc.args.to_string(),
                name: fc.name,
            }),
        }
    }

    let finish_reason = candidate.finish_reason.as_deref().and_then(parse_finish_reason);
    (text, finish_reason, tool_calls)
}

fn parse_finish_reason(s: &str) -> Option<FinishReason> {
    match s {
        "STOP" => Some(FinishReason::Stop),
        "MAX_TOKENS" => Some(FinishReason::Length),
        "SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" => Some(FinishReason::ContentFilter),
        _ => None,
    }
}

const fn usage_from_wire(usage: GoogleUsageMetadata) -> Usage {
    Usage {
        prompt_tokens: usage.prompt_token_count,
        completion_tokens: usage.candidates_token_count,
        total_tokens: usage.total_token_count,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::{PromptMessage, ToolSpec};

    fn request() -> ChatRequest {
        ChatRequest::new(vec![
            PromptMessage::system("You are helpful."),
            PromptMessage::user("Hi"),
            PromptMessage::assistant("Hello!"),
            PromptMessage::tool("{}"),
        ])
    }

    #[test]
    fn translate_renames_roles_in_order() {
        let wire = GoogleChat::translate(&request(), &InvocationParams::default(), false);

        let roles: Vec<&str> = wire.contents.iter().filter_map(|c| c.role.as_deref()).collect();
        assert_eq!(roles, vec!["system", "user", "model", "function"]);
        assert_eq!(wire.contents[2].parts, vec![GooglePart::Text("Hello!".to_owned())]);
        assert_eq!(wire.model, DEFAULT_MODEL);
        assert!(wire.tools.is_empty());
    }

    #[test]
    fn translate_fills_generation_config() {
        let params = InvocationParams {
            model: Some("gemini-1.5-pro".to_owned()),
            temperature: Some(0.4),
            top_p: Some(0.95),
            top_k: Some(32),
            max_tokens: Some(2048),
            presence_penalty: Some(0.1),
            frequency_penalty: Some(0.2),
            stop_sequences: None,
        };
        let wire = GoogleChat::translate(&request().with_stop(vec!["<end>".to_owned()]), &params, true);

        assert_eq!(wire.model, "gemini-1.5-pro");
        assert!(wire.stream);

        let body = serde_json::to_value(&wire).unwrap();
        assert!(body.get("model").is_none());
        assert_eq!(
            body["generationConfig"],
            json!({
                "temperature": 0.4,
                "topP": 0.95,
                "topK": 32,
                "maxOutputTokens": 2048,
                "stopSequences": ["<end>"],
                "presencePenalty": 0.1,
                "frequencyPenalty": 0.2
            })
        );
    }

    #[test]
    fn translate_groups_tools_into_one_wrapper() {
        let request = request().with_tools(vec![
            ToolSpec::new("a", "first", json!({"type": "object"})),
            ToolSpec::new("b", "second", json!({"type": "object"})),
        ]);
        let wire = GoogleChat::translate(&request, &InvocationParams::default(), false);

        assert_eq!(wire.tools.len(), 1);
        assert_eq!(wire.tools[0].function_declarations.len(), 2);

        let body = serde_json::to_value(&wire).unwrap();
        assert_eq!(body["tools"][0]["functionDeclarations"][1]["name"], "b");
    }

    #[test]
    fn normalize_first_candidate() {
        let wire = GoogleChat::translate(&request(), &InvocationParams::default(), false);
        let response: GoogleResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Hi "}, {"text": "there"}]},
                "finishReason": "STOP",
                "index": 0
            }],
            "usageMetadata": {"promptTokenCount": 4, "candidatesTokenCount": 2, "totalTokenCount": 6},
            "responseId": "resp-1"
        }))
        .unwrap();

        let result = GoogleChat::normalize(&wire, response).unwrap();

        assert_eq!(result.id, "resp-1");
        assert_eq!(result.model, DEFAULT_MODEL);
        assert_eq!(result.content.as_deref(), Some("Hi there"));
        assert_eq!(result.finish_reason, Some(FinishReason::Stop));
        assert_eq!(result.usage.total_tokens, 6);
    }

    #[test]
    fn normalize_no_candidates_omits_content() {
        let wire = GoogleChat::translate(&request(), &InvocationParams::default(), false);
        let response: GoogleResponse = serde_json::from_value(json!({
            "candidates": [],
            "usageMetadata": {"promptTokenCount": 4, "totalTokenCount": 4},
            "modelVersion": "gemini-1.5-flash-002"
        }))
        .unwrap();

        let result = GoogleChat::normalize(&wire, response).unwrap();
        assert_eq!(result.content, None);
        assert_eq!(result.model, "gemini-1.5-flash-002");
    }

    #[test]
    fn normalize_without_usage_metadata_is_an_error() {
        let wire = GoogleChat::translate(&request(), &InvocationParams::default(), false);
        let response: GoogleResponse = serde_json::from_value(json!({"candidates": []})).unwrap();

        assert_eq!(
            GoogleChat::normalize(&wire, response).unwrap_err(),
            NormalizeError::MissingField { field: "usageMetadata" }
        );
    }

    #[test]
    fn chunk_maps_text_function_call_and_finish() {
        let chunk: GoogleResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [
                    {"text": "Looking up"},
                    {"functionCall": {"name": "lookup", "args": {"q": "x"}}}
                ]},
                "finishReason": "SAFETY"
            }]
        }))
        .unwrap();

        let events = GoogleChat::normalize_chunk(&mut GoogleStreamState::default(), chunk);

        assert_eq!(events.len(), 3);
        assert_eq!(events[0], StreamEvent::Delta(StreamDelta::text(0, "Looking up")));
        let StreamEvent::Delta(call) = &events[1] else {
            panic!("expected function call delta");
        };
        let tool_call = call.tool_call.as_ref().unwrap();
        assert_eq!(tool_call.name.as_deref(), Some("lookup"));
        assert_eq!(tool_call.arguments.as_deref(), Some("{\"q\":\"x\"}"));
        assert_eq!(events[2], StreamEvent::Delta(StreamDelta::finish(0, FinishReason::ContentFilter)));
    }

    #[test]
    fn normalize_blocked_candidate_without_content() {
        let wire = GoogleChat::translate(&request(), &InvocationParams::default(), false);
        let response: GoogleResponse = serde_json::from_value(json!({
            "candidates": [{
                "finishReason": "SAFETY",
                "index": 0,
                "safetyRatings": [{"category": "HARM_CATEGORY_HARASSMENT", "probability": "HIGH"}]
            }],
            "usageMetadata": {"promptTokenCount": 5, "totalTokenCount": 5}
        }))
        .unwrap();

        let result = GoogleChat::normalize(&wire, response).unwrap();

        assert_eq!(result.content, None);
        assert!(result.tool_calls.is_empty());
        assert_eq!(result.finish_reason, Some(FinishReason::ContentFilter));
    }

    #[test]
    fn chunk_tool_calls_are_numbered_across_frames() {
        let mut state = GoogleStreamState::default();
        let frame = |name: &str| -> GoogleResponse {
            serde_json::from_value(json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"functionCall": {"name": name, "args": {}}}]},
                    "index": 0
                }]
            }))
            .unwrap()
        };

        let calls: Vec<(Option<String>, u32)> = [frame("a"), frame("b")]
            .into_iter()
            .flat_map(|chunk| GoogleChat::normalize_chunk(&mut state, chunk))
            .filter_map(|event| match event {
                StreamEvent::Delta(StreamDelta {
                    tool_call: Some(call), ..
                }) => Some((call.name, call.index)),
                _ => None,
            })
            .collect();

        assert_eq!(calls, vec![(Some("a".to_owned()), 0), (Some("b".to_owned()), 1)]);
    }
}
