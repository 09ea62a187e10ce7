//! Conversion between canonical types and Azure AI Speech / Content Safety

use std::fmt::Write as _;

use super::{ModerationCodec, SttCodec, TtsCodec};
use crate::capability::ProviderId;
use crate::error::NormalizeError;
use crate::protocol::azure::{
    AzureContentSafetyRequest, AzureContentSafetyResponse, AzureRecognitionRequest, AzureRecognitionResponse,
    AzureSpeechRequest,
};
use crate::types::{InvocationParams, ModerationRequest, SttRequest, Transcription, TtsRequest};

/// Default synthesis voice
pub const DEFAULT_VOICE: &str = "en-US-JennyNeural";
/// Default synthesis and recognition locale
pub const DEFAULT_LANGUAGE: &str = "en-US";
/// Default synthesis output format
pub const DEFAULT_OUTPUT_FORMAT: &str = "audio-16khz-128kbitrate-mono-mp3";
/// Default recognition result format
pub const DEFAULT_RECOGNITION_FORMAT: &str = "detailed";
/// Harm categories analyzed by content safety
pub const HARM_CATEGORIES: [&str; 4] = ["Hate", "SelfHarm", "Sexual", "Violence"];
/// Severity at or above which text is flagged
pub const FLAG_SEVERITY: u8 = 4;

/// Azure neural text to speech
#[derive(Debug, Clone, Copy, Default)]
pub struct AzureSpeech;

impl TtsCodec for AzureSpeech {
    const PROVIDER: ProviderId = ProviderId::Azure;
    const DEFAULT_MODEL: &'static str = DEFAULT_VOICE;

    type Request = AzureSpeechRequest;

    /// The voice is the request's own, else the `model` parameter
    fn translate(request: &TtsRequest, params: &InvocationParams) -> AzureSpeechRequest {
        let voice = request.voice.as_deref().unwrap_or_else(|| params.model_or(DEFAULT_VOICE));
        let language = voice_locale(voice).unwrap_or(DEFAULT_LANGUAGE);

        AzureSpeechRequest {
            output_format: DEFAULT_OUTPUT_FORMAT.to_owned(),
            voice: voice.to_owned(),
            language: language.to_owned(),
            ssml: build_ssml(language, voice, &request.text),
        }
    }
}

/// Locale prefix of a voice short name: "en-US" for "en-US-JennyNeural"
fn voice_locale(voice: &str) -> Option<&str> {
    let mut dashes = voice.match_indices('-').map(|(i, _)| i);
    let _first = dashes.next()?;
    let second = dashes.next()?;
    Some(&voice[..second])
}

fn build_ssml(language: &str, voice: &str, text: &str) -> String {
    let mut ssml = String::with_capacity(text.len() + 128);
    let _ = write!(
        ssml,
        "<speak version='1.0' xml:lang='{}'><voice name='{}'>{}</voice></speak>",
        escape_xml(language),
        escape_xml(voice),
        escape_xml(text)
    );
    ssml
}

fn escape_xml(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\'' => escaped.push_str("&apos;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Azure short-audio speech recognition
#[derive(Debug, Clone, Copy, Default)]
pub struct AzureTranscription;

impl SttCodec for AzureTranscription {
    const PROVIDER: ProviderId = ProviderId::Azure;
    const DEFAULT_MODEL: &'static str = "conversation";

    type Request = AzureRecognitionRequest;
    type Response = AzureRecognitionResponse;

    fn translate(request: &SttRequest, params: &InvocationParams) -> AzureRecognitionRequest {
        AzureRecognitionRequest {
            mode: params.model_or(Self::DEFAULT_MODEL).to_owned(),
            audio: request.audio.clone(),
            language: request.language.clone().unwrap_or_else(|| DEFAULT_LANGUAGE.to_owned()),
            format: DEFAULT_RECOGNITION_FORMAT.to_owned(),
        }
    }

    /// `NoMatch` means no speech was recognized and yields empty text
    fn normalize(
        _request: &AzureRecognitionRequest,
        response: AzureRecognitionResponse,
    ) -> Result<Transcription, NormalizeError> {
        match response.recognition_status.as_str() {
            "Success" => {
                let text = response
                    .display_text
                    .ok_or(NormalizeError::MissingField { field: "DisplayText" })?;
                Ok(Transcription { text })
            }
            "NoMatch" => Ok(Transcription { text: String::new() }),
            _ => Err(NormalizeError::RecognitionFailed {
                status: response.recognition_status,
            }),
        }
    }
}

/// Azure AI Content Safety text analysis
#[derive(Debug, Clone, Copy, Default)]
pub struct AzureModeration;

impl ModerationCodec for AzureModeration {
    const PROVIDER: ProviderId = ProviderId::Azure;
    const DEFAULT_MODEL: &'static str = "content-safety";

    type Request = AzureContentSafetyRequest;
    type Response = AzureContentSafetyResponse;

    /// Content safety has a single text model, so `model` is not sent
    fn translate(request: &ModerationRequest, _params: &InvocationParams) -> AzureContentSafetyRequest {
        AzureContentSafetyRequest {
            text: request.text.clone(),
            categories: HARM_CATEGORIES.iter().map(|c| (*c).to_owned()).collect(),
            output_type: "FourSeverityLevels".to_owned(),
        }
    }

    fn normalize(
        _request: &AzureContentSafetyRequest,
        response: AzureContentSafetyResponse,
    ) -> Result<bool, NormalizeError> {
        Ok(response
            .categories_analysis
            .iter()
            .any(|analysis| analysis.severity >= FLAG_SEVERITY))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn speech_defaults_and_ssml() {
        let wire = AzureSpeech::translate(
            &TtsRequest {
                text: "Fish & <chips>".to_owned(),
                ..TtsRequest::default()
            },
            &InvocationParams::default(),
        );

        assert_eq!(wire.voice, DEFAULT_VOICE);
        assert_eq!(wire.language, "en-US");
        assert_eq!(wire.output_format, DEFAULT_OUTPUT_FORMAT);
        assert_eq!(
            wire.ssml,
            "<speak version='1.0' xml:lang='en-US'><voice name='en-US-JennyNeural'>Fish &amp; &lt;chips&gt;</voice></speak>"
        );
    }

    #[test]
    fn speech_locale_follows_voice() {
        let wire = AzureSpeech::translate(
            &TtsRequest {
                text: "你好".to_owned(),
                voice: Some("zh-CN-XiaoxiaoNeural".to_owned()),
                ..TtsRequest::default()
            },
            &InvocationParams::default(),
        );
        assert_eq!(wire.language, "zh-CN");

        assert_eq!(voice_locale("custom"), None);
    }

    #[test]
    fn recognition_statuses() {
        let wire = AzureTranscription::translate(
            &SttRequest {
                audio: vec![0; 4],
                ..SttRequest::default()
            },
            &InvocationParams::default(),
        );
        assert_eq!(wire.language, "en-US");
        assert_eq!(wire.format, "detailed");

        let success: AzureRecognitionResponse = serde_json::from_value(json!({
            "RecognitionStatus": "Success",
            "DisplayText": "Hello world.",
            "Offset": 300_000,
            "Duration": 12_000_000
        }))
        .unwrap();
        assert_eq!(AzureTranscription::normalize(&wire, success).unwrap().text, "Hello world.");

        let no_match: AzureRecognitionResponse =
            serde_json::from_value(json!({"RecognitionStatus": "NoMatch"})).unwrap();
        assert_eq!(AzureTranscription::normalize(&wire, no_match).unwrap().text, "");

        let timeout: AzureRecognitionResponse =
            serde_json::from_value(json!({"RecognitionStatus": "InitialSilenceTimeout"})).unwrap();
        assert_eq!(
            AzureTranscription::normalize(&wire, timeout).unwrap_err(),
            NormalizeError::RecognitionFailed {
                status: "InitialSilenceTimeout".to_owned()
            }
        );
    }

    #[test]
    fn moderation_flags_at_threshold() {
        let wire = AzureModeration::translate(
            &ModerationRequest {
                text: "text".to_owned(),
                user: None,
            },
            &InvocationParams::default(),
        );
        let body = serde_json::to_value(&wire).unwrap();
        assert_eq!(body["outputType"], "FourSeverityLevels");
        assert_eq!(body["categories"].as_array().unwrap().len(), 4);

        let mild: AzureContentSafetyResponse = serde_json::from_value(json!({
            "categoriesAnalysis": [{"category": "Hate", "severity": 2}, {"category": "Violence", "severity": 0}]
        }))
        .unwrap();
        assert!(!AzureModeration::normalize(&wire, mild).unwrap());

        let severe: AzureContentSafetyResponse =
            serde_json::from_value(json!({"categoriesAnalysis": [{"category": "Violence", "severity": 4}]})).unwrap();
        assert!(AzureModeration::normalize(&wire, severe).unwrap());
    }

    #[test]
    fn model_param_selects_voice_and_recognition_mode() {
        let params = InvocationParams {
            model: Some("de-DE-KatjaNeural".to_owned()),
            ..InvocationParams::default()
        };
        let speech = AzureSpeech::translate(
            &TtsRequest {
                text: "Hallo".to_owned(),
                ..TtsRequest::default()
            },
            &params,
        );
        assert_eq!(speech.voice, "de-DE-KatjaNeural");
        assert_eq!(speech.language, "de-DE");

        let explicit = AzureSpeech::translate(
            &TtsRequest {
                text: "Hi".to_owned(),
                voice: Some("en-GB-SoniaNeural".to_owned()),
                ..TtsRequest::default()
            },
            &params,
        );
        assert_eq!(explicit.voice, "en-GB-SoniaNeural");

        let audio = SttRequest {
            audio: vec![1, 2],
            ..SttRequest::default()
        };
        assert_eq!(
            AzureTranscription::translate(&audio, &InvocationParams::default()).mode,
            "conversation"
        );
        let dictation = InvocationParams {
            model: Some("dictation".to_owned()),
            ..InvocationParams::default()
        };
        assert_eq!(AzureTranscription::translate(&audio, &dictation).mode, "dictation");
    }
}
