//! Azure AI Speech and Content Safety wire format types

use serde::{Deserialize, Serialize};

// -- Speech synthesis --

/// Speech synthesis request
///
/// The body is SSML; voice and output format travel as headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AzureSpeechRequest {
    /// `X-Microsoft-OutputFormat` header value
    pub output_format: String,
    /// Voice short name (e.g. "en-US-JennyNeural")
    pub voice: String,
    /// Locale of the voice
    pub language: String,
    /// SSML document
    pub ssml: String,
}

// -- Speech recognition --

/// Short-audio recognition request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AzureRecognitionRequest {
    /// Recognition mode in the endpoint path ("conversation", "dictation" or "interactive")
    pub mode: String,
    /// Raw audio data
    pub audio: Vec<u8>,
    /// `language` query parameter
    pub language: String,
    /// `format` query parameter ("simple" or "detailed")
    pub format: String,
}

/// Short-audio recognition response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AzureRecognitionResponse {
    /// "Success", "NoMatch", "InitialSilenceTimeout", ...
    pub recognition_status: String,
    /// Recognized text with punctuation and capitalization
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_text: Option<String>,
    /// Offset of the recognized speech, in 100ns ticks
    #[serde(default)]
    pub offset: u64,
    /// Duration of the recognized speech, in 100ns ticks
    #[serde(default)]
    pub duration: u64,
}

// -- Content safety --

/// `text:analyze` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureContentSafetyRequest {
    /// Text to analyze
    pub text: String,
    /// Harm categories to analyze
    pub categories: Vec<String>,
    /// Severity scale ("FourSeverityLevels" or "EightSeverityLevels")
    pub output_type: String,
}

/// `text:analyze` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureContentSafetyResponse {
    /// Severity per analyzed category
    #[serde(default)]
    pub categories_analysis: Vec<AzureCategoryAnalysis>,
}

/// Severity of one harm category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AzureCategoryAnalysis {
    /// Category name ("Hate", "SelfHarm", "Sexual", "Violence")
    pub category: String,
    /// Severity level
    #[serde(default)]
    pub severity: u8,
}
