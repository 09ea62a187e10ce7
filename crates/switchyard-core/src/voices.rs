//! Speech synthesis voice catalogues

use async_trait::async_trait;

use crate::error::BackendError;
use crate::types::TtsVoice;

/// Source of the voices a TTS provider offers
#[async_trait]
pub trait VoiceCatalog: Send + Sync {
    /// Voices usable for `language`, or all voices when `None`
    async fn list_voices(&self, language: Option<&str>) -> Result<Vec<TtsVoice>, BackendError>;
}

/// `OpenAI` speech voices; every voice speaks every supported language
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAiVoices;

const OPENAI_VOICES: [(&str, &str); 6] = [
    ("alloy", "Alloy"),
    ("echo", "Echo"),
    ("fable", "Fable"),
    ("onyx", "Onyx"),
    ("nova", "Nova"),
    ("shimmer", "Shimmer"),
];

#[async_trait]
impl VoiceCatalog for OpenAiVoices {
    async fn list_voices(&self, _language: Option<&str>) -> Result<Vec<TtsVoice>, BackendError> {
        Ok(OPENAI_VOICES
            .iter()
            .map(|(id, name)| TtsVoice {
                id: (*id).to_owned(),
                name: (*name).to_owned(),
                language: None,
            })
            .collect())
    }
}

/// Azure neural voices
#[derive(Debug, Clone, Copy, Default)]
pub struct AzureVoices;

const AZURE_VOICES: [(&str, &str, &str); 4] = [
    ("en-US-JennyNeural", "Jenny", "en-US"),
    ("en-US-GuyNeural", "Guy", "en-US"),
    ("zh-CN-XiaoxiaoNeural", "Xiaoxiao", "zh-CN"),
    ("zh-CN-YunxiNeural", "Yunxi", "zh-CN"),
];

#[async_trait]
impl VoiceCatalog for AzureVoices {
    /// Filters by language prefix, case-insensitively: `en` matches `en-US`
    async fn list_voices(&self, language: Option<&str>) -> Result<Vec<TtsVoice>, BackendError> {
        let wanted = language.map(str::to_ascii_lowercase);

        Ok(AZURE_VOICES
            .iter()
            .filter(|(_, _, locale)| {
                wanted
                    .as_deref()
                    .is_none_or(|prefix| locale.to_ascii_lowercase().starts_with(prefix))
            })
            .map(|(id, name, locale)| TtsVoice {
                id: (*id).to_owned(),
                name: (*name).to_owned(),
                language: Some((*locale).to_owned()),
            })
            .collect())
    }
}
