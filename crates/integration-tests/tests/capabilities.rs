mod harness;

use std::sync::Arc;

use futures_util::StreamExt;
use harness::backends::{FakeEmbedding, FakeModeration, FakeRerank, FakeStt, FakeTts};
use harness::fixtures::{cohere_scores, openai_embeddings_reversed};
use serde_json::json;
use switchyard_core::convert::{
    AzureModeration, AzureSpeech, AzureTranscription, BgeRerank, CohereRerank, HuggingFaceEmbedding, OpenAiEmbedding,
    OpenAiModeration, OpenAiSpeech, OpenAiTranscription,
};
use switchyard_core::protocol::azure::AzureRecognitionResponse;
use switchyard_core::protocol::huggingface::HfEmbeddingResponse;
use switchyard_core::protocol::openai::{OpenAiModerationResponse, OpenAiTranscriptionResponse};
use switchyard_core::standin::{RuleModeration, SyntheticRerank};
use switchyard_core::{
    CapabilityRouter, EmbeddingRequest, InvocationErrorKind, InvocationParams, ModerationRequest, NormalizeError,
    RerankRequest, SttRequest, TranslationError, TtsRequest,
};

fn texts(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}

fn rerank_request(top_n: Option<usize>, score_threshold: Option<f64>) -> RerankRequest {
    RerankRequest {
        query: "capital of france".to_owned(),
        documents: texts(&["Berlin", "Paris", "Lyon"]),
        top_n,
        score_threshold,
        ..RerankRequest::default()
    }
}

// -- Embedding --

#[tokio::test]
async fn embeddings_come_back_in_input_order() {
    let backend = FakeEmbedding::<OpenAiEmbedding>::new(|request| Ok(openai_embeddings_reversed(&request.input)));
    let router = CapabilityRouter::builder()
        .register_embedding::<OpenAiEmbedding>(backend.clone())
        .build();

    let request = EmbeddingRequest {
        texts: texts(&["a", "bb", "ccc", "dddd"]),
        ..EmbeddingRequest::default()
    };
    let result = router
        .embed("openai", &request, &InvocationParams::default())
        .await
        .unwrap();

    assert_eq!(result.embeddings.len(), 4);
    for (i, vector) in result.embeddings.iter().enumerate() {
        assert_eq!(vector, &vec![i as f32, (i + 1) as f32]);
    }
    assert_eq!(backend.last_request().input, request.texts);
}

#[tokio::test]
async fn short_embedding_response_is_an_error() {
    let backend = FakeEmbedding::<HuggingFaceEmbedding>::new(|_| Ok(HfEmbeddingResponse(vec![vec![0.1, 0.2]])));
    let router = CapabilityRouter::builder()
        .register_embedding::<HuggingFaceEmbedding>(backend)
        .build();

    let request = EmbeddingRequest {
        texts: texts(&["one", "two"]),
        ..EmbeddingRequest::default()
    };
    let err = router
        .embed("huggingface", &request, &InvocationParams::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err.kind,
        InvocationErrorKind::Normalization(NormalizeError::CountMismatch { expected: 2, actual: 1 })
    ));
}

// -- Rerank --

#[tokio::test]
async fn rerank_returns_a_sorted_permutation() {
    let backend = FakeRerank::<CohereRerank>::new(|_| Ok(cohere_scores(&[(2, 0.3), (0, 0.1), (1, 0.3)])));
    let router = CapabilityRouter::builder()
        .register_rerank::<CohereRerank>(backend.clone())
        .build();

    let result = router
        .rerank("cohere", &rerank_request(None, None), &InvocationParams::default())
        .await
        .unwrap();

    let order: Vec<usize> = result.items.iter().map(|item| item.index).collect();
    assert_eq!(order, vec![1, 2, 0]);
    assert_eq!(result.items[0].document, "Paris");
    assert_eq!(backend.last_request().query, "capital of france");
}

#[tokio::test]
async fn rerank_top_n_and_threshold_trim_the_ranking() {
    let backend = FakeRerank::<CohereRerank>::new(|_| Ok(cohere_scores(&[(0, 0.2), (1, 0.9), (2, 0.6)])));
    let router = CapabilityRouter::builder()
        .register_rerank::<CohereRerank>(backend)
        .build();
    let params = InvocationParams::default();

    let top = router
        .rerank("cohere", &rerank_request(Some(2), None), &params)
        .await
        .unwrap();
    let order: Vec<usize> = top.items.iter().map(|item| item.index).collect();
    assert_eq!(order, vec![1, 2]);

    let above = router
        .rerank("cohere", &rerank_request(None, Some(0.5)), &params)
        .await
        .unwrap();
    assert!(above.items.iter().all(|item| item.relevance_score >= 0.5));
    assert_eq!(above.items.len(), 2);
}

#[tokio::test]
async fn rerank_dropping_a_document_is_an_error() {
    let backend = FakeRerank::<CohereRerank>::new(|_| Ok(cohere_scores(&[(0, 0.5), (2, 0.4)])));
    let router = CapabilityRouter::builder()
        .register_rerank::<CohereRerank>(backend)
        .build();

    let err = router
        .rerank("cohere", &rerank_request(None, None), &InvocationParams::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err.kind,
        InvocationErrorKind::Normalization(NormalizeError::CountMismatch { expected: 3, actual: 2 })
    ));
}

#[tokio::test]
async fn rerank_duplicate_index_is_an_error() {
    let backend = FakeRerank::<CohereRerank>::new(|_| Ok(cohere_scores(&[(0, 0.5), (0, 0.4), (1, 0.3)])));
    let router = CapabilityRouter::builder()
        .register_rerank::<CohereRerank>(backend)
        .build();

    let err = router
        .rerank("cohere", &rerank_request(None, None), &InvocationParams::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err.kind,
        InvocationErrorKind::Normalization(NormalizeError::DuplicateIndex { index: 0 })
    ));
}

#[tokio::test]
async fn invalid_rerank_requests_never_reach_the_backend() {
    let backend = FakeRerank::<CohereRerank>::new(|_| Ok(cohere_scores(&[])));
    let router = CapabilityRouter::builder()
        .register_rerank::<CohereRerank>(backend.clone())
        .build();
    let params = InvocationParams::default();

    let mut blank = rerank_request(None, None);
    blank.query = "  ".to_owned();
    let err = router.rerank("cohere", &blank, &params).await.unwrap_err();
    assert!(matches!(
        err.kind,
        InvocationErrorKind::Translation(TranslationError::EmptyField { field: "query" })
    ));

    let err = router
        .rerank("cohere", &rerank_request(Some(0), None), &params)
        .await
        .unwrap_err();
    assert!(matches!(err.kind, InvocationErrorKind::Translation(TranslationError::ZeroTopN)));

    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn synthetic_rerank_prefers_earlier_documents() {
    let router = CapabilityRouter::builder()
        .register_rerank::<CohereRerank>(Arc::new(SyntheticRerank))
        .register_rerank::<BgeRerank>(Arc::new(SyntheticRerank))
        .build();
    let params = InvocationParams::default();

    for provider in ["cohere", "bge"] {
        let result = router
            .rerank(provider, &rerank_request(None, None), &params)
            .await
            .unwrap();
        let order: Vec<usize> = result.items.iter().map(|item| item.index).collect();
        assert_eq!(order, vec![0, 1, 2], "{provider}");
        assert_eq!(result.items[2].document, "Lyon", "{provider}");
    }
}

// -- Speech --

#[tokio::test]
async fn synthesized_audio_is_passed_through() {
    let backend = FakeTts::<OpenAiSpeech>::new(|_| Ok(vec![b"ID3".to_vec(), vec![0xff, 0xfb]]));
    let router = CapabilityRouter::builder()
        .register_tts::<OpenAiSpeech>(backend.clone())
        .build();

    let request = TtsRequest {
        text: "Good morning".to_owned(),
        voice: Some("nova".to_owned()),
        ..TtsRequest::default()
    };
    let audio = router
        .text_to_speech("openai", &request, &InvocationParams::default())
        .await
        .ok()
        .expect("audio stream");
    let chunks: Vec<Vec<u8>> = audio.map(|chunk| chunk.unwrap()).collect().await;

    assert_eq!(chunks, vec![b"ID3".to_vec(), vec![0xff, 0xfb]]);
    let wire = backend.last_request();
    assert_eq!(wire.voice, "nova");
    assert_eq!(wire.input, "Good morning");
}

#[tokio::test]
async fn azure_synthesis_escapes_ssml() {
    let backend = FakeTts::<AzureSpeech>::new(|_| Ok(vec![vec![1, 2, 3]]));
    let router = CapabilityRouter::builder()
        .register_tts::<AzureSpeech>(backend.clone())
        .build();

    let request = TtsRequest {
        text: "Tom & Jerry <3".to_owned(),
        ..TtsRequest::default()
    };
    let audio = router
        .text_to_speech("azure", &request, &InvocationParams::default())
        .await
        .ok()
        .expect("audio stream");
    assert_eq!(audio.count().await, 1);

    let wire = backend.last_request();
    assert_eq!(wire.voice, "en-US-JennyNeural");
    assert_eq!(wire.language, "en-US");
    assert!(wire.ssml.contains("Tom &amp; Jerry &lt;3"));
}

#[tokio::test]
async fn blank_text_is_not_synthesized() {
    let backend = FakeTts::<OpenAiSpeech>::new(|_| Ok(Vec::new()));
    let router = CapabilityRouter::builder()
        .register_tts::<OpenAiSpeech>(backend.clone())
        .build();

    let request = TtsRequest {
        text: " \n".to_owned(),
        ..TtsRequest::default()
    };
    let err = router
        .text_to_speech("openai", &request, &InvocationParams::default())
        .await
        .err()
        .expect("blank text is rejected");

    assert!(matches!(
        err.kind,
        InvocationErrorKind::Translation(TranslationError::EmptyField { field: "text" })
    ));
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn transcription_returns_text() {
    let backend = FakeStt::<OpenAiTranscription>::new(|_| {
        Ok(OpenAiTranscriptionResponse {
            text: "hello there".to_owned(),
        })
    });
    let router = CapabilityRouter::builder()
        .register_stt::<OpenAiTranscription>(backend.clone())
        .build();

    let request = SttRequest {
        audio: vec![0, 1, 2, 3],
        language: Some("de".to_owned()),
        ..SttRequest::default()
    };
    let transcription = router
        .speech_to_text("openai", &request, &InvocationParams::default())
        .await
        .unwrap();

    assert_eq!(transcription.text, "hello there");
    let wire = backend.last_request();
    assert_eq!(wire.file, vec![0, 1, 2, 3]);
    assert_eq!(wire.language, "de");
}

#[tokio::test]
async fn empty_audio_is_not_transcribed() {
    let backend = FakeStt::<OpenAiTranscription>::new(|_| Ok(OpenAiTranscriptionResponse { text: String::new() }));
    let router = CapabilityRouter::builder()
        .register_stt::<OpenAiTranscription>(backend.clone())
        .build();

    let err = router
        .speech_to_text("openai", &SttRequest::default(), &InvocationParams::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err.kind,
        InvocationErrorKind::Translation(TranslationError::EmptyField { field: "audio" })
    ));
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn azure_recognition_statuses() {
    let backend = FakeStt::<AzureTranscription>::new(|request| {
        let status = match request.audio.first() {
            Some(0) => "NoMatch",
            Some(1) => "Success",
            _ => "InitialSilenceTimeout",
        };
        Ok(AzureRecognitionResponse {
            recognition_status: status.to_owned(),
            display_text: (status == "Success").then(|| "Hello.".to_owned()),
            offset: 0,
            duration: 0,
        })
    });
    let router = CapabilityRouter::builder()
        .register_stt::<AzureTranscription>(backend)
        .build();
    let params = InvocationParams::default();
    let audio = |byte: u8| SttRequest {
        audio: vec![byte],
        ..SttRequest::default()
    };

    let heard = router.speech_to_text("azure", &audio(1), &params).await.unwrap();
    assert_eq!(heard.text, "Hello.");

    let silent = router.speech_to_text("azure", &audio(0), &params).await.unwrap();
    assert_eq!(silent.text, "");

    let err = router.speech_to_text("azure", &audio(2), &params).await.unwrap_err();
    assert!(matches!(
        err.kind,
        InvocationErrorKind::Normalization(NormalizeError::RecognitionFailed { .. })
    ));
}

// -- Moderation --

fn moderation(text: &str) -> ModerationRequest {
    ModerationRequest {
        text: text.to_owned(),
        ..ModerationRequest::default()
    }
}

#[tokio::test]
async fn moderation_reports_the_provider_verdict() {
    let backend = FakeModeration::<OpenAiModeration>::new(|request| {
        let flagged = request.input.contains("threat");
        Ok(serde_json::from_value::<OpenAiModerationResponse>(json!({
            "id": "modr-1",
            "model": "text-moderation-007",
            "results": [{"flagged": flagged, "categories": {"violence": flagged}}]
        }))
        .unwrap())
    });
    let router = CapabilityRouter::builder()
        .register_moderation::<OpenAiModeration>(backend)
        .build();
    let params = InvocationParams::default();

    assert!(router.moderate("openai", &moderation("a threat"), &params).await);
    assert!(!router.moderate("openai", &moderation("a greeting"), &params).await);
}

#[tokio::test]
async fn moderation_fails_open() {
    let backend = FakeModeration::<OpenAiModeration>::failing("moderation endpoint down");
    let router = CapabilityRouter::builder()
        .register_moderation::<OpenAiModeration>(backend.clone())
        .build();
    let params = InvocationParams::default();

    assert!(!router.moderate("openai", &moderation("anything"), &params).await);
    assert_eq!(backend.calls(), 1);

    assert!(!router.moderate("anthropic", &moderation("anything"), &params).await);
    assert!(!router.moderate("nobody", &moderation("anything"), &params).await);
}

#[tokio::test]
async fn rule_moderation_flags_matching_text() {
    let router = CapabilityRouter::builder()
        .register_moderation::<AzureModeration>(Arc::new(RuleModeration::with_default_rules().unwrap()))
        .build();
    let params = InvocationParams::default();

    assert!(router.moderate("azure", &moderation("That was inappropriate"), &params).await);
    assert!(!router.moderate("azure", &moderation("Lovely weather"), &params).await);
}
