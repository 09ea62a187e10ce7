//! Conversion between canonical types and Hugging Face text-embeddings-inference

use super::EmbeddingCodec;
use crate::capability::ProviderId;
use crate::error::NormalizeError;
use crate::estimate::generic_embedding_token_count;
use crate::protocol::huggingface::{HfEmbeddingRequest, HfEmbeddingResponse};
use crate::types::{EmbeddingRequest, EmbeddingResult, InvocationParams, Usage};

/// Default embedding model
pub const DEFAULT_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Hugging Face `/embed`
#[derive(Debug, Clone, Copy, Default)]
pub struct HuggingFaceEmbedding;

impl EmbeddingCodec for HuggingFaceEmbedding {
    const PROVIDER: ProviderId = ProviderId::HuggingFace;
    const DEFAULT_MODEL: &'static str = DEFAULT_MODEL;

    type Request = HfEmbeddingRequest;
    type Response = HfEmbeddingResponse;

    fn translate(request: &EmbeddingRequest, params: &InvocationParams) -> HfEmbeddingRequest {
        HfEmbeddingRequest {
            model: params.model_or(DEFAULT_MODEL).to_owned(),
            inputs: request.texts.clone(),
            normalize: true,
            truncate: true,
        }
    }

    /// The service reports no usage, so prompt tokens are estimated from the inputs
    fn normalize(request: &HfEmbeddingRequest, response: HfEmbeddingResponse) -> Result<EmbeddingResult, NormalizeError> {
        let HfEmbeddingResponse(embeddings) = response;

        if embeddings.len() != request.inputs.len() {
            return Err(NormalizeError::CountMismatch {
                expected: request.inputs.len(),
                actual: embeddings.len(),
            });
        }

        let prompt_tokens = generic_embedding_token_count(&request.inputs)
            .into_iter()
            .fold(0_u32, u32::saturating_add);

        Ok(EmbeddingResult {
            embeddings,
            model: request.model.clone(),
            usage: Usage::prompt_only(prompt_tokens),
        })
    }
}
