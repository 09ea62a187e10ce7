//! Hugging Face text-embeddings-inference wire format types

use serde::{Deserialize, Serialize};

/// `POST /embed` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HfEmbeddingRequest {
    /// Model repository; selects the deployment, ignored by single-model servers
    pub model: String,
    /// Texts to embed
    pub inputs: Vec<String>,
    /// L2-normalize the vectors
    pub normalize: bool,
    /// Truncate inputs longer than the model's context
    pub truncate: bool,
}

/// `POST /embed` response: one vector per input, in input order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HfEmbeddingResponse(pub Vec<Vec<f32>>);
