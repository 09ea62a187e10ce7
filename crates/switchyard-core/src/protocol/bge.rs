//! BGE reranker wire format types (text-embeddings-inference `/rerank`)

use serde::{Deserialize, Serialize};

/// `POST /rerank` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BgeRerankRequest {
    /// Reranker model; selects the deployment, not sent in the body
    #[serde(skip)]
    pub model: String,
    /// Search query
    pub query: String,
    /// Candidate documents
    pub texts: Vec<String>,
    /// Echo document text in the results
    pub return_text: bool,
    /// Return logits instead of sigmoid scores
    pub raw_scores: bool,
}

/// `POST /rerank` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BgeRerankResponse(pub Vec<BgeRank>);

/// One scored document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BgeRank {
    /// Position of the document in the request
    pub index: usize,
    /// Relevance score
    pub score: f64,
    /// Echoed document, when requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}
