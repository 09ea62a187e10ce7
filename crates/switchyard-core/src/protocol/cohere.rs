//! Cohere rerank wire format types

use serde::{Deserialize, Serialize};

/// `POST /v1/rerank` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohereRerankRequest {
    /// Rerank model
    pub model: String,
    /// Search query
    pub query: String,
    /// Candidate documents
    pub documents: Vec<String>,
    /// Echo document text in the results
    pub return_documents: bool,
}

/// `POST /v1/rerank` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohereRerankResponse {
    /// Response identifier
    #[serde(default)]
    pub id: Option<String>,
    /// Scored documents, best first
    pub results: Vec<CohereRerankResult>,
}

/// One scored document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohereRerankResult {
    /// Position of the document in the request
    pub index: usize,
    /// Relevance in `[0, 1]`
    pub relevance_score: f64,
    /// Echoed document, when requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<CohereDocument>,
}

/// Echoed document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohereDocument {
    /// Document text
    pub text: String,
}
