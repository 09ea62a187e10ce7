use async_trait::async_trait;

use crate::convert::{BgeRerank, CohereRerank};
use crate::error::BackendError;
use crate::port::RerankBackend;
use crate::protocol::bge::{BgeRank, BgeRerankRequest, BgeRerankResponse};
use crate::protocol::cohere::{CohereRerankRequest, CohereRerankResponse, CohereRerankResult};

/// Scores documents by position alone
///
/// Cohere requests score `0.8 - 0.1 * i`, BGE requests `0.9 - 0.05 * i`, so
/// earlier documents always rank higher.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticRerank;

fn positional_score(base: f64, step: f64, index: usize) -> f64 {
    let position = f64::from(u32::try_from(index).unwrap_or(u32::MAX));
    step.mul_add(-position, base)
}

#[async_trait]
impl RerankBackend<CohereRerank> for SyntheticRerank {
    async fn rerank(&self, request: &CohereRerankRequest) -> Result<CohereRerankResponse, BackendError> {
        let results = (0..request.documents.len())
            .map(|index| CohereRerankResult {
                index,
                relevance_score: positional_score(0.8, 0.1, index),
                document: None,
            })
            .collect();

        Ok(CohereRerankResponse { id: None, results })
    }
}

#[async_trait]
impl RerankBackend<BgeRerank> for SyntheticRerank {
    async fn rerank(&self, request: &BgeRerankRequest) -> Result<BgeRerankResponse, BackendError> {
        let ranks = request
            .texts
            .iter()
            .enumerate()
            .map(|(index, text)| BgeRank {
                index,
                score: positional_score(0.9, 0.05, index),
                text: request.return_text.then(|| text.clone()),
            })
            .collect();

        Ok(BgeRerankResponse(ranks))
    }
}
