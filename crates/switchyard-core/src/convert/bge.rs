//! Conversion between canonical types and the BGE reranker wire format

use super::RerankCodec;
use crate::capability::ProviderId;
use crate::error::NormalizeError;
use crate::protocol::bge::{BgeRerankRequest, BgeRerankResponse};
use crate::types::{InvocationParams, RerankItem, RerankRequest, RerankResult};

/// Default rerank model
pub const DEFAULT_MODEL: &str = "BAAI/bge-reranker-v2-m3";

/// BGE reranker served by text-embeddings-inference
#[derive(Debug, Clone, Copy, Default)]
pub struct BgeRerank;

impl RerankCodec for BgeRerank {
    const PROVIDER: ProviderId = ProviderId::Bge;
    const DEFAULT_MODEL: &'static str = DEFAULT_MODEL;

    type Request = BgeRerankRequest;
    type Response = BgeRerankResponse;

    fn translate(request: &RerankRequest, params: &InvocationParams) -> BgeRerankRequest {
        BgeRerankRequest {
            model: params.model_or(DEFAULT_MODEL).to_owned(),
            query: request.query.clone(),
            texts: request.documents.clone(),
            return_text: false,
            raw_scores: false,
        }
    }

    fn normalize(request: &BgeRerankRequest, response: BgeRerankResponse) -> Result<RerankResult, NormalizeError> {
        let BgeRerankResponse(ranks) = response;

        let items = ranks
            .into_iter()
            .map(|rank| {
                let document = match rank.text {
                    Some(text) => text,
                    None => request
                        .texts
                        .get(rank.index)
                        .cloned()
                        .ok_or(NormalizeError::IndexOutOfRange {
                            index: rank.index,
                            len: request.texts.len(),
                        })?,
                };
                Ok(RerankItem {
                    index: rank.index,
                    relevance_score: rank.score,
                    document,
                })
            })
            .collect::<Result<Vec<_>, NormalizeError>>()?;

        Ok(RerankResult {
            items,
            model: request.model.clone(),
        })
    }
}
