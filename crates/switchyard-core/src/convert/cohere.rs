//! Conversion between canonical types and Cohere rerank wire format

use super::RerankCodec;
use crate::capability::ProviderId;
use crate::error::NormalizeError;
use crate::protocol::cohere::{CohereRerankRequest, CohereRerankResponse};
use crate::types::{InvocationParams, RerankItem, RerankRequest, RerankResult};

/// Default rerank model
pub const DEFAULT_MODEL: &str = "rerank-english-v2.0";

/// Cohere `/v1/rerank`
///
/// `top_n` is not forwarded: every document is scored so the result can be
/// checked as a permutation of the input before trimming.
#[derive(Debug, Clone, Copy, Default)]
pub struct CohereRerank;

impl RerankCodec for CohereRerank {
    const PROVIDER: ProviderId = ProviderId::Cohere;
    const DEFAULT_MODEL: &'static str = DEFAULT_MODEL;

    type Request = CohereRerankRequest;
    type Response = CohereRerankResponse;

    fn translate(request: &RerankRequest, params: &InvocationParams) -> CohereRerankRequest {
        CohereRerankRequest {
            model: params.model_or(DEFAULT_MODEL).to_owned(),
            query: request.query.clone(),
            documents: request.documents.clone(),
            return_documents: false,
        }
    }

    fn normalize(request: &CohereRerankRequest, response: CohereRerankResponse) -> Result<RerankResult, NormalizeError> {
        let items = response
            .results
            .into_iter()
            .map(|r| {
                let document = match r.document {
                    Some(doc) => doc.text,
                    None => request
                        .documents
                        .get(r.index)
                        .cloned()
                        .ok_or(NormalizeError::IndexOutOfRange {
                            index: r.index,
                            len: request.documents.len(),
                        })?,
                };
                Ok(RerankItem {
                    index: r.index,
                    relevance_score: r.relevance_score,
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
