use async_trait::async_trait;
use indexmap::IndexMap;
use switchyard_guardrails::{Classifier, GuardrailError, Rule, default_rules};

use crate::convert::AzureModeration;
use crate::error::BackendError;
use crate::port::ModerationBackend;
use crate::protocol::azure::{AzureCategoryAnalysis, AzureContentSafetyRequest, AzureContentSafetyResponse};

/// Answers content-safety requests with local guardrail rules
///
/// Each matched category is reported once with its highest rule severity;
/// categories nothing matched report severity zero.
#[derive(Debug)]
pub struct RuleModeration {
    classifier: Classifier,
}

impl RuleModeration {
    /// Classify with the given rules
    pub fn new(rules: &[Rule]) -> Result<Self, GuardrailError> {
        Ok(Self {
            classifier: Classifier::new(rules)?,
        })
    }

    /// Classify with [`default_rules`]
    pub fn with_default_rules() -> Result<Self, GuardrailError> {
        Self::new(&default_rules())
    }
}

#[async_trait]
impl ModerationBackend<AzureModeration> for RuleModeration {
    async fn classify(&self, request: &AzureContentSafetyRequest) -> Result<AzureContentSafetyResponse, BackendError> {
        let classification = self.classifier.classify(&request.text);

        let mut severities: IndexMap<String, u8> = request.categories.iter().map(|c| (c.clone(), 0)).collect();
        for matched in classification.matches {
            let severity = severities.entry(matched.category).or_insert(0);
            *severity = (*severity).max(matched.severity);
        }

        Ok(AzureContentSafetyResponse {
            categories_analysis: severities
                .into_iter()
                .map(|(category, severity)| AzureCategoryAnalysis { category, severity })
                .collect(),
        })
    }
}
