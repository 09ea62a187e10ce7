use std::error::Error as StdError;

use thiserror::Error;

use crate::capability::Capability;

/// No route exists for a capability and provider
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("capability `{capability}` is not supported by provider `{provider}`")]
pub struct UnsupportedProviderError {
    /// Capability that was requested
    pub capability: Capability,
    /// Provider name exactly as the caller supplied it
    pub provider: String,
}

/// Canonical request cannot be mapped to a provider request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslationError {
    /// Chat request carries no messages
    #[error("request has no messages")]
    EmptyMessages,

    /// A required field is empty or blank
    #[error("`{field}` must not be empty")]
    EmptyField {
        /// Name of the field
        field: &'static str,
    },

    /// `top_n` must keep at least one result
    #[error("`top_n` must be at least 1")]
    ZeroTopN,
}

/// A backend port failed (network, auth, quota, ...)
#[derive(Debug, Error)]
#[error("{message}")]
pub struct BackendError {
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl BackendError {
    /// Create an error from a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Create an error wrapping an underlying cause
    pub fn with_source(message: impl Into<String>, source: impl StdError + Send + Sync + 'static) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Human-readable message, without the cause
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Provider response lacks something the canonical result requires
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    /// Field guaranteed by the provider contract is absent
    #[error("response is missing `{field}`")]
    MissingField {
        /// Name of the field
        field: &'static str,
    },

    /// Number of returned items differs from the number of inputs
    #[error("expected {expected} items, got {actual}")]
    CountMismatch {
        /// Number of inputs
        expected: usize,
        /// Number of items returned
        actual: usize,
    },

    /// Item refers to an input that does not exist
    #[error("item index {index} is out of range for {len} inputs")]
    IndexOutOfRange {
        /// Index reported by the provider
        index: usize,
        /// Number of inputs
        len: usize,
    },

    /// Two items refer to the same input
    #[error("item index {index} appears more than once")]
    DuplicateIndex {
        /// Repeated index
        index: usize,
    },

    /// Recognition service reported a non-success status
    #[error("recognition failed with status `{status}`")]
    RecognitionFailed {
        /// Status reported by the service
        status: String,
    },
}

/// Stage of a routed call that failed
#[derive(Debug, Error)]
pub enum InvocationErrorKind {
    /// No route for the capability and provider
    #[error(transparent)]
    Unsupported(#[from] UnsupportedProviderError),

    /// Request translation failed
    #[error("translation failed")]
    Translation(#[source] TranslationError),

    /// Backend port failed
    #[error("backend invocation failed")]
    Backend(#[source] BackendError),

    /// Response normalization failed
    #[error("normalization failed")]
    Normalization(#[source] NormalizeError),
}

impl From<TranslationError> for InvocationErrorKind {
    fn from(error: TranslationError) -> Self {
        Self::Translation(error)
    }
}

impl From<BackendError> for InvocationErrorKind {
    fn from(error: BackendError) -> Self {
        Self::Backend(error)
    }
}

impl From<NormalizeError> for InvocationErrorKind {
    fn from(error: NormalizeError) -> Self {
        Self::Normalization(error)
    }
}

/// The single error kind a routed call surfaces to its caller
#[derive(Debug, Error)]
#[error("{capability} via `{provider}` failed")]
pub struct InvocationError {
    /// Capability that was invoked
    pub capability: Capability,
    /// Provider name exactly as the caller supplied it
    pub provider: String,
    /// What went wrong
    #[source]
    pub kind: InvocationErrorKind,
}

impl InvocationError {
    /// Wrap a failure with routing context
    pub fn new(capability: Capability, provider: impl Into<String>, kind: impl Into<InvocationErrorKind>) -> Self {
        Self {
            capability,
            provider: provider.into(),
            kind: kind.into(),
        }
    }

    /// Whether the call failed because no route exists
    pub const fn is_unsupported(&self) -> bool {
        matches!(self.kind, InvocationErrorKind::Unsupported(_))
    }

    /// The unsupported-provider error, if that is why the call failed
    pub const fn as_unsupported(&self) -> Option<&UnsupportedProviderError> {
        match &self.kind {
            InvocationErrorKind::Unsupported(error) => Some(error),
            _ => None,
        }
    }
}

impl From<UnsupportedProviderError> for InvocationError {
    fn from(error: UnsupportedProviderError) -> Self {
        Self {
            capability: error.capability,
            provider: error.provider.clone(),
            kind: InvocationErrorKind::Unsupported(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn unsupported_names_capability_and_provider() {
        let error = InvocationError::from(UnsupportedProviderError {
            capability: Capability::Rerank,
            provider: "openai".to_owned(),
        });

        assert!(error.is_unsupported());
        let unsupported = error.as_unsupported().unwrap();
        assert_eq!(unsupported.capability, Capability::Rerank);
        assert_eq!(unsupported.provider, "openai");
        assert_eq!(
            error.source().unwrap().to_string(),
            "capability `rerank` is not supported by provider `openai`"
        );
    }

    #[test]
    fn backend_cause_is_preserved() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "deadline elapsed");
        let error = InvocationError::new(
            Capability::Chat,
            "anthropic",
            BackendError::with_source("request timed out", io),
        );

        assert!(!error.is_unsupported());
        assert_eq!(error.to_string(), "chat via `anthropic` failed");

        let kind = error.source().unwrap();
        assert_eq!(kind.to_string(), "backend invocation failed");
        let backend = kind.source().unwrap();
        assert_eq!(backend.to_string(), "request timed out");
        assert_eq!(backend.source().unwrap().to_string(), "deadline elapsed");
    }
}
