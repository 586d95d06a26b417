//! Provider transport errors.

use planscript_eval::PlanningError;
use thiserror::Error;

/// Failures talking to a chat-completions provider.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    #[error("planner provider is not configured: {reason}")]
    Unconfigured { reason: String },

    #[error("unsupported provider '{provider}': use openrouter or openai_compatible")]
    UnsupportedProvider { provider: String },

    #[error("provider request failed: {0}")]
    Request(String),

    #[error("provider request failed ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("provider response invalid: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Whether trying the same request again could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Unconfigured { .. } | ProviderError::UnsupportedProvider { .. } => false,
            ProviderError::Status { status, .. } => *status == 429 || *status >= 500,
            ProviderError::Request(_) | ProviderError::InvalidResponse(_) => true,
        }
    }
}

impl From<ProviderError> for PlanningError {
    fn from(err: ProviderError) -> Self {
        PlanningError::Unavailable {
            reason: err.to_string(),
        }
    }
}
