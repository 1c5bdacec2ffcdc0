use thiserror::Error;
use trip_planner_model::ModelProviderError;

/// Errors that end an agent run.
///
/// Rate-limited model calls are not reported here once retries run out;
/// the run finishes with a [`crate::Reply`] of kind
/// [`crate::ReplyKind::QuotaExhausted`] instead.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The model provider failed with a non-transient error.
    #[error("model request failed: {0}")]
    Model(Box<dyn ModelProviderError>),
    /// The model kept asking for tools past the step limit.
    #[error("no final answer within {limit} steps")]
    StepLimitExceeded {
        /// The configured step limit.
        limit: usize,
    },
}

#[derive(Debug, Error)]
pub(crate) enum CallError {
    #[error("rate limited after {attempts} attempts: {last_error}")]
    QuotaExhausted {
        attempts: u32,
        last_error: Box<dyn ModelProviderError>,
    },
    #[error("{0}")]
    Provider(Box<dyn ModelProviderError>),
}
