use aws_sdk_sesv2::error::DisplayErrorContext;
use courier_provider::IntegrationError;
use thiserror::Error;

/// Errors raised while talking to AWS.
#[derive(Debug, Error)]
pub enum AwsProviderError {
    /// The SDK call failed. Holds the full SDK error context.
    #[error("{0}")]
    Service(String),

    /// A request could not be built from the given input.
    #[error("invalid configuration: {0}")]
    InvalidRequest(String),
}

impl AwsProviderError {
    /// Capture an SDK error with its whole source chain.
    pub fn from_sdk<E: std::error::Error>(err: E) -> Self {
        Self::Service(DisplayErrorContext(err).to_string())
    }
}

impl From<AwsProviderError> for IntegrationError {
    fn from(err: AwsProviderError) -> Self {
        match err {
            AwsProviderError::Service(msg) => IntegrationError::Backend(msg),
            AwsProviderError::InvalidRequest(msg) => IntegrationError::Configuration(msg),
        }
    }
}
