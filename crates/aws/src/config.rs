use serde::{Deserialize, Serialize};

/// Optional overrides applied on top of the ambient AWS environment.
///
/// Credentials always come from the standard SDK credential chain. Region
/// falls back to the environment (`AWS_REGION`, profile) when not set here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwsBaseConfig {
    /// AWS region (e.g. `"us-east-1"`).
    #[serde(default)]
    pub region: Option<String>,

    /// Endpoint URL override for local development (e.g. `LocalStack`).
    #[serde(default)]
    pub endpoint_url: Option<String>,
}

impl AwsBaseConfig {
    /// Create a config that takes everything from the environment.
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Set the region override.
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Set an endpoint URL override for local development.
    #[must_use]
    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }
}
