use tracing::debug;

use crate::config::AwsBaseConfig;

/// Build an AWS SDK configuration from the ambient environment.
///
/// Credentials always come from the standard SDK credential chain. The
/// region and endpoint are taken from `config` when set.
///
/// # Examples
///
/// ```no_run
/// use courier_aws::config::AwsBaseConfig;
/// use courier_aws::auth::build_sdk_config;
///
/// # async fn example() {
/// let config = AwsBaseConfig::from_env().with_endpoint_url("http://localhost:4566");
/// let sdk_config = build_sdk_config(&config).await;
/// # }
/// ```
pub async fn build_sdk_config(config: &AwsBaseConfig) -> aws_config::SdkConfig {
    let mut loader = aws_config::from_env();

    if let Some(region) = &config.region {
        debug!(region = %region, "using configured AWS region");
        loader = loader.region(aws_config::Region::new(region.clone()));
    }

    if let Some(endpoint) = &config.endpoint_url {
        debug!(endpoint = %endpoint, "using custom AWS endpoint");
        loader = loader.endpoint_url(endpoint);
    }

    loader.load().await
}

#[cfg(all(test, feature = "integration"))]
mod integration_tests {
    use super::*;

    // The SDK panics on `load()` without a system root certificate store, so
    // these only run in integration mode.

    #[tokio::test]
    async fn build_sdk_config_sets_region() {
        let config = AwsBaseConfig::from_env().with_region("ap-northeast-1");
        let sdk_config = build_sdk_config(&config).await;
        assert_eq!(
            sdk_config.region().map(|r| r.as_ref()),
            Some("ap-northeast-1")
        );
    }
}
