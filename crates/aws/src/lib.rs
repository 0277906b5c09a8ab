//! AWS SES v2 plumbing for Courier.
//!
//! [`SesClient`] wraps the `SESv2` SDK client and exposes the handful of calls
//! an email integration needs: sending simple or templated mail and managing
//! stored templates. Region and endpoint overrides live in
//! [`AwsBaseConfig`](config::AwsBaseConfig); credentials always come from the
//! ambient SDK credential chain.

pub mod auth;
pub mod config;
pub mod error;
pub mod ses;

pub use config::AwsBaseConfig;
pub use error::AwsProviderError;
pub use ses::{SesClient, SesContent, SesMessage, SesTemplate};
