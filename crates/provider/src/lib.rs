//! Email integration traits and shared building blocks for Courier.
//!
//! Backends implement [`EmailIntegration`]; the sender holds them as
//! `Arc<dyn DynEmailIntegration>`. [`FakeEmailIntegration`] is the in-memory
//! test double.

pub mod bulk;
pub mod error;
pub mod fake;
pub mod integration;
pub mod kind;
pub mod registry;

pub use error::IntegrationError;
pub use fake::FakeEmailIntegration;
pub use integration::{DynEmailIntegration, EmailIntegration};
pub use kind::{LocalOptions, ProviderConfiguration, ProviderKind, SesOptions};
pub use registry::TemplateRegistry;
