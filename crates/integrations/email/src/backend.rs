use async_trait::async_trait;
use courier_aws::{SesClient, SesMessage, SesTemplate};
use courier_provider::IntegrationError;

/// The SES calls [`SesEmailIntegration`](crate::ses::SesEmailIntegration)
/// depends on.
///
/// [`SesClient`] is the production implementation. Tests substitute an
/// in-memory backend so the integration can be driven without AWS.
#[async_trait]
pub trait SesBackend: Send + Sync + std::fmt::Debug {
    /// Send one message, returning the provider-assigned message id.
    async fn send(&self, message: &SesMessage) -> Result<String, IntegrationError>;

    /// Returns `true` if a template of that name exists.
    async fn template_exists(&self, name: &str) -> Result<bool, IntegrationError>;

    async fn create_template(&self, template: &SesTemplate) -> Result<(), IntegrationError>;

    /// Overwrite a template. Missing templates fail with `TemplateNotFound`.
    async fn update_template(&self, template: &SesTemplate) -> Result<(), IntegrationError>;

    /// Delete a template. Missing templates fail with `TemplateNotFound`.
    async fn delete_template(&self, name: &str) -> Result<(), IntegrationError>;
}

#[async_trait]
impl SesBackend for SesClient {
    async fn send(&self, message: &SesMessage) -> Result<String, IntegrationError> {
        self.send_email(message).await
    }

    async fn template_exists(&self, name: &str) -> Result<bool, IntegrationError> {
        SesClient::template_exists(self, name).await
    }

    async fn create_template(&self, template: &SesTemplate) -> Result<(), IntegrationError> {
        SesClient::create_template(self, template).await
    }

    async fn update_template(&self, template: &SesTemplate) -> Result<(), IntegrationError> {
        SesClient::update_template(self, template).await
    }

    async fn delete_template(&self, name: &str) -> Result<(), IntegrationError> {
        SesClient::delete_template(self, name).await
    }
}
