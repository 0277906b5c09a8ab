use std::collections::HashMap;
use std::future::Future;

use async_trait::async_trait;
use courier_core::{Email, Template, TemplatedEmail};

use crate::bulk;
use crate::error::IntegrationError;
use crate::kind::ProviderKind;

/// The capability set every email backend offers.
///
/// This trait is **not** object-safe because it uses native `async fn`
/// methods. For dynamic dispatch use [`DynEmailIntegration`], which every
/// `EmailIntegration` implements through a blanket implementation.
///
/// The bulk methods have default implementations that fan out over the
/// single-send methods concurrently.
pub trait EmailIntegration: Send + Sync {
    /// The backend this integration talks to.
    fn kind(&self) -> ProviderKind;

    /// Send one email to all of its recipients.
    fn send_email(
        &self,
        email: &Email,
    ) -> impl Future<Output = Result<(), IntegrationError>> + Send;

    /// Send one templated email to all of its recipients.
    ///
    /// Fails with [`IntegrationError::TemplateNotFound`] when the backend has
    /// no template of that name.
    fn send_templated_email(
        &self,
        email: &TemplatedEmail,
    ) -> impl Future<Output = Result<(), IntegrationError>> + Send;

    /// Send every email independently and report per-email success.
    fn send_bulk_emails(
        &self,
        emails: &[Email],
    ) -> impl Future<Output = HashMap<Email, bool>> + Send {
        bulk::send_all(emails, |email| EmailIntegration::send_email(self, email))
    }

    /// Send every templated email independently and report per-email success.
    fn send_bulk_templated_emails(
        &self,
        emails: &[TemplatedEmail],
    ) -> impl Future<Output = HashMap<TemplatedEmail, bool>> + Send {
        bulk::send_all(emails, |email| {
            EmailIntegration::send_templated_email(self, email)
        })
    }

    /// Create `template` if no template of that name exists.
    ///
    /// An existing template is overwritten when `update_if_exists` is set and
    /// left untouched otherwise; neither case is an error.
    fn create_template(
        &self,
        template: &Template,
        update_if_exists: bool,
    ) -> impl Future<Output = Result<(), IntegrationError>> + Send;

    /// Overwrite an existing template.
    fn update_template(
        &self,
        template: &Template,
    ) -> impl Future<Output = Result<(), IntegrationError>> + Send;

    /// Delete an existing template.
    fn delete_template(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<(), IntegrationError>> + Send;
}

/// Object-safe email integration for use behind `Arc<dyn DynEmailIntegration>`.
///
/// Uses [`macro@async_trait`] to enable dynamic dispatch of async methods.
/// Implement [`EmailIntegration`] instead and rely on the blanket
/// implementation.
#[async_trait]
pub trait DynEmailIntegration: Send + Sync {
    fn kind(&self) -> ProviderKind;

    async fn send_email(&self, email: &Email) -> Result<(), IntegrationError>;

    async fn send_templated_email(&self, email: &TemplatedEmail) -> Result<(), IntegrationError>;

    async fn send_bulk_emails(&self, emails: &[Email]) -> HashMap<Email, bool>;

    async fn send_bulk_templated_emails(
        &self,
        emails: &[TemplatedEmail],
    ) -> HashMap<TemplatedEmail, bool>;

    async fn create_template(
        &self,
        template: &Template,
        update_if_exists: bool,
    ) -> Result<(), IntegrationError>;

    async fn update_template(&self, template: &Template) -> Result<(), IntegrationError>;

    async fn delete_template(&self, name: &str) -> Result<(), IntegrationError>;
}

#[async_trait]
impl<T: EmailIntegration + Sync> DynEmailIntegration for T {
    fn kind(&self) -> ProviderKind {
        EmailIntegration::kind(self)
    }

    async fn send_email(&self, email: &Email) -> Result<(), IntegrationError> {
        EmailIntegration::send_email(self, email).await
    }

    async fn send_templated_email(&self, email: &TemplatedEmail) -> Result<(), IntegrationError> {
        EmailIntegration::send_templated_email(self, email).await
    }

    async fn send_bulk_emails(&self, emails: &[Email]) -> HashMap<Email, bool> {
        EmailIntegration::send_bulk_emails(self, emails).await
    }

    async fn send_bulk_templated_emails(
        &self,
        emails: &[TemplatedEmail],
    ) -> HashMap<TemplatedEmail, bool> {
        EmailIntegration::send_bulk_templated_emails(self, emails).await
    }

    async fn create_template(
        &self,
        template: &Template,
        update_if_exists: bool,
    ) -> Result<(), IntegrationError> {
        EmailIntegration::create_template(self, template, update_if_exists).await
    }

    async fn update_template(&self, template: &Template) -> Result<(), IntegrationError> {
        EmailIntegration::update_template(self, template).await
    }

    async fn delete_template(&self, name: &str) -> Result<(), IntegrationError> {
        EmailIntegration::delete_template(self, name).await
    }
}
