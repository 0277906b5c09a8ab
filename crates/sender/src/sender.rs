use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use courier_core::{Email, Template, TemplatedEmail};
use courier_email::{LocalEmailIntegration, SesEmailIntegration};
use courier_provider::bulk::send_all;
use courier_provider::{
    DynEmailIntegration, FakeEmailIntegration, IntegrationError, ProviderConfiguration,
    ProviderKind,
};
use tracing::{debug, info, warn};

use crate::error::SenderError;

const CREATE_ON_MISSING_PROVIDER: &str =
    "Creating template for Email provider which does not exist";
const DELETE_ON_MISSING_PROVIDER: &str =
    "Deleting template for Email provider which does not exist";

/// Sends email through an ordered list of integrations, falling back to the
/// next one whenever a send fails.
///
/// Template management is addressed to one named provider and never falls
/// back.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use courier_provider::{FakeEmailIntegration, ProviderKind};
/// use courier_sender::EmailSender;
///
/// let fake = FakeEmailIntegration::new();
/// let mut sender = EmailSender::new();
/// sender.register(ProviderKind::Fake, Arc::new(fake.clone()));
/// assert!(sender.is_configured(ProviderKind::Fake));
/// ```
#[derive(Default)]
pub struct EmailSender {
    integrations: Vec<(ProviderKind, Arc<dyn DynEmailIntegration>)>,
}

impl std::fmt::Debug for EmailSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailSender")
            .field("providers", &self.providers())
            .finish()
    }
}

impl EmailSender {
    /// A sender with no integrations. Every send fails until providers are
    /// set or registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a sender from `(kind, configuration)` entries in priority order.
    pub async fn from_entries(
        entries: impl IntoIterator<Item = (ProviderKind, ProviderConfiguration)>,
    ) -> Result<Self, SenderError> {
        let mut sender = Self::new();
        sender.set_supported_email_providers(entries).await?;
        Ok(sender)
    }

    /// Replace every integration with ones built from `entries`.
    ///
    /// Entries are tried in the given order when sending. A later entry of an
    /// already listed kind replaces the earlier one in place. On error the
    /// current integrations are left untouched.
    ///
    /// A fake entry is backed by [`FakeEmailIntegration::shared`].
    pub async fn set_supported_email_providers(
        &mut self,
        entries: impl IntoIterator<Item = (ProviderKind, ProviderConfiguration)>,
    ) -> Result<(), SenderError> {
        let mut replacement = Self::new();
        for (kind, configuration) in entries {
            let integration = build_integration(kind, &configuration).await?;
            replacement.register(kind, integration);
        }
        info!(providers = ?replacement.providers(), "email providers configured");
        *self = replacement;
        Ok(())
    }

    /// Add a pre-built integration under `kind`.
    ///
    /// An integration already registered under `kind` is replaced and keeps
    /// its position; otherwise the new one is tried last.
    pub fn register(&mut self, kind: ProviderKind, integration: Arc<dyn DynEmailIntegration>) {
        match self.integrations.iter_mut().find(|(k, _)| *k == kind) {
            Some(slot) => slot.1 = integration,
            None => self.integrations.push((kind, integration)),
        }
    }

    /// Builder form of [`register`](Self::register).
    #[must_use]
    pub fn with_integration(
        mut self,
        kind: ProviderKind,
        integration: Arc<dyn DynEmailIntegration>,
    ) -> Self {
        self.register(kind, integration);
        self
    }

    /// Configured providers in priority order.
    pub fn providers(&self) -> Vec<ProviderKind> {
        self.integrations.iter().map(|(kind, _)| *kind).collect()
    }

    pub fn is_configured(&self, kind: ProviderKind) -> bool {
        self.integration(kind).is_some()
    }

    fn integration(&self, kind: ProviderKind) -> Option<&dyn DynEmailIntegration> {
        self.integrations
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, integration)| &**integration)
    }

    async fn with_failover<'s, F, Fut>(&'s self, send: F) -> Result<(), SenderError>
    where
        F: Fn(&'s dyn DynEmailIntegration) -> Fut,
        Fut: Future<Output = Result<(), IntegrationError>>,
    {
        let mut errors = Vec::new();
        for (kind, integration) in &self.integrations {
            debug!(provider = %kind, "attempting send");
            match send(&**integration).await {
                Ok(()) => {
                    info!(provider = %kind, failed_over = errors.len(), "email sent");
                    return Ok(());
                }
                Err(e) => {
                    warn!(provider = %kind, error = %e, "send failed, trying next provider");
                    errors.push((*kind, e));
                }
            }
        }
        Err(SenderError::AllProvidersFailed { errors })
    }

    /// Send `email` through the first integration that accepts it.
    pub async fn send_email(&self, email: &Email) -> Result<(), SenderError> {
        self.with_failover(|integration| integration.send_email(email))
            .await
    }

    /// Send `email` through the first integration that accepts it.
    pub async fn send_templated_email(&self, email: &TemplatedEmail) -> Result<(), SenderError> {
        self.with_failover(|integration| integration.send_templated_email(email))
            .await
    }

    /// Send every email concurrently, each with its own failover pass.
    ///
    /// The result has one entry per email, `true` iff some integration
    /// accepted it.
    pub async fn send_bulk_emails(&self, emails: &[Email]) -> HashMap<Email, bool> {
        send_all(emails, |email| self.send_email(email)).await
    }

    /// Templated counterpart of [`send_bulk_emails`](Self::send_bulk_emails).
    pub async fn send_bulk_templated_emails(
        &self,
        emails: &[TemplatedEmail],
    ) -> HashMap<TemplatedEmail, bool> {
        send_all(emails, |email| self.send_templated_email(email)).await
    }

    /// Create a template on the `kind` provider only.
    pub async fn create_template(
        &self,
        kind: ProviderKind,
        template: &Template,
        update_if_exists: bool,
    ) -> Result<(), SenderError> {
        let integration = self.integration(kind).ok_or_else(|| {
            SenderError::ProviderNotConfigured(CREATE_ON_MISSING_PROVIDER.to_owned())
        })?;
        integration.create_template(template, update_if_exists).await?;
        Ok(())
    }

    /// Overwrite a template on the `kind` provider only.
    pub async fn update_template(
        &self,
        kind: ProviderKind,
        template: &Template,
    ) -> Result<(), SenderError> {
        let integration = self.integration(kind).ok_or_else(|| {
            SenderError::ProviderNotConfigured(CREATE_ON_MISSING_PROVIDER.to_owned())
        })?;
        integration.update_template(template).await?;
        Ok(())
    }

    /// Delete a template on the `kind` provider only.
    pub async fn delete_template(&self, kind: ProviderKind, name: &str) -> Result<(), SenderError> {
        let integration = self.integration(kind).ok_or_else(|| {
            SenderError::ProviderNotConfigured(DELETE_ON_MISSING_PROVIDER.to_owned())
        })?;
        integration.delete_template(name).await?;
        Ok(())
    }
}

async fn build_integration(
    kind: ProviderKind,
    configuration: &ProviderConfiguration,
) -> Result<Arc<dyn DynEmailIntegration>, SenderError> {
    if !configuration.applies_to(kind) {
        return Err(SenderError::Configuration(format!(
            "{kind} provider cannot use {configuration:?}"
        )));
    }

    let integration: Arc<dyn DynEmailIntegration> = match kind {
        ProviderKind::Ses => {
            Arc::new(SesEmailIntegration::new(configuration.ses_options()).await)
        }
        ProviderKind::Local => Arc::new(LocalEmailIntegration::new(configuration.local_options())),
        ProviderKind::Fake => Arc::new(FakeEmailIntegration::shared()),
    };
    Ok(integration)
}

#[cfg(test)]
mod tests {
    use courier_core::Envelope;
    use courier_provider::LocalOptions;

    use super::*;

    fn email() -> Email {
        Email::new(
            Envelope::new("sender@example.com", ["recipient@example.com"]),
            "Test email",
            "<p>This is a test email</p>",
            "This is a test email",
        )
        .unwrap()
    }

    fn templated() -> TemplatedEmail {
        TemplatedEmail::new(
            Envelope::new("sender@example.com", ["recipient@example.com"]),
            "welcome",
            r#"{"name":"Bob"}"#,
        )
        .unwrap()
    }

    fn template() -> Template {
        Template::new("welcome", "Hi {{name}}", "<p>Hi {{name}}</p>", "Hi {{name}}").unwrap()
    }

    fn failing() -> FakeEmailIntegration {
        let fake = FakeEmailIntegration::new();
        fake.set_fail_sends(true);
        fake
    }

    #[tokio::test]
    async fn first_success_short_circuits() {
        let first = FakeEmailIntegration::new();
        let second = FakeEmailIntegration::new();
        let sender = EmailSender::new()
            .with_integration(ProviderKind::Ses, Arc::new(first.clone()))
            .with_integration(ProviderKind::Fake, Arc::new(second.clone()));

        let email = email();
        sender.send_email(&email).await.unwrap();

        assert!(first.has_sent(&email));
        assert!(second.sent_emails().is_empty());
    }

    #[tokio::test]
    async fn failure_falls_through_to_next_provider() {
        let backup = FakeEmailIntegration::new();
        let sender = EmailSender::new()
            .with_integration(ProviderKind::Ses, Arc::new(failing()))
            .with_integration(ProviderKind::Fake, Arc::new(backup.clone()));

        let email = email();
        sender.send_email(&email).await.unwrap();
        assert!(backup.has_sent(&email));
    }

    #[tokio::test]
    async fn all_failures_are_reported() {
        let sender = EmailSender::new()
            .with_integration(ProviderKind::Ses, Arc::new(failing()))
            .with_integration(ProviderKind::Fake, Arc::new(failing()));

        let err = sender.send_email(&email()).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unable to send email on any integration\n\
             ses: Something went wrong\n\
             fake: Something went wrong"
        );
        assert_eq!(err.failures().len(), 2);
    }

    #[tokio::test]
    async fn sending_without_providers_fails() {
        let sender = EmailSender::new();
        let err = sender.send_email(&email()).await.unwrap_err();
        assert!(matches!(err, SenderError::AllProvidersFailed { .. }));
        let err = sender.send_templated_email(&templated()).await.unwrap_err();
        assert!(err.failures().is_empty());
    }

    #[tokio::test]
    async fn templated_send_fails_over_on_missing_template() {
        let without_template = FakeEmailIntegration::new();
        let with_template = FakeEmailIntegration::new();
        let sender = EmailSender::new()
            .with_integration(ProviderKind::Ses, Arc::new(without_template))
            .with_integration(ProviderKind::Fake, Arc::new(with_template.clone()));
        sender
            .create_template(ProviderKind::Fake, &template(), false)
            .await
            .unwrap();

        let email = templated();
        sender.send_templated_email(&email).await.unwrap();
        assert!(with_template.has_sent_templated(&email));
    }

    #[tokio::test]
    async fn bulk_send_runs_failover_per_email() {
        let primary = failing();
        let backup = FakeEmailIntegration::new();
        let sender = EmailSender::new()
            .with_integration(ProviderKind::Ses, Arc::new(primary))
            .with_integration(ProviderKind::Fake, Arc::new(backup.clone()));
        let emails: Vec<Email> = (0..4).map(|_| email()).collect();

        let results = sender.send_bulk_emails(&emails).await;

        assert_eq!(results.len(), 4);
        assert!(results.values().all(|ok| *ok));
        assert_eq!(backup.sent_emails().len(), 4);
    }

    #[tokio::test]
    async fn bulk_send_marks_undeliverable_emails_false() {
        let sender = EmailSender::new().with_integration(ProviderKind::Fake, Arc::new(failing()));
        let emails = vec![templated(), templated()];

        let results = sender.send_bulk_templated_emails(&emails).await;
        assert_eq!(results.len(), 2);
        assert!(results.values().all(|ok| !ok));
    }

    #[tokio::test]
    async fn template_operations_target_one_provider() {
        let ses_slot = FakeEmailIntegration::new();
        let fake = FakeEmailIntegration::new();
        let sender = EmailSender::new()
            .with_integration(ProviderKind::Ses, Arc::new(ses_slot.clone()))
            .with_integration(ProviderKind::Fake, Arc::new(fake.clone()));

        sender
            .create_template(ProviderKind::Fake, &template(), false)
            .await
            .unwrap();
        assert!(fake.template("welcome").is_some());
        assert!(ses_slot.template("welcome").is_none());

        let err = sender
            .update_template(ProviderKind::Ses, &template())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SenderError::Integration(IntegrationError::TemplateNotFound(_))
        ));

        sender
            .delete_template(ProviderKind::Fake, "welcome")
            .await
            .unwrap();
        assert!(fake.template("welcome").is_none());
    }

    #[tokio::test]
    async fn template_operations_on_missing_provider() {
        let sender = EmailSender::new().with_integration(
            ProviderKind::Fake,
            Arc::new(FakeEmailIntegration::new()),
        );

        let err = sender
            .create_template(ProviderKind::Local, &template(), true)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Creating template for Email provider which does not exist"
        );
        let err = sender
            .update_template(ProviderKind::Ses, &template())
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Creating template for Email provider which does not exist"
        );
        let err = sender
            .delete_template(ProviderKind::Local, "welcome")
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Deleting template for Email provider which does not exist"
        );
    }

    #[test]
    fn register_replaces_in_place() {
        let mut sender = EmailSender::new()
            .with_integration(ProviderKind::Ses, Arc::new(FakeEmailIntegration::new()))
            .with_integration(ProviderKind::Fake, Arc::new(FakeEmailIntegration::new()));
        sender.register(ProviderKind::Ses, Arc::new(FakeEmailIntegration::new()));
        sender.register(ProviderKind::Local, Arc::new(LocalEmailIntegration::stdout()));

        assert_eq!(
            sender.providers(),
            vec![ProviderKind::Ses, ProviderKind::Fake, ProviderKind::Local]
        );
        assert!(format!("{sender:?}").contains("Local"));
    }

    #[tokio::test]
    async fn set_providers_replaces_everything() {
        let mut sender =
            EmailSender::new().with_integration(ProviderKind::Ses, Arc::new(failing()));

        sender
            .set_supported_email_providers([
                (ProviderKind::Fake, ProviderConfiguration::Default),
                (
                    ProviderKind::Local,
                    ProviderConfiguration::Local(LocalOptions::default()),
                ),
            ])
            .await
            .unwrap();

        assert_eq!(sender.providers(), vec![ProviderKind::Fake, ProviderKind::Local]);
        assert!(!sender.is_configured(ProviderKind::Ses));
    }

    #[tokio::test]
    async fn mismatched_configuration_is_rejected() {
        let mut sender =
            EmailSender::new().with_integration(ProviderKind::Fake, Arc::new(failing()));

        let err = sender
            .set_supported_email_providers([(
                ProviderKind::Fake,
                ProviderConfiguration::Local(LocalOptions::default()),
            )])
            .await
            .unwrap_err();

        assert!(matches!(err, SenderError::Configuration(_)));
        assert_eq!(sender.providers(), vec![ProviderKind::Fake]);
    }
}
