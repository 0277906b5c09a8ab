use std::sync::{Arc, LazyLock};
use std::sync::atomic::{AtomicBool, Ordering};

use courier_core::{Email, Template, TemplatedEmail};
use dashmap::DashSet;
use tracing::debug;

use crate::error::IntegrationError;
use crate::integration::EmailIntegration;
use crate::kind::ProviderKind;
use crate::registry::TemplateRegistry;

/// Message returned by every send while failure injection is enabled.
pub const INJECTED_FAILURE: &str = "Something went wrong";

static SHARED: LazyLock<Arc<FakeState>> = LazyLock::new(Arc::default);

/// An in-memory integration for tests.
///
/// Successful sends are recorded instead of delivered. All clones of a
/// `FakeEmailIntegration` share the same record, template registry and
/// failure switch, so a test can keep one handle while the sender owns
/// another.
///
/// [`FakeEmailIntegration::shared`] hands out the process-wide fake that a
/// sender built from configuration uses.
///
/// # Examples
///
/// ```
/// use courier_provider::FakeEmailIntegration;
///
/// let fake = FakeEmailIntegration::new();
/// let handle = fake.clone();
/// fake.set_fail_sends(true);
/// assert!(handle.fail_sends());
/// ```
#[derive(Debug, Clone, Default)]
pub struct FakeEmailIntegration {
    state: Arc<FakeState>,
}

#[derive(Debug, Default)]
struct FakeState {
    templates: TemplateRegistry,
    sent_emails: DashSet<Email>,
    sent_templated_emails: DashSet<TemplatedEmail>,
    fail_sends: AtomicBool,
}

impl FakeEmailIntegration {
    /// Create a fake with an empty record and sends enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle on the process-wide fake.
    ///
    /// Every call returns a handle on the same record, template registry and
    /// failure switch.
    pub fn shared() -> Self {
        Self {
            state: Arc::clone(&SHARED),
        }
    }

    /// Forget every recorded email and template and re-enable sends.
    pub fn reset(&self) {
        self.state.templates.clear();
        self.state.sent_emails.clear();
        self.state.sent_templated_emails.clear();
        self.set_fail_sends(false);
    }

    /// Force every subsequent send to fail (or succeed again).
    pub fn set_fail_sends(&self, fail: bool) {
        self.state.fail_sends.store(fail, Ordering::SeqCst);
    }

    pub fn fail_sends(&self) -> bool {
        self.state.fail_sends.load(Ordering::SeqCst)
    }

    /// Every email sent so far, in no particular order.
    pub fn sent_emails(&self) -> Vec<Email> {
        self.state
            .sent_emails
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Every templated email sent so far, in no particular order.
    pub fn sent_templated_emails(&self) -> Vec<TemplatedEmail> {
        self.state
            .sent_templated_emails
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }

    pub fn has_sent(&self, email: &Email) -> bool {
        self.state.sent_emails.contains(email)
    }

    pub fn has_sent_templated(&self, email: &TemplatedEmail) -> bool {
        self.state.sent_templated_emails.contains(email)
    }

    /// Look up a registered template.
    pub fn template(&self, name: &str) -> Option<Template> {
        self.state.templates.get(name)
    }

    fn check_failure(&self) -> Result<(), IntegrationError> {
        if self.fail_sends() {
            return Err(IntegrationError::Backend(INJECTED_FAILURE.to_owned()));
        }
        Ok(())
    }
}

impl EmailIntegration for FakeEmailIntegration {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Fake
    }

    #[allow(clippy::unused_async)]
    async fn send_email(&self, email: &Email) -> Result<(), IntegrationError> {
        self.check_failure()?;
        debug!(email_id = %email.id(), "fake integration recorded email");
        self.state.sent_emails.insert(email.clone());
        Ok(())
    }

    #[allow(clippy::unused_async)]
    async fn send_templated_email(&self, email: &TemplatedEmail) -> Result<(), IntegrationError> {
        self.check_failure()?;
        self.state.templates.require(email.template_name())?;
        debug!(
            email_id = %email.id(),
            template = email.template_name(),
            "fake integration recorded templated email"
        );
        self.state.sent_templated_emails.insert(email.clone());
        Ok(())
    }

    #[allow(clippy::unused_async)]
    async fn create_template(
        &self,
        template: &Template,
        update_if_exists: bool,
    ) -> Result<(), IntegrationError> {
        self.state.templates.create(template, update_if_exists);
        Ok(())
    }

    #[allow(clippy::unused_async)]
    async fn update_template(&self, template: &Template) -> Result<(), IntegrationError> {
        self.state.templates.update(template)
    }

    #[allow(clippy::unused_async)]
    async fn delete_template(&self, name: &str) -> Result<(), IntegrationError> {
        self.state.templates.delete(name).map(|_| ())
    }
}
