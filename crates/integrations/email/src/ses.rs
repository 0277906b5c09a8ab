use courier_aws::{AwsBaseConfig, SesClient, SesContent, SesMessage, SesTemplate};
use courier_core::{Email, Envelope, Template, TemplatedEmail};
use courier_provider::{EmailIntegration, IntegrationError, ProviderKind, SesOptions};
use tracing::{debug, info, instrument, warn};

use crate::backend::SesBackend;

/// Most recipients SES accepts in a single `SendEmail` call.
pub const DEFAULT_RECIPIENT_LIMIT: usize = 50;

/// Email integration backed by Amazon SES v2.
///
/// Templates live in SES itself; nothing is cached locally. Every outgoing
/// message carries the configuration set and tags from [`SesOptions`] when
/// they are set.
///
/// # Examples
///
/// ```no_run
/// use courier_email::SesEmailIntegration;
/// use courier_provider::SesOptions;
///
/// # async fn example() {
/// let options = SesOptions::default()
///     .with_configuration_set("transactional")
///     .with_tag("team", "growth");
/// let integration = SesEmailIntegration::new(options).await;
/// # }
/// ```
pub struct SesEmailIntegration {
    options: SesOptions,
    recipient_limit: usize,
    backend: Box<dyn SesBackend>,
}

impl std::fmt::Debug for SesEmailIntegration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SesEmailIntegration")
            .field("options", &self.options)
            .field("recipient_limit", &self.recipient_limit)
            .field("backend", &self.backend)
            .finish()
    }
}

impl SesEmailIntegration {
    /// Build an integration talking to SES through the ambient AWS
    /// environment, honoring the region and endpoint overrides in `options`.
    pub async fn new(options: SesOptions) -> Self {
        let aws = AwsBaseConfig {
            region: options.region.clone(),
            endpoint_url: options.endpoint_url.clone(),
        };
        let client = SesClient::new(&aws).await;
        Self::with_backend(options, Box::new(client))
    }

    /// Create an integration with a pre-built backend.
    pub fn with_backend(options: SesOptions, backend: Box<dyn SesBackend>) -> Self {
        Self {
            options,
            recipient_limit: DEFAULT_RECIPIENT_LIMIT,
            backend,
        }
    }

    /// Override the per-call recipient cap.
    #[must_use]
    pub fn with_recipient_limit(mut self, limit: usize) -> Self {
        self.recipient_limit = limit;
        self
    }

    pub fn options(&self) -> &SesOptions {
        &self.options
    }

    fn message(&self, envelope: &Envelope, content: SesContent) -> SesMessage {
        SesMessage {
            from: envelope.sender.clone(),
            to: envelope.to.clone(),
            cc: envelope.cc.clone(),
            bcc: envelope.bcc.clone(),
            reply_to: envelope.reply_to.clone(),
            content,
            configuration_set: self.options.configuration_set.clone(),
            tags: self.options.tags.as_ref().map(|tags| {
                tags.iter()
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect()
            }),
        }
    }
}

fn ses_template(template: &Template) -> SesTemplate {
    SesTemplate {
        name: template.name().to_owned(),
        subject: template.subject().to_owned(),
        html_body: template.html_body().to_owned(),
        text_body: template.text_body().to_owned(),
    }
}

impl EmailIntegration for SesEmailIntegration {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Ses
    }

    #[instrument(skip(self, email), fields(email_id = %email.id(), provider = "ses"))]
    async fn send_email(&self, email: &Email) -> Result<(), IntegrationError> {
        let count = email.recipient_count();
        if count > self.recipient_limit {
            return Err(IntegrationError::RecipientLimitExceeded {
                count,
                limit: self.recipient_limit,
            });
        }

        let message = self.message(
            email.envelope(),
            SesContent::Simple {
                subject: email.subject().to_owned(),
                html_body: email.html_body().to_owned(),
                text_body: email.text_body().to_owned(),
            },
        );
        let message_id = self.backend.send(&message).await?;
        info!(message_id = %message_id, recipients = count, "email sent via SES");
        Ok(())
    }

    #[instrument(
        skip(self, email),
        fields(email_id = %email.id(), template = email.template_name(), provider = "ses")
    )]
    async fn send_templated_email(&self, email: &TemplatedEmail) -> Result<(), IntegrationError> {
        let message = self.message(
            email.envelope(),
            SesContent::Template {
                name: email.template_name().to_owned(),
                data: email.template_data().to_owned(),
            },
        );
        let message_id = self.backend.send(&message).await?;
        info!(message_id = %message_id, "templated email sent via SES");
        Ok(())
    }

    #[instrument(skip(self, template), fields(template = template.name(), provider = "ses"))]
    async fn create_template(
        &self,
        template: &Template,
        update_if_exists: bool,
    ) -> Result<(), IntegrationError> {
        let exists = match self.backend.template_exists(template.name()).await {
            Ok(exists) => exists,
            Err(e) => {
                warn!(error = %e, "template lookup failed, assuming it does not exist");
                false
            }
        };

        match (exists, update_if_exists) {
            (false, _) => self.backend.create_template(&ses_template(template)).await,
            (true, true) => self.backend.update_template(&ses_template(template)).await,
            (true, false) => {
                debug!("template already exists, leaving it untouched");
                Ok(())
            }
        }
    }

    #[instrument(skip(self, template), fields(template = template.name(), provider = "ses"))]
    async fn update_template(&self, template: &Template) -> Result<(), IntegrationError> {
        self.backend.update_template(&ses_template(template)).await
    }

    #[instrument(skip(self), fields(provider = "ses"))]
    async fn delete_template(&self, name: &str) -> Result<(), IntegrationError> {
        self.backend.delete_template(name).await
    }
}
