use aws_sdk_sesv2::operation::delete_email_template::DeleteEmailTemplateError;
use aws_sdk_sesv2::operation::get_email_template::GetEmailTemplateError;
use aws_sdk_sesv2::operation::update_email_template::UpdateEmailTemplateError;
use aws_sdk_sesv2::types::{
    Body, Content, Destination, EmailContent, EmailTemplateContent, Message, MessageTag,
};
use courier_provider::IntegrationError;
use tracing::{debug, error, info};

use crate::auth::build_sdk_config;
use crate::config::AwsBaseConfig;
use crate::error::AwsProviderError;

/// What an outgoing SES message carries as content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SesContent {
    /// Inline subject and bodies.
    Simple {
        subject: String,
        html_body: String,
        text_body: String,
    },
    /// A stored SES template plus its JSON substitution data.
    Template { name: String, data: String },
}

/// A fully resolved `SendEmail` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SesMessage {
    pub from: String,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub reply_to: Vec<String>,
    pub content: SesContent,
    /// Configuration set used for delivery tracking.
    pub configuration_set: Option<String>,
    /// Message tags as `(name, value)` pairs. `None` omits tags entirely.
    pub tags: Option<Vec<(String, String)>>,
}

/// Content of an SES email template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SesTemplate {
    pub name: String,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

/// AWS `SESv2` client wrapper for sending email and managing templates.
///
/// Each method maps onto exactly one SES API call. Backend errors keep the
/// SDK's message; "not found" responses on template calls become
/// [`IntegrationError::TemplateNotFound`].
pub struct SesClient {
    client: aws_sdk_sesv2::Client,
}

impl std::fmt::Debug for SesClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SesClient")
            .field("client", &"<SesV2Client>")
            .finish()
    }
}

impl SesClient {
    /// Create a new `SesClient` from the ambient AWS environment.
    pub async fn new(config: &AwsBaseConfig) -> Self {
        let sdk_config = build_sdk_config(config).await;
        let client = aws_sdk_sesv2::Client::new(&sdk_config);
        Self { client }
    }

    /// Send an email via the `SendEmail` API, returning the SES message id.
    pub async fn send_email(&self, message: &SesMessage) -> Result<String, IntegrationError> {
        debug!(from = %message.from, recipients = message.to.len(), "sending email via SES");

        let destination = Destination::builder()
            .set_to_addresses(non_empty(&message.to))
            .set_cc_addresses(non_empty(&message.cc))
            .set_bcc_addresses(non_empty(&message.bcc))
            .build();

        let content = match &message.content {
            SesContent::Simple {
                subject,
                html_body,
                text_body,
            } => {
                let body = Body::builder()
                    .text(utf8_content(text_body)?)
                    .html(utf8_content(html_body)?)
                    .build();
                let simple = Message::builder()
                    .subject(utf8_content(subject)?)
                    .body(body)
                    .build();
                EmailContent::builder().simple(simple).build()
            }
            SesContent::Template { name, data } => {
                let template = aws_sdk_sesv2::types::Template::builder()
                    .template_name(name)
                    .template_data(data)
                    .build();
                EmailContent::builder().template(template).build()
            }
        };

        let tags = message
            .tags
            .as_ref()
            .map(|tags| {
                tags.iter()
                    .map(|(name, value)| {
                        MessageTag::builder()
                            .name(name)
                            .value(value)
                            .build()
                            .map_err(|e| AwsProviderError::InvalidRequest(e.to_string()))
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;

        let result = self
            .client
            .send_email()
            .from_email_address(&message.from)
            .destination(destination)
            .content(content)
            .set_reply_to_addresses(non_empty(&message.reply_to))
            .set_configuration_set_name(message.configuration_set.clone())
            .set_email_tags(tags)
            .send()
            .await
            .map_err(|e| sdk_failure("SendEmail", e))?;

        let message_id = result.message_id().unwrap_or("unknown").to_owned();
        info!(message_id = %message_id, "SES email sent");
        Ok(message_id)
    }

    /// Returns `true` if a template of that name exists.
    pub async fn template_exists(&self, name: &str) -> Result<bool, IntegrationError> {
        debug!(template = %name, "looking up SES template");
        match self
            .client
            .get_email_template()
            .template_name(name)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e)
                if e.as_service_error()
                    .is_some_and(GetEmailTemplateError::is_not_found_exception) =>
            {
                Ok(false)
            }
            Err(e) => Err(sdk_failure("GetEmailTemplate", e)),
        }
    }

    /// Create a template via `CreateEmailTemplate`.
    pub async fn create_template(&self, template: &SesTemplate) -> Result<(), IntegrationError> {
        self.client
            .create_email_template()
            .template_name(&template.name)
            .template_content(template_content(template))
            .send()
            .await
            .map_err(|e| sdk_failure("CreateEmailTemplate", e))?;
        info!(template = %template.name, "SES template created");
        Ok(())
    }

    /// Overwrite a template via `UpdateEmailTemplate`.
    pub async fn update_template(&self, template: &SesTemplate) -> Result<(), IntegrationError> {
        match self
            .client
            .update_email_template()
            .template_name(&template.name)
            .template_content(template_content(template))
            .send()
            .await
        {
            Ok(_) => {
                info!(template = %template.name, "SES template updated");
                Ok(())
            }
            Err(e)
                if e.as_service_error()
                    .is_some_and(UpdateEmailTemplateError::is_not_found_exception) =>
            {
                Err(IntegrationError::TemplateNotFound(template.name.clone()))
            }
            Err(e) => Err(sdk_failure("UpdateEmailTemplate", e)),
        }
    }

    /// Delete a template via `DeleteEmailTemplate`.
    pub async fn delete_template(&self, name: &str) -> Result<(), IntegrationError> {
        match self
            .client
            .delete_email_template()
            .template_name(name)
            .send()
            .await
        {
            Ok(_) => {
                info!(template = %name, "SES template deleted");
                Ok(())
            }
            Err(e)
                if e.as_service_error()
                    .is_some_and(DeleteEmailTemplateError::is_not_found_exception) =>
            {
                Err(IntegrationError::TemplateNotFound(name.to_owned()))
            }
            Err(e) => Err(sdk_failure("DeleteEmailTemplate", e)),
        }
    }
}

fn non_empty(addresses: &[String]) -> Option<Vec<String>> {
    if addresses.is_empty() {
        None
    } else {
        Some(addresses.to_vec())
    }
}

fn utf8_content(data: &str) -> Result<Content, IntegrationError> {
    Content::builder()
        .data(data)
        .charset("UTF-8")
        .build()
        .map_err(|e| IntegrationError::Serialization(e.to_string()))
}

fn template_content(template: &SesTemplate) -> EmailTemplateContent {
    EmailTemplateContent::builder()
        .subject(&template.subject)
        .html(&template.html_body)
        .text(&template.text_body)
        .build()
}

fn sdk_failure<E>(operation: &'static str, err: E) -> IntegrationError
where
    E: std::error::Error,
{
    let err = AwsProviderError::from_sdk(err);
    error!(operation, error = %err, "SES call failed");
    err.into()
}
