use std::collections::HashMap;
use std::path::{Path, PathBuf};

use courier_core::{Email, Envelope, Template, TemplatedEmail};
use courier_provider::bulk::send_all_indexed;
use courier_provider::{
    EmailIntegration, IntegrationError, LocalOptions, ProviderKind, TemplateRegistry,
};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::render::render_template;

/// An integration that writes every email as a readable text block instead
/// of delivering it.
///
/// Blocks are appended to the configured file (created on first write) or
/// printed to stdout. Templates are kept in memory for the lifetime of the
/// integration.
///
/// # Examples
///
/// ```no_run
/// use courier_email::LocalEmailIntegration;
/// use courier_provider::LocalOptions;
///
/// let local = LocalEmailIntegration::new(LocalOptions::default().with_output_file("outbox.log"));
/// assert_eq!(local.output_file().unwrap().to_str(), Some("outbox.log"));
/// ```
#[derive(Debug, Default)]
pub struct LocalEmailIntegration {
    output_file: Option<PathBuf>,
    templates: TemplateRegistry,
    // Held for the whole write so concurrent blocks never interleave.
    write_lock: Mutex<()>,
}

impl LocalEmailIntegration {
    pub fn new(options: LocalOptions) -> Self {
        Self {
            output_file: options.output_file,
            ..Self::default()
        }
    }

    /// An integration that prints to stdout.
    pub fn stdout() -> Self {
        Self::default()
    }

    pub fn output_file(&self) -> Option<&Path> {
        self.output_file.as_deref()
    }

    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    async fn write_email(
        &self,
        heading: Option<String>,
        email: &Email,
    ) -> Result<(), IntegrationError> {
        let block = format_block(
            "SENDING EMAIL:",
            email.envelope(),
            email.subject(),
            email.text_body(),
            email.html_body(),
        );
        self.append(heading, &block).await
    }

    async fn write_templated(
        &self,
        heading: Option<String>,
        email: &TemplatedEmail,
    ) -> Result<(), IntegrationError> {
        let template = self.templates.require(email.template_name())?;
        let rendered = render_template(&template, email.template_data())?;
        let block = format_block(
            "SENDING TEMPLATED EMAIL:",
            email.envelope(),
            &rendered.subject,
            &rendered.text_body,
            &rendered.html_body,
        );
        self.append(heading, &block).await
    }

    async fn append(&self, heading: Option<String>, block: &str) -> Result<(), IntegrationError> {
        let text = match heading {
            Some(heading) => format!("{heading}\n{block}"),
            None => block.to_owned(),
        };
        let _guard = self.write_lock.lock().await;
        match &self.output_file {
            Some(path) => {
                let mut file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .await?;
                file.write_all(text.as_bytes()).await?;
                file.flush().await?;
            }
            None => {
                let mut stdout = tokio::io::stdout();
                stdout.write_all(text.as_bytes()).await?;
                stdout.flush().await?;
            }
        }
        Ok(())
    }
}

fn format_block(
    heading: &str,
    envelope: &Envelope,
    subject: &str,
    text_body: &str,
    html_body: &str,
) -> String {
    format!(
        "{heading}\nTo: {}\nCC: {}\nBCC: {}\nReply To: {}\nSubject: {subject}\nText Body: {text_body}\nHTML Body: {html_body}\n",
        envelope.to.join(","),
        envelope.cc.join(","),
        envelope.bcc.join(","),
        envelope.reply_to.join(","),
    )
}

impl EmailIntegration for LocalEmailIntegration {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Local
    }

    #[instrument(skip(self, email), fields(email_id = %email.id(), provider = "local"))]
    async fn send_email(&self, email: &Email) -> Result<(), IntegrationError> {
        self.write_email(None, email).await?;
        debug!("email written to local log");
        Ok(())
    }

    #[instrument(
        skip(self, email),
        fields(email_id = %email.id(), template = email.template_name(), provider = "local")
    )]
    async fn send_templated_email(&self, email: &TemplatedEmail) -> Result<(), IntegrationError> {
        self.write_templated(None, email).await?;
        debug!("templated email written to local log");
        Ok(())
    }

    async fn send_bulk_emails(&self, emails: &[Email]) -> HashMap<Email, bool> {
        let total = emails.len();
        send_all_indexed(emails, |index, email| {
            self.write_email(Some(format!("Email {index} of {total}")), email)
        })
        .await
    }

    async fn send_bulk_templated_emails(
        &self,
        emails: &[TemplatedEmail],
    ) -> HashMap<TemplatedEmail, bool> {
        let total = emails.len();
        send_all_indexed(emails, |index, email| {
            self.write_templated(Some(format!("Templated Email {index} of {total}")), email)
        })
        .await
    }

    #[allow(clippy::unused_async)]
    async fn create_template(
        &self,
        template: &Template,
        update_if_exists: bool,
    ) -> Result<(), IntegrationError> {
        if self.templates.create(template, update_if_exists) {
            debug!(template = template.name(), "local template stored");
        }
        Ok(())
    }

    #[allow(clippy::unused_async)]
    async fn update_template(&self, template: &Template) -> Result<(), IntegrationError> {
        self.templates.update(template)
    }

    #[allow(clippy::unused_async)]
    async fn delete_template(&self, name: &str) -> Result<(), IntegrationError> {
        self.templates.delete(name).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn to_file() -> (TempDir, LocalEmailIntegration) {
        let dir = tempfile::tempdir().unwrap();
        let local = LocalEmailIntegration::new(
            LocalOptions::default().with_output_file(dir.path().join("outbox.log")),
        );
        (dir, local)
    }

    async fn contents(local: &LocalEmailIntegration) -> String {
        tokio::fs::read_to_string(local.output_file().unwrap())
            .await
            .unwrap()
    }

    fn email(subject: &str) -> Email {
        Email::new(
            Envelope::new(
                "sender@example.com",
                ["recipient1@example.com", "recipient2@example.com"],
            )
            .with_bcc(["bcc@example.com"]),
            subject,
            "<p>This is a test email</p>",
            "This is a test email",
        )
        .unwrap()
    }

    fn templated(data: &str) -> TemplatedEmail {
        TemplatedEmail::new(
            Envelope::new("sender@example.com", ["to@example.com"]),
            "greeting",
            data,
        )
        .unwrap()
    }

    fn template() -> Template {
        Template::new(
            "greeting",
            "Welcome {{name}}",
            "<p>Hi {{name}}</p>",
            "Hi {{name}}, {{name}}!",
        )
        .unwrap()
    }

    #[tokio::test]
    async fn send_appends_labelled_block() {
        let (_dir, local) = to_file();

        EmailIntegration::send_email(&local, &email("Test email"))
            .await
            .unwrap();

        assert_eq!(
            contents(&local).await,
            "SENDING EMAIL:\n\
             To: recipient1@example.com,recipient2@example.com\n\
             CC: \n\
             BCC: bcc@example.com\n\
             Reply To: \n\
             Subject: Test email\n\
             Text Body: This is a test email\n\
             HTML Body: <p>This is a test email</p>\n"
        );
    }

    #[tokio::test]
    async fn file_is_appended_not_truncated() {
        let (_dir, local) = to_file();

        EmailIntegration::send_email(&local, &email("First")).await.unwrap();
        EmailIntegration::send_email(&local, &email("Second")).await.unwrap();

        let log = contents(&local).await;
        assert_eq!(log.matches("SENDING EMAIL:").count(), 2);
        assert!(log.find("Subject: First").unwrap() < log.find("Subject: Second").unwrap());
    }

    #[tokio::test]
    async fn templated_send_renders_template() {
        let (_dir, local) = to_file();
        EmailIntegration::create_template(&local, &template(), false)
            .await
            .unwrap();

        EmailIntegration::send_templated_email(&local, &templated(r#"{"name":"Bob"}"#))
            .await
            .unwrap();

        let log = contents(&local).await;
        assert!(log.starts_with("SENDING TEMPLATED EMAIL:\n"));
        assert!(log.contains("Subject: Welcome Bob\n"));
        assert!(log.contains("Text Body: Hi Bob, Bob!\n"));
        assert!(log.contains("HTML Body: <p>Hi Bob</p>\n"));
    }

    #[tokio::test]
    async fn templated_send_without_template_fails() {
        let (_dir, local) = to_file();

        let err = EmailIntegration::send_templated_email(&local, &templated("{}"))
            .await
            .unwrap_err();

        assert!(err.is_template_not_found());
        assert!(!local.output_file().unwrap().exists());
    }

    #[tokio::test]
    async fn templated_send_rejects_non_object_data() {
        let (_dir, local) = to_file();
        EmailIntegration::create_template(&local, &template(), false)
            .await
            .unwrap();

        let err = EmailIntegration::send_templated_email(&local, &templated("\"Bob\""))
            .await
            .unwrap_err();
        assert!(matches!(err, IntegrationError::Serialization(_)));
    }

    #[tokio::test]
    async fn bulk_send_logs_position_and_keeps_blocks_whole() {
        let (_dir, local) = to_file();
        let emails: Vec<Email> = (0..5).map(|n| email(&format!("Email {n}"))).collect();

        let results = EmailIntegration::send_bulk_emails(&local, &emails).await;

        assert_eq!(results.len(), 5);
        assert!(results.values().all(|ok| *ok));
        let log = contents(&local).await;
        for index in 0..5 {
            assert!(log.contains(&format!("Email {index} of 5\nSENDING EMAIL:\n")));
        }
        assert_eq!(log.lines().count(), 5 * 9);
    }

    #[tokio::test]
    async fn bulk_templated_send_marks_missing_template_false() {
        let (_dir, local) = to_file();
        EmailIntegration::create_template(&local, &template(), false)
            .await
            .unwrap();
        let good = templated(r#"{"name":"Ann"}"#);
        let bad = TemplatedEmail::new(
            Envelope::new("sender@example.com", ["to@example.com"]),
            "missing",
            "{}",
        )
        .unwrap();

        let results =
            EmailIntegration::send_bulk_templated_emails(&local, &[good.clone(), bad.clone()])
                .await;

        assert!(results[&good]);
        assert!(!results[&bad]);
        let log = contents(&local).await;
        assert!(log.starts_with("Templated Email 0 of 2\nSENDING TEMPLATED EMAIL:\n"));
    }

    #[tokio::test]
    async fn template_lifecycle() {
        let local = LocalEmailIntegration::stdout();

        EmailIntegration::create_template(&local, &template(), false)
            .await
            .unwrap();
        let changed = Template::new("greeting", "Changed", "<p>x</p>", "x").unwrap();
        EmailIntegration::create_template(&local, &changed, false)
            .await
            .unwrap();
        assert_eq!(
            local.templates().get("greeting").unwrap().subject(),
            "Welcome {{name}}"
        );

        EmailIntegration::update_template(&local, &changed)
            .await
            .unwrap();
        assert_eq!(local.templates().get("greeting").unwrap().subject(), "Changed");

        EmailIntegration::delete_template(&local, "greeting")
            .await
            .unwrap();
        let err = EmailIntegration::delete_template(&local, "greeting")
            .await
            .unwrap_err();
        assert!(err.is_template_not_found());
        let err = EmailIntegration::update_template(&local, &changed)
            .await
            .unwrap_err();
        assert!(err.is_template_not_found());
    }
}
