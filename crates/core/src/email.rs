use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::address::{invalid_addresses, is_valid_address};
use crate::error::ValidationError;

/// Addressing shared by [`Email`] and [`TemplatedEmail`].
///
/// An envelope on its own is unchecked input. It is validated when it is
/// handed to [`Email::new`] or [`TemplatedEmail::new`].
///
/// # Examples
///
/// ```
/// use courier_core::Envelope;
///
/// let envelope = Envelope::new("noreply@example.com", ["user@example.com"])
///     .with_cc(["audit@example.com"]);
/// assert_eq!(envelope.recipient_count(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Address the email is sent from.
    pub sender: String,

    /// Primary recipients.
    #[serde(default)]
    pub to: Vec<String>,

    /// Carbon-copy recipients.
    #[serde(default)]
    pub cc: Vec<String>,

    /// Blind carbon-copy recipients.
    #[serde(default)]
    pub bcc: Vec<String>,

    /// Addresses that receive replies.
    #[serde(default)]
    pub reply_to: Vec<String>,
}

impl Envelope {
    /// Create an envelope with a sender and primary recipients.
    pub fn new<I, S>(sender: impl Into<String>, to: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sender: sender.into(),
            to: to.into_iter().map(Into::into).collect(),
            cc: Vec::new(),
            bcc: Vec::new(),
            reply_to: Vec::new(),
        }
    }

    /// Set the CC recipients.
    #[must_use]
    pub fn with_cc<I, S>(mut self, cc: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cc = cc.into_iter().map(Into::into).collect();
        self
    }

    /// Set the BCC recipients.
    #[must_use]
    pub fn with_bcc<I, S>(mut self, bcc: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bcc = bcc.into_iter().map(Into::into).collect();
        self
    }

    /// Set the reply-to addresses.
    #[must_use]
    pub fn with_reply_to<I, S>(mut self, reply_to: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reply_to = reply_to.into_iter().map(Into::into).collect();
        self
    }

    /// Total number of recipients across to, cc and bcc.
    ///
    /// Reply-to addresses are not recipients.
    pub fn recipient_count(&self) -> usize {
        self.to.len() + self.cc.len() + self.bcc.len()
    }

    fn collect_problems(&self, problems: &mut Vec<String>) {
        if !is_valid_address(&self.sender) {
            problems.push(format!("invalid sender address: {}", self.sender));
        }
        for (label, addresses) in [
            ("to", &self.to),
            ("cc", &self.cc),
            ("bcc", &self.bcc),
            ("reply-to", &self.reply_to),
        ] {
            let invalid = invalid_addresses(addresses);
            if !invalid.is_empty() {
                problems.push(format!("invalid {label} addresses: {}", invalid.join(",")));
            }
        }
        if self.recipient_count() == 0 {
            problems.push("no recipients defined for email".to_owned());
        }
    }
}

/// A fully specified email with subject and both body variants.
///
/// Construction validates every address and requires non-empty subject,
/// HTML body and text body. The value is immutable afterwards.
///
/// Each constructed email gets a unique id; equality and hashing use that
/// id, so two emails with identical content are still distinct keys in a
/// bulk result map. Clones keep the id of the original.
///
/// # Examples
///
/// ```
/// use courier_core::{Email, Envelope};
///
/// let email = Email::new(
///     Envelope::new("noreply@example.com", ["user@example.com"]),
///     "Welcome",
///     "<p>Hello</p>",
///     "Hello",
/// )
/// .unwrap();
/// assert_eq!(email.subject(), "Welcome");
///
/// let bad = Email::new(Envelope::new("nope", ["also-nope"]), "s", "h", "t");
/// assert_eq!(bad.unwrap_err().problems().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Email {
    id: Uuid,
    envelope: Envelope,
    subject: String,
    html_body: String,
    text_body: String,
}

impl Email {
    /// Validate and build an email.
    pub fn new(
        envelope: Envelope,
        subject: impl Into<String>,
        html_body: impl Into<String>,
        text_body: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let subject = subject.into();
        let html_body = html_body.into();
        let text_body = text_body.into();

        let mut problems = Vec::new();
        envelope.collect_problems(&mut problems);
        for (field, value) in [
            ("subject", &subject),
            ("html body", &html_body),
            ("text body", &text_body),
        ] {
            if value.is_empty() {
                problems.push(format!("{field} must not be empty"));
            }
        }
        ValidationError::check(problems)?;

        Ok(Self {
            id: Uuid::new_v4(),
            envelope,
            subject,
            html_body,
            text_body,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    pub fn sender(&self) -> &str {
        &self.envelope.sender
    }

    pub fn to(&self) -> &[String] {
        &self.envelope.to
    }

    pub fn cc(&self) -> &[String] {
        &self.envelope.cc
    }

    pub fn bcc(&self) -> &[String] {
        &self.envelope.bcc
    }

    pub fn reply_to(&self) -> &[String] {
        &self.envelope.reply_to
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn html_body(&self) -> &str {
        &self.html_body
    }

    pub fn text_body(&self) -> &str {
        &self.text_body
    }

    pub fn recipient_count(&self) -> usize {
        self.envelope.recipient_count()
    }
}

/// An email whose content comes from a named template plus substitution data.
///
/// `template_data` is opaque to this type; by convention it is a JSON object
/// whose keys name the `{{key}}` placeholders in the template.
#[derive(Debug, Clone)]
pub struct TemplatedEmail {
    id: Uuid,
    envelope: Envelope,
    template_name: String,
    template_data: String,
}

impl TemplatedEmail {
    /// Validate and build a templated email.
    pub fn new(
        envelope: Envelope,
        template_name: impl Into<String>,
        template_data: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let template_name = template_name.into();

        let mut problems = Vec::new();
        envelope.collect_problems(&mut problems);
        if template_name.is_empty() {
            problems.push("template name must not be empty".to_owned());
        }
        ValidationError::check(problems)?;

        Ok(Self {
            id: Uuid::new_v4(),
            envelope,
            template_name,
            template_data: template_data.into(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    pub fn sender(&self) -> &str {
        &self.envelope.sender
    }

    pub fn to(&self) -> &[String] {
        &self.envelope.to
    }

    pub fn cc(&self) -> &[String] {
        &self.envelope.cc
    }

    pub fn bcc(&self) -> &[String] {
        &self.envelope.bcc
    }

    pub fn reply_to(&self) -> &[String] {
        &self.envelope.reply_to
    }

    pub fn template_name(&self) -> &str {
        &self.template_name
    }

    pub fn template_data(&self) -> &str {
        &self.template_data
    }

    pub fn recipient_count(&self) -> usize {
        self.envelope.recipient_count()
    }
}

macro_rules! identity_eq {
    ($ty:ty) => {
        impl PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                self.id == other.id
            }
        }

        impl Eq for $ty {}

        impl Hash for $ty {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.id.hash(state);
            }
        }
    };
}

identity_eq!(Email);
identity_eq!(TemplatedEmail);

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn full_envelope() -> Envelope {
        Envelope::new(
            "sender@example.com",
            ["recipient1@example.com", "recipient2@example.com"],
        )
        .with_cc(["cc1@example.com", "cc2@example.com"])
        .with_bcc(["bcc1@example.com", "bcc2@example.com"])
        .with_reply_to(["reply-to@example.com"])
    }

    #[test]
    fn email_preserves_fields() {
        let email = Email::new(
            full_envelope(),
            "Test email",
            "<p>This is a test email</p>",
            "This is a test email",
        )
        .unwrap();

        assert_eq!(email.sender(), "sender@example.com");
        assert_eq!(
            email.to(),
            ["recipient1@example.com", "recipient2@example.com"]
        );
        assert_eq!(email.cc(), ["cc1@example.com", "cc2@example.com"]);
        assert_eq!(email.bcc(), ["bcc1@example.com", "bcc2@example.com"]);
        assert_eq!(email.reply_to(), ["reply-to@example.com"]);
        assert_eq!(email.subject(), "Test email");
        assert_eq!(email.html_body(), "<p>This is a test email</p>");
        assert_eq!(email.text_body(), "This is a test email");
        assert_eq!(email.recipient_count(), 6);
    }

    #[test]
    fn invalid_sender_is_reported() {
        let err = Email::new(
            Envelope::new("not-an-address", ["to@example.com"]),
            "s",
            "h",
            "t",
        )
        .unwrap_err();
        assert_eq!(err.problems(), ["invalid sender address: not-an-address"]);
    }

    #[test]
    fn every_invalid_address_is_reported() {
        let envelope = Envelope::new("bad-sender", ["ok@example.com", "bad-to-1", "bad-to-2"])
            .with_cc(["bad-cc"])
            .with_bcc(["ok@example.com", "bad-bcc"])
            .with_reply_to(["bad-reply"]);
        let err = Email::new(envelope, "s", "h", "t").unwrap_err();

        let problems = err.problems();
        assert_eq!(problems.len(), 5);
        assert_eq!(problems[1], "invalid to addresses: bad-to-1,bad-to-2");
        let message = err.to_string();
        for bad in [
            "bad-sender",
            "bad-to-1",
            "bad-to-2",
            "bad-cc",
            "bad-bcc",
            "bad-reply",
        ] {
            assert!(message.contains(bad), "{bad} missing from {message}");
        }
    }

    #[test]
    fn zero_recipients_is_rejected() {
        let envelope =
            Envelope::new("sender@example.com", Vec::<String>::new()).with_reply_to(["r@example.com"]);
        let err = Email::new(envelope.clone(), "s", "h", "t").unwrap_err();
        assert_eq!(err.problems(), ["no recipients defined for email"]);

        let err = TemplatedEmail::new(envelope, "welcome", "{}").unwrap_err();
        assert_eq!(err.problems(), ["no recipients defined for email"]);
    }

    #[test]
    fn cc_only_counts_as_recipient() {
        let envelope =
            Envelope::new("sender@example.com", Vec::<String>::new()).with_cc(["cc@example.com"]);
        assert!(Email::new(envelope, "s", "h", "t").is_ok());
    }

    #[test]
    fn empty_content_fields_are_rejected() {
        let err = Email::new(full_envelope(), "", "", "").unwrap_err();
        assert_eq!(
            err.problems(),
            [
                "subject must not be empty",
                "html body must not be empty",
                "text body must not be empty",
            ]
        );
    }

    #[test]
    fn templated_email_preserves_fields() {
        let email = TemplatedEmail::new(
            Envelope::new("from@example.com", ["to@example.com"])
                .with_cc(["cc@example.com"])
                .with_bcc(["bcc@example.com"])
                .with_reply_to(["reply-to@example.com"]),
            "my-template",
            r#"{ "name": "Bob" }"#,
        )
        .unwrap();
        assert_eq!(email.template_name(), "my-template");
        assert_eq!(email.template_data(), r#"{ "name": "Bob" }"#);
        assert_eq!(email.cc(), ["cc@example.com"]);
        assert_eq!(email.recipient_count(), 3);
    }

    #[test]
    fn templated_email_requires_name() {
        let err = TemplatedEmail::new(
            Envelope::new("from@example.com", ["to@example.com"]),
            "",
            "{}",
        )
        .unwrap_err();
        assert_eq!(err.problems(), ["template name must not be empty"]);
    }

    #[test]
    fn identical_content_has_distinct_identity() {
        let make = || {
            Email::new(
                Envelope::new("from@example.com", ["to@example.com"]),
                "Same",
                "Same",
                "Same",
            )
            .unwrap()
        };
        let first = make();
        let second = make();
        assert_ne!(first, second);
        assert_eq!(first, first.clone());

        let mut map = HashMap::new();
        map.insert(first.clone(), true);
        map.insert(second, false);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&first), Some(&true));
    }

    #[test]
    fn envelope_deserializes_with_defaults() {
        let envelope: Envelope = serde_json::from_value(serde_json::json!({
            "sender": "from@example.com",
            "to": ["to@example.com"]
        }))
        .unwrap();
        assert!(envelope.cc.is_empty());
        assert!(envelope.reply_to.is_empty());
    }
}
