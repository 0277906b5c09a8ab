use crate::error::ValidationError;

/// A reusable email template identified by its name.
///
/// Subject and both bodies may contain `{{key}}` placeholders that are
/// resolved against a templated email's data at send time.
///
/// # Examples
///
/// ```
/// use courier_core::Template;
///
/// let template = Template::new("welcome", "Hi {{name}}", "<p>Hi {{name}}</p>", "Hi {{name}}")
///     .unwrap();
/// assert_eq!(template.name(), "welcome");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    name: String,
    subject: String,
    html_body: String,
    text_body: String,
}

impl Template {
    /// Validate and build a template. All four fields must be non-empty.
    pub fn new(
        name: impl Into<String>,
        subject: impl Into<String>,
        html_body: impl Into<String>,
        text_body: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let template = Self {
            name: name.into(),
            subject: subject.into(),
            html_body: html_body.into(),
            text_body: text_body.into(),
        };

        let problems = [
            ("template name", &template.name),
            ("subject", &template.subject),
            ("html body", &template.html_body),
            ("text body", &template.text_body),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(field, _)| format!("{field} must not be empty"))
        .collect();
        ValidationError::check(problems)?;

        Ok(template)
    }

    pub fn name(&self) -> &str {
        &self.name
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
}
