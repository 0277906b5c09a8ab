use thiserror::Error;

/// Errors that can occur while an integration sends email or manages templates.
#[derive(Debug, Error)]
pub enum IntegrationError {
    /// A single send addressed more recipients than the backend accepts in
    /// one call. Bulk send splits the work per email instead.
    #[error("too many recipients ({count}, limit {limit}); use bulk send instead")]
    RecipientLimitExceeded { count: usize, limit: usize },

    /// No template is registered under the given name.
    #[error("no template with the name {0}")]
    TemplateNotFound(String),

    /// The backend rejected the call. The backend's message is kept verbatim.
    #[error("{0}")]
    Backend(String),

    /// Template data or a backend payload could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The integration was given invalid configuration.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Writing to a local sink failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntegrationError {
    /// Returns `true` if the error says the named template does not exist.
    pub fn is_template_not_found(&self) -> bool {
        matches!(self, Self::TemplateNotFound(_))
    }
}
