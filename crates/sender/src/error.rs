use std::fmt::Write as _;

use courier_provider::{IntegrationError, ProviderKind};
use thiserror::Error;

/// Errors returned by [`EmailSender`](crate::EmailSender).
#[derive(Debug, Error)]
pub enum SenderError {
    /// Every configured integration failed, or none is configured.
    ///
    /// Holds one error per integration tried, in priority order.
    #[error("Unable to send email on any integration{}", failure_lines(.errors))]
    AllProvidersFailed {
        errors: Vec<(ProviderKind, IntegrationError)>,
    },

    /// A template operation named a provider that is not configured.
    #[error("{0}")]
    ProviderNotConfigured(String),

    /// The addressed integration rejected a template operation.
    #[error(transparent)]
    Integration(#[from] IntegrationError),

    /// A provider list could not be turned into integrations.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A configuration file could not be read or parsed.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(String),
}

impl SenderError {
    /// Per-integration failures behind an `AllProvidersFailed` error.
    pub fn failures(&self) -> &[(ProviderKind, IntegrationError)] {
        match self {
            Self::AllProvidersFailed { errors } => errors,
            _ => &[],
        }
    }
}

fn failure_lines(errors: &[(ProviderKind, IntegrationError)]) -> String {
    errors.iter().fold(String::new(), |mut lines, (kind, error)| {
        let _ = write!(lines, "\n{kind}: {error}");
        lines
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_failed_lists_every_error() {
        let err = SenderError::AllProvidersFailed {
            errors: vec![
                (
                    ProviderKind::Ses,
                    IntegrationError::Backend("Throttling: Rate exceeded".into()),
                ),
                (
                    ProviderKind::Local,
                    IntegrationError::TemplateNotFound("welcome".into()),
                ),
            ],
        };
        assert_eq!(
            err.to_string(),
            "Unable to send email on any integration\n\
             ses: Throttling: Rate exceeded\n\
             local: no template with the name welcome"
        );
        assert_eq!(err.failures().len(), 2);
    }

    #[test]
    fn all_failed_without_integrations() {
        let err = SenderError::AllProvidersFailed { errors: Vec::new() };
        assert_eq!(err.to_string(), "Unable to send email on any integration");
    }

    #[test]
    fn integration_errors_are_transparent() {
        let err: SenderError = IntegrationError::TemplateNotFound("x".into()).into();
        assert_eq!(err.to_string(), "no template with the name x");
        assert!(err.failures().is_empty());
    }
}
