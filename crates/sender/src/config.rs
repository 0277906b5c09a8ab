use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use courier_provider::{LocalOptions, ProviderConfiguration, ProviderKind, SesOptions};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SenderError;

/// Provider list loaded from a TOML file.
///
/// Entries are listed in failover priority order.
///
/// # Example
///
/// ```toml
/// [[providers]]
/// type = "ses"
/// configuration_set = "transactional"
/// tags = { team = "growth" }
///
/// [[providers]]
/// type = "local"
/// output_file = "outbox.log"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderConfig {
    #[serde(default)]
    pub providers: Vec<ProviderEntry>,
}

/// Configuration for a single provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEntry {
    /// Provider type: `"ses"` (also `"aws"`, `"aws-ses"`), `"local"` or
    /// `"fake"`.
    #[serde(rename = "type")]
    pub provider_type: String,

    // ---- SES fields ----
    /// SES configuration set used for delivery tracking.
    #[serde(default)]
    pub configuration_set: Option<String>,
    /// Tags attached to every message sent through SES.
    #[serde(default)]
    pub tags: Option<BTreeMap<String, String>>,
    /// AWS region override.
    #[serde(default)]
    pub region: Option<String>,
    /// AWS endpoint override (e.g. `LocalStack`).
    #[serde(default)]
    pub endpoint_url: Option<String>,

    // ---- Local fields ----
    /// File the local provider appends to. Stdout when absent.
    #[serde(default)]
    pub output_file: Option<PathBuf>,
}

impl ProviderEntry {
    /// An entry of the given type with no settings.
    pub fn new(provider_type: impl Into<String>) -> Self {
        Self {
            provider_type: provider_type.into(),
            configuration_set: None,
            tags: None,
            region: None,
            endpoint_url: None,
            output_file: None,
        }
    }

    fn has_ses_fields(&self) -> bool {
        self.configuration_set.is_some()
            || self.tags.is_some()
            || self.region.is_some()
            || self.endpoint_url.is_some()
    }

    /// Resolve this entry into a provider kind and its configuration.
    ///
    /// Fields that belong to a different provider type are rejected.
    pub fn resolve(&self) -> Result<(ProviderKind, ProviderConfiguration), SenderError> {
        let kind: ProviderKind = self
            .provider_type
            .parse()
            .map_err(|_| {
                SenderError::Configuration(format!(
                    "unknown provider type '{}'",
                    self.provider_type
                ))
            })?;

        let misplaced = match kind {
            ProviderKind::Ses => self.output_file.is_some(),
            ProviderKind::Local => self.has_ses_fields(),
            ProviderKind::Fake => self.has_ses_fields() || self.output_file.is_some(),
        };
        if misplaced {
            return Err(SenderError::Configuration(format!(
                "provider '{}' has settings that only apply to another provider type",
                self.provider_type
            )));
        }

        let configuration = match kind {
            ProviderKind::Ses if self.has_ses_fields() => ProviderConfiguration::Ses(SesOptions {
                configuration_set: self.configuration_set.clone(),
                tags: self.tags.clone(),
                region: self.region.clone(),
                endpoint_url: self.endpoint_url.clone(),
            }),
            ProviderKind::Local if self.output_file.is_some() => {
                ProviderConfiguration::Local(LocalOptions {
                    output_file: self.output_file.clone(),
                })
            }
            _ => ProviderConfiguration::Default,
        };
        Ok((kind, configuration))
    }
}

impl SenderConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, SenderError> {
        toml::from_str(contents).map_err(|e| SenderError::ConfigLoad(e.to_string()))
    }

    /// Read and parse a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SenderError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading sender configuration");
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SenderError::ConfigLoad(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&contents)
    }

    /// Resolve every entry, preserving order.
    pub fn entries(&self) -> Result<Vec<(ProviderKind, ProviderConfiguration)>, SenderError> {
        self.providers.iter().map(ProviderEntry::resolve).collect()
    }
}
