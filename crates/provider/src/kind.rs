use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::IntegrationError;

/// Identity of an email backend.
///
/// Used as the key that associates a configuration with an integration and
/// to address template management calls at one specific backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Amazon SES v2.
    Ses,
    /// Local file or stdout logger.
    Local,
    /// In-memory test double.
    Fake,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ses => f.write_str("ses"),
            Self::Local => f.write_str("local"),
            Self::Fake => f.write_str("fake"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = IntegrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ses" | "aws" | "aws-ses" => Ok(Self::Ses),
            "local" => Ok(Self::Local),
            "fake" => Ok(Self::Fake),
            other => Err(IntegrationError::Configuration(format!(
                "unknown email provider: {other}"
            ))),
        }
    }
}

/// SES-specific settings.
///
/// Region and credentials come from the ambient AWS environment unless
/// overridden here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SesOptions {
    /// Configuration set used for delivery tracking.
    #[serde(default)]
    pub configuration_set: Option<String>,

    /// Tags attached to every outgoing message.
    #[serde(default)]
    pub tags: Option<BTreeMap<String, String>>,

    /// Region override. Falls back to the environment when absent.
    #[serde(default)]
    pub region: Option<String>,

    /// Endpoint override for local development (e.g. `LocalStack`).
    #[serde(default)]
    pub endpoint_url: Option<String>,
}

impl SesOptions {
    /// Set the configuration set name.
    #[must_use]
    pub fn with_configuration_set(mut self, name: impl Into<String>) -> Self {
        self.configuration_set = Some(name.into());
        self
    }

    /// Add a message tag.
    #[must_use]
    pub fn with_tag(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Set the region override.
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Set the endpoint URL override.
    #[must_use]
    pub fn with_endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.endpoint_url = Some(url.into());
        self
    }
}

/// Local logger settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalOptions {
    /// File the log is appended to. Stdout is used when absent.
    #[serde(default)]
    pub output_file: Option<PathBuf>,
}

impl LocalOptions {
    /// Set the output file.
    #[must_use]
    pub fn with_output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_file = Some(path.into());
        self
    }
}

/// Per-provider optional settings.
///
/// `Default` is valid for every provider and means "no custom settings".
/// The specific variants are only valid for their own [`ProviderKind`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ProviderConfiguration {
    #[default]
    Default,
    Ses(SesOptions),
    Local(LocalOptions),
}

impl ProviderConfiguration {
    /// Returns `true` if this configuration may be used for `kind`.
    pub fn applies_to(&self, kind: ProviderKind) -> bool {
        match self {
            Self::Default => true,
            Self::Ses(_) => kind == ProviderKind::Ses,
            Self::Local(_) => kind == ProviderKind::Local,
        }
    }

    /// SES settings, or the empty defaults.
    pub fn ses_options(&self) -> SesOptions {
        match self {
            Self::Ses(options) => options.clone(),
            _ => SesOptions::default(),
        }
    }

    /// Local settings, or the empty defaults.
    pub fn local_options(&self) -> LocalOptions {
        match self {
            Self::Local(options) => options.clone(),
            _ => LocalOptions::default(),
        }
    }
}
