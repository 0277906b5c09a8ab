//! Failover email sending for Courier.
//!
//! [`EmailSender`] holds an ordered list of email integrations. Single and
//! bulk sends try each integration in turn until one accepts the email;
//! template management is addressed to one named provider. Provider lists
//! can be loaded from TOML with [`SenderConfig`].

pub mod config;
pub mod error;
pub mod sender;

pub use config::{ProviderEntry, SenderConfig};
pub use error::SenderError;
pub use sender::EmailSender;
