//! Email value objects for Courier.
//!
//! [`Email`], [`TemplatedEmail`] and [`Template`] validate themselves on
//! construction and are immutable afterwards, so every integration can assume
//! well-formed input.

pub mod address;
pub mod email;
pub mod error;
pub mod template;

pub use address::{invalid_addresses, is_valid_address};
pub use email::{Email, Envelope, TemplatedEmail};
pub use error::ValidationError;
pub use template::Template;
