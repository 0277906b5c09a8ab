//! Concrete email integrations for Courier.
//!
//! - [`SesEmailIntegration`] sends through Amazon SES v2 and keeps templates
//!   in SES.
//! - [`LocalEmailIntegration`] writes each email as a text block to a file or
//!   stdout and keeps templates in memory.
//!
//! The in-memory test double lives in `courier-provider` as
//! `FakeEmailIntegration`.

pub mod backend;
pub mod local;
pub mod render;
pub mod ses;

pub use backend::SesBackend;
pub use local::LocalEmailIntegration;
pub use render::{RenderedTemplate, render_template};
pub use ses::{DEFAULT_RECIPIENT_LIMIT, SesEmailIntegration};
