pub mod bulk;
pub mod providers;
pub mod send;
pub mod template;

use clap::Args;
use courier_core::Envelope;

/// Sender and recipient flags shared by the send commands.
#[derive(Args, Debug)]
pub struct EnvelopeArgs {
    /// Sender address.
    #[arg(long)]
    pub from: String,
    /// Recipient addresses (comma separated or repeated).
    #[arg(long, value_delimiter = ',', required = true)]
    pub to: Vec<String>,
    /// Carbon-copy addresses.
    #[arg(long, value_delimiter = ',')]
    pub cc: Vec<String>,
    /// Blind carbon-copy addresses.
    #[arg(long, value_delimiter = ',')]
    pub bcc: Vec<String>,
    /// Reply-to addresses.
    #[arg(long, value_delimiter = ',')]
    pub reply_to: Vec<String>,
}

impl EnvelopeArgs {
    pub fn envelope(&self) -> Envelope {
        Envelope::new(self.from.clone(), self.to.clone())
            .with_cc(self.cc.clone())
            .with_bcc(self.bcc.clone())
            .with_reply_to(self.reply_to.clone())
    }
}

/// Read an argument that is either literal text or `@path` to a file.
pub fn read_text(input: &str) -> anyhow::Result<String> {
    match input.strip_prefix('@') {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => Ok(input.to_owned()),
    }
}
