use clap::Args;
use courier_core::{Email, TemplatedEmail};
use courier_sender::EmailSender;

use super::{EnvelopeArgs, read_text};
use crate::OutputFormat;

#[derive(Args, Debug)]
pub struct SendArgs {
    #[command(flatten)]
    pub envelope: EnvelopeArgs,
    /// Subject line.
    #[arg(long)]
    pub subject: String,
    /// HTML body (string or @file path).
    #[arg(long)]
    pub html: String,
    /// Plain-text body (string or @file path).
    #[arg(long)]
    pub text: String,
}

#[derive(Args, Debug)]
pub struct SendTemplatedArgs {
    #[command(flatten)]
    pub envelope: EnvelopeArgs,
    /// Template name.
    #[arg(long)]
    pub template: String,
    /// Template data as a JSON object (string or @file path).
    #[arg(long, default_value = "{}")]
    pub data: String,
}

pub async fn run(
    sender: &EmailSender,
    args: &SendArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let email = Email::new(
        args.envelope.envelope(),
        &args.subject,
        read_text(&args.html)?,
        read_text(&args.text)?,
    )?;
    sender.send_email(&email).await?;
    print_sent(&email.id().to_string(), email.to(), format)
}

pub async fn run_templated(
    sender: &EmailSender,
    args: &SendTemplatedArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let email = TemplatedEmail::new(
        args.envelope.envelope(),
        &args.template,
        read_text(&args.data)?,
    )?;
    sender.send_templated_email(&email).await?;
    print_sent(&email.id().to_string(), email.to(), format)
}

fn print_sent(id: &str, to: &[String], format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let out = serde_json::json!({ "id": id, "to": to, "sent": true });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Text => {
            println!("Sent email {id} to {}", to.join(", "));
        }
    }
    Ok(())
}
