use std::collections::HashMap;
use std::hash::Hash;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::Args;
use courier_core::{Email, Envelope, TemplatedEmail};
use courier_sender::EmailSender;
use serde::Deserialize;

use crate::OutputFormat;

#[derive(Args, Debug)]
pub struct BulkArgs {
    /// JSON file holding an array of emails.
    pub file: PathBuf,
    /// Entries are templated emails (`template_name`, `template_data`).
    #[arg(long)]
    pub templated: bool,
}

/// One entry of a bulk file.
///
/// ```json
/// { "sender": "noreply@example.com", "to": ["a@example.com"],
///   "subject": "Hi", "html_body": "<p>Hi</p>", "text_body": "Hi" }
/// ```
#[derive(Debug, Deserialize)]
struct BulkEmail {
    #[serde(flatten)]
    envelope: Envelope,
    subject: String,
    html_body: String,
    text_body: String,
}

#[derive(Debug, Deserialize)]
struct BulkTemplatedEmail {
    #[serde(flatten)]
    envelope: Envelope,
    template_name: String,
    /// A JSON object, or a string holding one.
    #[serde(default)]
    template_data: Option<serde_json::Value>,
}

fn parse_emails(contents: &str) -> anyhow::Result<Vec<Email>> {
    let entries: Vec<BulkEmail> = serde_json::from_str(contents)?;
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            Email::new(
                entry.envelope,
                entry.subject,
                entry.html_body,
                entry.text_body,
            )
            .map_err(|e| anyhow!("entry {index}: {e}"))
        })
        .collect()
}

fn parse_templated(contents: &str) -> anyhow::Result<Vec<TemplatedEmail>> {
    let entries: Vec<BulkTemplatedEmail> = serde_json::from_str(contents)?;
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let data = match entry.template_data {
                None => "{}".to_owned(),
                Some(serde_json::Value::String(raw)) => raw,
                Some(value) => value.to_string(),
            };
            TemplatedEmail::new(entry.envelope, entry.template_name, data)
                .map_err(|e| anyhow!("entry {index}: {e}"))
        })
        .collect()
}

pub async fn run(
    sender: &EmailSender,
    args: &BulkArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let contents = std::fs::read_to_string(&args.file)?;
    let outcomes = if args.templated {
        let emails = parse_templated(&contents)?;
        let results = sender.send_bulk_templated_emails(&emails).await;
        in_input_order(&emails, &results, TemplatedEmail::to)
    } else {
        let emails = parse_emails(&contents)?;
        let results = sender.send_bulk_emails(&emails).await;
        in_input_order(&emails, &results, Email::to)
    };

    let failed = outcomes.iter().filter(|(_, sent)| !sent).count();
    match format {
        OutputFormat::Json => {
            let out: Vec<_> = outcomes
                .iter()
                .map(|(to, sent)| serde_json::json!({ "to": to, "sent": sent }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Text => {
            for (index, (to, sent)) in outcomes.iter().enumerate() {
                let status = if *sent { "sent" } else { "FAILED" };
                println!("  {index:>3} | {status:<6} | {}", to.join(", "));
            }
            println!("{} of {} emails sent.", outcomes.len() - failed, outcomes.len());
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} email(s) could not be sent on any provider");
    }
    Ok(())
}

fn in_input_order<T: Eq + Hash>(
    emails: &[T],
    results: &HashMap<T, bool>,
    to: fn(&T) -> &[String],
) -> Vec<(Vec<String>, bool)> {
    emails
        .iter()
        .map(|email| {
            (
                to(email).to_vec(),
                results.get(email).copied().unwrap_or(false),
            )
        })
        .collect()
}
