use courier_sender::EmailSender;

use crate::OutputFormat;

pub fn run(sender: &EmailSender, format: &OutputFormat) -> anyhow::Result<()> {
    let providers = sender.providers();
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&providers)?);
        }
        OutputFormat::Text => {
            if providers.is_empty() {
                println!("No providers configured.");
            }
            for (priority, kind) in providers.iter().enumerate() {
                println!("  {} | {kind}", priority + 1);
            }
        }
    }
    Ok(())
}
