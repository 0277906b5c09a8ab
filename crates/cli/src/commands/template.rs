use clap::{Args, Subcommand};
use courier_core::Template;
use courier_provider::ProviderKind;
use courier_sender::EmailSender;

use super::read_text;

#[derive(Args, Debug)]
pub struct TemplateArgs {
    #[command(subcommand)]
    pub command: TemplateCommand,
}

#[derive(Args, Debug)]
pub struct TemplateContent {
    /// Template name.
    #[arg(long)]
    pub name: String,
    /// Subject line, may contain `{{key}}` placeholders.
    #[arg(long)]
    pub subject: String,
    /// HTML body (string or @file path).
    #[arg(long)]
    pub html: String,
    /// Plain-text body (string or @file path).
    #[arg(long)]
    pub text: String,
}

impl TemplateContent {
    fn template(&self) -> anyhow::Result<Template> {
        Ok(Template::new(
            &self.name,
            &self.subject,
            read_text(&self.html)?,
            read_text(&self.text)?,
        )?)
    }
}

#[derive(Subcommand, Debug)]
pub enum TemplateCommand {
    /// Create a template.
    Create {
        /// Provider that stores the template (`ses`, `local`, `fake`).
        #[arg(long)]
        provider: ProviderKind,
        #[command(flatten)]
        content: TemplateContent,
        /// Overwrite an existing template of the same name.
        #[arg(long)]
        update_if_exists: bool,
    },
    /// Overwrite an existing template.
    Update {
        /// Provider that stores the template.
        #[arg(long)]
        provider: ProviderKind,
        #[command(flatten)]
        content: TemplateContent,
    },
    /// Delete a template.
    Delete {
        /// Provider that stores the template.
        #[arg(long)]
        provider: ProviderKind,
        /// Template name.
        name: String,
    },
}

pub async fn run(sender: &EmailSender, args: &TemplateArgs) -> anyhow::Result<()> {
    match &args.command {
        TemplateCommand::Create {
            provider,
            content,
            update_if_exists,
        } => {
            let template = content.template()?;
            sender
                .create_template(*provider, &template, *update_if_exists)
                .await?;
            println!("Template '{}' created on {provider}.", template.name());
        }
        TemplateCommand::Update { provider, content } => {
            let template = content.template()?;
            sender.update_template(*provider, &template).await?;
            println!("Template '{}' updated on {provider}.", template.name());
        }
        TemplateCommand::Delete { provider, name } => {
            sender.delete_template(*provider, name).await?;
            println!("Template '{name}' deleted from {provider}.");
        }
    }
    Ok(())
}
