//! Courier CLI
//!
//! Sends email and manages templates through the providers listed in a
//! Courier TOML configuration file.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use courier_sender::{EmailSender, SenderConfig};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt};

/// Courier CLI: send email with provider failover.
#[derive(Parser, Debug)]
#[command(name = "courier", version, about)]
struct Cli {
    /// Provider configuration file.
    #[arg(
        long,
        env = "COURIER_CONFIG",
        default_value = "courier.toml",
        global = true
    )]
    config: PathBuf,

    /// Output format.
    #[arg(long, default_value = "text", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send one email.
    Send(commands::send::SendArgs),
    /// Send one templated email.
    SendTemplated(commands::send::SendTemplatedArgs),
    /// Send every email in a JSON file.
    Bulk(commands::bulk::BulkArgs),
    /// Manage templates on one provider.
    Template(commands::template::TemplateArgs),
    /// List configured providers in failover order.
    Providers,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = SenderConfig::load(&cli.config)?;
    let sender = EmailSender::from_entries(config.entries()?).await?;
    debug!(providers = ?sender.providers(), config = %cli.config.display(), "sender ready");

    match cli.command {
        Command::Send(args) => commands::send::run(&sender, &args, &cli.format).await,
        Command::SendTemplated(args) => {
            commands::send::run_templated(&sender, &args, &cli.format).await
        }
        Command::Bulk(args) => commands::bulk::run(&sender, &args, &cli.format).await,
        Command::Template(args) => commands::template::run(&sender, &args).await,
        Command::Providers => commands::providers::run(&sender, &cli.format),
    }
}
