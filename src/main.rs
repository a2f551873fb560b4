//! TicketAssist - ticket board and local LLM assistant
//!
#![doc = "TicketAssist - ticket board and local LLM assistant"]
#![doc = "Main entry point for the TicketAssist CLI."]

use anyhow::Result;
use std::path::Path;

use ticketassist::cli::{Cli, Commands};
use ticketassist::commands;
use ticketassist::config::Config;
use ticketassist::logging;
use ticketassist::session::SessionContext;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Load configuration first; it decides the log level
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Initialize tracing (`--verbose` and DEBUG_MODE both land in app.debug)
    logging::init_logging(config.app.debug, cli.json_logs)?;
    if !Path::new(config_path).exists() {
        tracing::warn!("Config file not found at {}, using defaults", config_path);
    }
    config.log_configuration();

    // Validate configuration
    config.validate()?;

    let mut session = SessionContext::new(&config);
    commands::login::login(&config, &mut session, cli.user, cli.password)?;

    // Execute command
    match cli.command {
        Commands::Tickets(args) => {
            tracing::info!("Starting ticket board");
            commands::tickets::run_tickets(&mut session.tickets, args)?;
            Ok(())
        }
        Commands::Chat { model } => {
            tracing::info!("Starting interactive chat mode");
            commands::chat::run_chat(&config, &mut session, model).await?;
            Ok(())
        }
        Commands::History { command } => {
            tracing::info!("Starting history command");
            commands::history::handle_history(&config, command)?;
            Ok(())
        }
    }
}
