//! Command-line interface definition for TicketAssist
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for the ticket board, chat and history management.

use crate::config::MAX_TICKET_COUNT;
use clap::builder::RangedU64ValueParser;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// TicketAssist - ticket board and local LLM assistant
///
/// Browse synthetic support tickets and chat with a locally hosted
/// language model.
#[derive(Parser, Debug, Clone)]
#[command(name = "ticketassist")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Username to log in with (prompted when omitted)
    #[arg(short, long, env = "TICKETASSIST_USER")]
    pub user: Option<String>,

    /// Password to log in with (prompted when omitted)
    #[arg(short, long, env = "TICKETASSIST_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Override the chat history database path
    #[arg(long)]
    pub history_path: Option<PathBuf>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for TicketAssist
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Generate a ticket batch and show the filtered board
    Tickets(TicketArgs),

    /// Start an interactive chat with the language model
    Chat {
        /// Override the model from config
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Manage the stored chat transcript
    History {
        /// History subcommand
        #[command(subcommand)]
        command: HistoryCommand,
    },
}

/// Options for the ticket board
#[derive(clap::Args, Debug, Clone, Default, PartialEq)]
pub struct TicketArgs {
    /// Number of tickets to generate (defaults to the configured count)
    #[arg(
        short = 'n',
        long,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..=MAX_TICKET_COUNT as u64)
    )]
    pub count: Option<usize>,

    /// Keep only these project keys (repeatable)
    #[arg(long = "project")]
    pub projects: Vec<String>,

    /// Keep only these priorities (repeatable)
    #[arg(long = "priority")]
    pub priorities: Vec<String>,

    /// Keep only these statuses (repeatable)
    #[arg(long = "status")]
    pub statuses: Vec<String>,

    /// Free-text search over title, description, key and answer
    #[arg(short, long)]
    pub search: Option<String>,

    /// Sort order label, e.g. "Priority ↓"
    #[arg(long, default_value = "Key A → Z")]
    pub sort: String,

    /// Print full ticket details after the table
    #[arg(short, long)]
    pub details: bool,

    /// Print the board as JSON instead of a table
    #[arg(long)]
    pub json: bool,

    /// Write the filtered tickets to a CSV file
    #[arg(long, value_name = "PATH")]
    pub export_csv: Option<PathBuf>,
}

/// History management subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum HistoryCommand {
    /// Print the stored transcript
    Show,
    /// Delete the stored transcript
    Clear,
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
