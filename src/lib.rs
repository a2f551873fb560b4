//! TicketAssist - ticket board and local LLM assistant library
//!
//! This library provides the core functionality behind the `ticketassist`
//! CLI: a synthetic ticket generator with a filter/sort/statistics
//! pipeline, a persistent chat transcript, and a streaming client for a
//! locally hosted language model.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `tickets`: Ticket model, generator, filter/sort pipeline and CSV export
//! - `chat`: Chat messages, transcript storage and the LLM streaming client
//! - `auth`: Credential check and login state
//! - `session`: Per-session state and user-action handlers
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use ticketassist::tickets::{apply_filters, apply_sorting, TicketFilters, TicketGenerator};
//!
//! fn main() -> anyhow::Result<()> {
//!     let batch: Vec<_> = TicketGenerator::default().generate(25)?.into_values().collect();
//!     let filters = TicketFilters::default();
//!     let visible = apply_filters(&batch, &filters, "");
//!     let sorted = apply_sorting(&visible, "Priority ↓");
//!     println!("{} tickets", sorted.len());
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod chat;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod session;
pub mod tickets;

// Re-export commonly used types
pub use config::Config;
pub use error::{Result, TicketAssistError};
pub use session::SessionContext;

#[cfg(test)]
pub mod test_utils;
