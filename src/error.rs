//! Error types for TicketAssist
//!
//! This module defines the error types used by the ambient layers of the
//! application (configuration, authentication, CLI plumbing), using
//! `thiserror` for ergonomic error handling.
//!
//! The ticket pipeline and the chat session protocol never surface these to
//! their callers: storage and inference failures are logged and degraded to
//! safe defaults inside those modules.

use thiserror::Error;

/// Main error type for TicketAssist operations
#[derive(Error, Debug)]
pub enum TicketAssistError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Login failed or was not attempted
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Chat history storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Inference service errors (unreachable host, bad status, malformed stream)
    #[error("Inference error: {0}")]
    Inference(String),

    /// A ticket record violated a construction invariant
    #[error("Invalid ticket {key}: {reason}")]
    InvalidTicket {
        /// Key of the offending ticket
        key: String,
        /// Which invariant was violated
        reason: String,
    },

    /// Ticket export errors
    #[error("Export error: {0}")]
    Export(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Embedded key-value store errors
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),

    /// CSV writer errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type alias for TicketAssist operations
///
/// Uses `anyhow::Error` so callers can attach context while still being able
/// to downcast to [`TicketAssistError`].
pub type Result<T> = anyhow::Result<T>;
