//! Configuration management for TicketAssist
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, Docker-style secret
//! files, and CLI overrides (applied in that order).

use crate::error::{Result, TicketAssistError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory scanned for secret files when `TICKETASSIST_SECRETS_DIR` is unset
pub const DEFAULT_SECRETS_DIR: &str = "/run/secrets";

/// Largest ticket batch accepted from config or the command line
pub const MAX_TICKET_COUNT: usize = 1000;

const MASK: &str = "********";

/// Main configuration structure for TicketAssist
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Application-level settings
    #[serde(default)]
    pub app: AppConfig,
    /// Login credentials checked by the authenticator
    #[serde(default)]
    pub auth: AuthConfig,
    /// Inference service and sampling settings
    #[serde(default)]
    pub llm: LlmConfig,
    /// Chat history storage settings
    #[serde(default)]
    pub storage: StorageConfig,
    /// Ticket board settings
    #[serde(default)]
    pub tickets: TicketsConfig,
}

/// Application-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Title printed in banners
    #[serde(default = "default_app_title")]
    pub title: String,

    /// Enables debug-level logging
    #[serde(default)]
    pub debug: bool,
}

fn default_app_title() -> String {
    "TicketAssist".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: default_app_title(),
            debug: false,
        }
    }
}

/// Credentials for the single dashboard user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Expected username
    #[serde(default = "default_auth_value")]
    pub username: String,

    /// Expected password
    #[serde(default = "default_auth_value")]
    pub password: String,
}

fn default_auth_value() -> String {
    "admin".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            username: default_auth_value(),
            password: default_auth_value(),
        }
    }
}

/// Inference service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model identifier passed to the chat endpoint
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Maximum number of tokens to generate (`num_predict`)
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Nucleus sampling parameter
    #[serde(default = "default_top_p")]
    pub top_p: f64,

    /// Base address of the inference service
    #[serde(default = "default_llm_host")]
    pub host: String,

    /// Reachability probe settings
    #[serde(default)]
    pub health_check: HealthCheckConfig,
}

fn default_llm_model() -> String {
    "llama3.1:8b".to_string()
}

fn default_temperature() -> f64 {
    0.1
}

fn default_max_tokens() -> u32 {
    512
}

fn default_top_p() -> f64 {
    0.9
}

fn default_llm_host() -> String {
    "http://localhost:11434".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_llm_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            top_p: default_top_p(),
            host: default_llm_host(),
            health_check: HealthCheckConfig::default(),
        }
    }
}

/// Bounded retry loop used before every generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckConfig {
    /// Maximum number of probes before giving up
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Pause between failed probes (milliseconds)
    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,

    /// Timeout applied to each probe request (milliseconds)
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_max_retries() -> u32 {
    10
}

fn default_retry_interval_ms() -> u64 {
    5_000
}

fn default_request_timeout_ms() -> u64 {
    5_000
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_interval_ms: default_retry_interval_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// Chat history storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Location of the key-value store holding the transcript
    #[serde(default = "default_history_path")]
    pub history_path: PathBuf,
}

fn default_history_path() -> PathBuf {
    PathBuf::from("data/chat_history")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            history_path: default_history_path(),
        }
    }
}

/// Ticket board configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketsConfig {
    /// Batch size generated when no `--count` is given
    #[serde(default = "default_ticket_count")]
    pub default_count: usize,

    /// Prefix used for ticket and comment links
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_ticket_count() -> usize {
    20
}

fn default_base_url() -> String {
    "localhost:8080/browse".to_string()
}

impl Default for TicketsConfig {
    fn default() -> Self {
        Self {
            default_count: default_ticket_count(),
            base_url: default_base_url(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment, secret and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        // A missing file means defaults; the caller reports it once logging is up
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            Self::default()
        };

        config.apply_env_vars();

        let secrets_dir = std::env::var("TICKETASSIST_SECRETS_DIR")
            .unwrap_or_else(|_| DEFAULT_SECRETS_DIR.to_string());
        config.apply_secrets(Path::new(&secrets_dir));

        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| TicketAssistError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| TicketAssistError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(title) = std::env::var("APP_TITLE") {
            self.app.title = title;
        }

        if let Ok(debug) = std::env::var("DEBUG_MODE") {
            self.app.debug = parse_bool(&debug);
        }

        if let Ok(user) = std::env::var("STREAMLIT_AUTH_USER") {
            self.auth.username = user;
        }

        if let Ok(password) = std::env::var("STREAMLIT_AUTH_PASSWORD") {
            self.auth.password = password;
        }

        if let Ok(model) = std::env::var("LLM_MODEL") {
            self.llm.model = model;
        }

        if let Ok(host) = std::env::var("OLLAMA_API_HOST") {
            self.llm.host = host;
        }

        parse_env_into("LLM_TEMPERATURE", &mut self.llm.temperature);
        parse_env_into("LLM_MAX_TOKENS", &mut self.llm.max_tokens);
        parse_env_into("LLM_TOP_P", &mut self.llm.top_p);
        parse_env_into(
            "LLM_HEALTH_MAX_RETRIES",
            &mut self.llm.health_check.max_retries,
        );
        parse_env_into(
            "LLM_HEALTH_RETRY_INTERVAL_MS",
            &mut self.llm.health_check.retry_interval_ms,
        );
        parse_env_into("TICKET_COUNT", &mut self.tickets.default_count);

        if let Ok(path) = std::env::var("CHAT_HISTORY_PATH") {
            self.storage.history_path = PathBuf::from(path);
        }
    }

    /// Read credentials from secret files in `dir`, when present
    ///
    /// Each file's contents (trimmed) replace the matching credential.
    /// Missing directories and files are ignored; unreadable files are logged.
    pub fn apply_secrets(&mut self, dir: &Path) {
        if !dir.is_dir() {
            return;
        }

        let mapping: [(&str, &mut String); 2] = [
            ("streamlit_auth_user", &mut self.auth.username),
            ("streamlit_auth_password", &mut self.auth.password),
        ];

        for (file_name, target) in mapping {
            let secret_path = dir.join(file_name);
            if !secret_path.exists() {
                continue;
            }
            match std::fs::read_to_string(&secret_path) {
                Ok(value) => {
                    *target = value.trim().to_string();
                    tracing::info!("Loaded {} from secret file", file_name);
                }
                Err(e) => {
                    tracing::error!("Error reading secret {}: {}", file_name, e);
                }
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            self.app.debug = true;
        }

        if let Some(path) = &cli.history_path {
            self.storage.history_path = path.clone();
        }
    }

    /// Copy of this configuration with secrets masked, suitable for logging
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.auth.password = MASK.to_string();
        copy
    }

    /// Log the effective configuration with secrets masked
    ///
    /// Called once the subscriber is installed, since logging is configured
    /// from the loaded values.
    pub fn log_configuration(&self) {
        tracing::info!("Application configuration: {:?}", self.redacted());
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any value is outside its accepted range
    pub fn validate(&self) -> Result<()> {
        if self.auth.username.trim().is_empty() {
            return Err(TicketAssistError::Config("auth.username cannot be empty".to_string()).into());
        }

        if self.llm.model.trim().is_empty() {
            return Err(TicketAssistError::Config("llm.model cannot be empty".to_string()).into());
        }

        if !(self.llm.temperature > 0.0 && self.llm.temperature <= 5.0) {
            return Err(TicketAssistError::Config(
                "llm.temperature must be in (0.0, 5.0]".to_string(),
            )
            .into());
        }

        if !(self.llm.top_p > 0.0 && self.llm.top_p <= 1.0) {
            return Err(
                TicketAssistError::Config("llm.top_p must be in (0.0, 1.0]".to_string()).into(),
            );
        }

        if !(64..=4096).contains(&self.llm.max_tokens) {
            return Err(TicketAssistError::Config(
                "llm.max_tokens must be between 64 and 4096".to_string(),
            )
            .into());
        }

        if self.llm.health_check.max_retries == 0 {
            return Err(TicketAssistError::Config(
                "llm.health_check.max_retries must be greater than 0".to_string(),
            )
            .into());
        }

        url::Url::parse(&self.llm.host).map_err(|e| {
            TicketAssistError::Config(format!("llm.host is not a valid URL ({}): {}", self.llm.host, e))
        })?;

        if self.tickets.default_count == 0 || self.tickets.default_count > MAX_TICKET_COUNT {
            return Err(TicketAssistError::Config(
                format!(
                    "tickets.default_count must be between 1 and {}",
                    MAX_TICKET_COUNT
                ),
            )
            .into());
        }

        Ok(())
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "yes" | "1")
}

fn parse_env_into<T: std::str::FromStr>(name: &str, target: &mut T) {
    if let Ok(raw) = std::env::var(name) {
        match raw.parse() {
            Ok(value) => *target = value,
            Err(_) => tracing::warn!("Invalid {}: {}, using default", name, raw),
        }
    }
}
