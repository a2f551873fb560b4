//! Tracing subscriber setup
//!
//! Logs go to stderr so that `--json` ticket output on stdout stays
//! machine-readable. `RUST_LOG` takes precedence over the flag-derived
//! default filter.

use anyhow::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter directive used when `RUST_LOG` is not set
pub fn default_directive(debug: bool) -> &'static str {
    if debug {
        "ticketassist=debug"
    } else {
        "ticketassist=info"
    }
}

/// Install the global subscriber
///
/// # Arguments
///
/// * `debug` - Raise the default level to `debug` (`app.debug`, set by
///   `--verbose` or `DEBUG_MODE`)
/// * `json` - Emit JSON lines instead of human-readable output
///
/// # Errors
///
/// Returns error if the default directive is invalid or a global subscriber
/// is already installed
pub fn init_logging(debug: bool, json: bool) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive(debug)))?;

    let registry = tracing_subscriber::registry().with(env_filter);

    if json {
        let layer = fmt::layer()
            .json()
            .with_current_span(true)
            .with_writer(std::io::stderr);
        registry.with(layer).try_init()?;
    } else {
        let layer = fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_writer(std::io::stderr);
        registry.with(layer).try_init()?;
    }

    Ok(())
}
