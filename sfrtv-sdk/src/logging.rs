//! Logging setup for hosts embedding the SDK
//!
//! The library only emits `tracing` events. Binaries that have no subscriber
//! of their own can install one here, scoped to the three layers of this
//! workspace so that other crates in the host stay quiet.
//!
//! `SFRTV_LOG` selects what is shown:
//!
//! - unset: nothing is installed
//! - a bare level (`info`, `debug`, `trace`): that level for the SDK, the
//!   command layer and the transport
//! - anything else: used as an `EnvFilter` directive string verbatim,
//!   e.g. `sfrtv_sdk=debug,stb_transport=trace`

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Environment variable read by [`init_logging_from_env`]
pub const LOG_ENV: &str = "SFRTV_LOG";

/// Targets emitted by the workspace crates
const TARGETS: [&str; 3] = ["sfrtv_sdk", "sfrtv_api", "stb_transport"];

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Invalid log filter '{directives}': {reason}")]
    Filter { directives: String, reason: String },

    #[error("Failed to initialize tracing subscriber: {0}")]
    TracingInit(String),
}

/// Install a compact stderr subscriber showing SDK events at `level`
pub fn init_logging(level: Level) -> Result<(), LoggingError> {
    install(&scoped_directives(level))
}

/// Install a subscriber according to `SFRTV_LOG`
///
/// Returns whether a subscriber was installed.
pub fn init_logging_from_env() -> Result<bool, LoggingError> {
    match std::env::var(LOG_ENV) {
        Ok(value) if !value.trim().is_empty() => {
            install(&directives_for(value.trim()))?;
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// Filter directives for an `SFRTV_LOG` value
fn directives_for(value: &str) -> String {
    match value.parse::<Level>() {
        Ok(level) => scoped_directives(level),
        Err(_) => value.to_string(),
    }
}

fn scoped_directives(level: Level) -> String {
    let level = level.as_str().to_ascii_lowercase();
    TARGETS
        .iter()
        .map(|target| format!("{}={}", target, level))
        .collect::<Vec<_>>()
        .join(",")
}

fn filter(directives: &str) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_new(directives).map_err(|e| LoggingError::Filter {
        directives: directives.to_string(),
        reason: e.to_string(),
    })
}

fn install(directives: &str) -> Result<(), LoggingError> {
    // Targets tell the SDK, command and transport layers apart
    Registry::default()
        .with(fmt::layer().with_target(true).compact().with_writer(std::io::stderr))
        .with(filter(directives)?)
        .try_init()
        .map_err(|e| LoggingError::TracingInit(e.to_string()))
}
