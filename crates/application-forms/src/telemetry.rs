//! Tracing setup for the command line shell.

use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

use crate::config::TelemetryConfig;

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("APP_LOG_LEVEL '{value}' is not a valid tracing filter")]
    InvalidLevel {
        value: String,
        #[source]
        source: ParseError,
    },
    #[error("tracing subscriber could not be installed: {0}")]
    Subscriber(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Installs the global subscriber on stderr, leaving stdout to command output.
///
/// A usable `RUST_LOG` overrides `log_level`; colours follow `config.ansi`.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(directives.as_deref(), &config.log_level)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(config.ansi)
        .compact()
        .try_init()
        .map_err(TelemetryError::Subscriber)
}

/// Prefers non-blank, parseable `directives`; otherwise `log_level` must parse.
fn build_filter(directives: Option<&str>, log_level: &str) -> Result<EnvFilter, TelemetryError> {
    if let Some(filter) = directives
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .and_then(|raw| EnvFilter::try_new(raw).ok())
    {
        return Ok(filter);
    }

    EnvFilter::try_new(log_level).map_err(|source| TelemetryError::InvalidLevel {
        value: log_level.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_directives_win_when_valid() {
        let filter = build_filter(Some("application_forms=trace"), "info").expect("valid filter");

        assert_eq!(filter.to_string(), "application_forms=trace");
    }

    #[test]
    fn blank_or_broken_directives_fall_back_to_log_level() {
        for directives in [None, Some("  "), Some("forms=loud")] {
            let filter = build_filter(directives, "warn").expect("fallback level is valid");

            assert_eq!(filter.to_string(), "warn", "directives {directives:?}");
        }
    }

    #[test]
    fn invalid_log_level_is_reported() {
        match build_filter(None, "forms=loud") {
            Err(TelemetryError::InvalidLevel { value, .. }) => assert_eq!(value, "forms=loud"),
            other => panic!("expected invalid level, got {other:?}"),
        }
    }
}
