use std::env;
use std::fmt;
use std::time::Duration;

use url::Url;

use crate::dates::{DateConversionError, ServerDateConverter, SERVER_DATE_FORMAT};
use crate::resource::transport::with_trailing_slash;

const DEFAULT_BASE_URL: &str = "http://localhost:8080/";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Distinguishes runtime behavior for different stages of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the client and its command line shell.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub api: ApiConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup instead of the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment =
            AppEnvironment::from_str(&lookup("APP_ENV").unwrap_or_else(|| "development".to_string()));

        let raw_base_url =
            lookup("APP_API_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = parse_base_url(&raw_base_url)?;

        let timeout_secs = lookup("APP_HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|| DEFAULT_TIMEOUT_SECS.to_string())
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or(ConfigError::InvalidTimeout)?;

        let date_format =
            lookup("APP_SERVER_DATE_FORMAT").unwrap_or_else(|| SERVER_DATE_FORMAT.to_string());
        ServerDateConverter::new(date_format.clone())
            .map_err(|source| ConfigError::InvalidDateFormat { source })?;

        let log_level = lookup("APP_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        Ok(Self {
            environment,
            api: ApiConfig {
                base_url,
                timeout: Duration::from_secs(timeout_secs),
                date_format,
            },
            telemetry: TelemetryConfig {
                log_level,
                ansi: environment == AppEnvironment::Development,
            },
        })
    }
}

/// Where the REST backend lives and how the client talks to it.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: Url,
    pub timeout: Duration,
    pub date_format: String,
}

impl ApiConfig {
    pub fn set_base_url(&mut self, raw: &str) -> Result<(), ConfigError> {
        self.base_url = parse_base_url(raw)?;
        Ok(())
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    /// Coloured output; only wanted on a developer terminal.
    pub ansi: bool,
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidBaseUrl {
        value: raw.to_string(),
        source,
    })?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::NotABase {
            value: raw.to_string(),
        });
    }
    Ok(with_trailing_slash(url))
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidBaseUrl {
        value: String,
        source: url::ParseError,
    },
    NotABase {
        value: String,
    },
    InvalidTimeout,
    InvalidDateFormat {
        source: DateConversionError,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidBaseUrl { value, .. } => {
                write!(f, "APP_API_BASE_URL '{}' is not a valid URL", value)
            }
            ConfigError::NotABase { value } => {
                write!(f, "APP_API_BASE_URL '{}' cannot be used as a base URL", value)
            }
            ConfigError::InvalidTimeout => {
                write!(f, "APP_HTTP_TIMEOUT_SECS must be a positive number of seconds")
            }
            ConfigError::InvalidDateFormat { source } => {
                write!(f, "APP_SERVER_DATE_FORMAT is unusable: {}", source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidBaseUrl { source, .. } => Some(source),
            ConfigError::InvalidDateFormat { source } => Some(source),
            ConfigError::NotABase { .. } | ConfigError::InvalidTimeout => None,
        }
    }
}
