use std::env;

use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;

pub const LOG_ENV: &str = "AFFORD_LOG";
const DEFAULT_FILTER: &str = "info";

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid log level/filter '{value}': unable to build EnvFilter")]
    EnvFilter {
        value: String,
        #[source]
        source: ParseError,
    },
    #[error("telemetry error: {0}")]
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

/// `RUST_LOG` wins when it parses; otherwise `AFFORD_LOG`, otherwise `info`.
pub fn resolve_filter(configured: Option<&str>) -> Result<EnvFilter, TelemetryError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let value = configured.unwrap_or(DEFAULT_FILTER);
    EnvFilter::try_new(value).map_err(|source| TelemetryError::EnvFilter {
        value: value.to_string(),
        source,
    })
}

pub fn init() -> Result<(), TelemetryError> {
    let configured = env::var(LOG_ENV).ok();
    let env_filter = resolve_filter(configured.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Subscriber)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_filter() {
        if env::var("RUST_LOG").is_ok() {
            return;
        }
        let err = resolve_filter(Some("afford=notalevel")).expect_err("malformed filter");
        assert!(err.to_string().contains("afford=notalevel"));
    }

    #[test]
    fn accepts_plain_level() {
        assert!(resolve_filter(Some("debug")).is_ok());
        assert!(resolve_filter(None).is_ok());
    }
}
