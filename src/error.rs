use std::time::Duration;

use thiserror::Error;

use crate::domain::error::DomainError;
use crate::domain::id::RouteId;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("invalid route '{name}': {source}")]
    InvalidRoute {
        name: String,
        #[source]
        source: DomainError,
    },
}

/// Failures at the price-source boundary.
///
/// Every variant is recoverable: the scheduler retries within a tick and
/// otherwise waits for the next one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("failed to parse price source response: {0}")]
    Parse(String),

    #[error("no results found")]
    NoResultsFound,

    #[error("fetch timed out after {0:?}")]
    Timeout(Duration),
}

impl FetchError {
    /// Whether retrying within the same tick can help.
    ///
    /// An empty result page will not fill up seconds later.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        !matches!(self, Self::NoResultsFound)
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("unknown route: {0}")]
    UnknownRoute(RouteId),

    #[error("route already exists: {0}")]
    DuplicateRoute(RouteId),

    #[error("airport resolution failed: {0}")]
    Resolution(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("task failed: {0}")]
    Task(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<diesel::result::Error> for Error {
    fn from(err: diesel::result::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

impl From<diesel::r2d2::PoolError> for Error {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        Error::Connection(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_results_is_not_retried() {
        assert!(!FetchError::NoResultsFound.is_retryable());
        assert!(FetchError::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(FetchError::Network("reset".into()).is_retryable());
        assert!(FetchError::Parse("bad json".into()).is_retryable());
    }

    #[test]
    fn domain_errors_convert_transparently() {
        let err: Error = DomainError::EmptyAirportSet.into();
        assert_eq!(err.to_string(), "airport set cannot be empty");
    }
}
