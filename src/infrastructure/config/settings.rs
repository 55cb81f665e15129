//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application
//! settings. Every section is optional; an empty file is a valid
//! configuration that watches nothing until routes are added.
//!
//! # Example
//!
//! ```no_run
//! use farewatch::infrastructure::config::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.logging.init();
//!     Ok(())
//! }
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::Deserialize;
use url::Url;

use super::fetcher::FetcherConfig;
use super::logging::LoggingConfig;
use super::resolver::ResolverConfig;
use super::route::RouteSeed;
use super::telegram::TelegramAppConfig;
use crate::application::alert::AlertConfig;
use crate::application::history::SameDayPolicy;
use crate::application::scheduler::SchedulerConfig;
use crate::domain::RouteConfig;
use crate::error::{ConfigError, Result};

/// Price history settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryConfig {
    /// Which of two same-day prices is kept.
    #[serde(default)]
    pub same_day: SameDayPolicy,
}

/// Database settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file. Defaults to `~/.farewatch/farewatch.db`.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Polling cadence, timeouts, and retries.
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Alert thresholds.
    #[serde(default)]
    pub alerts: AlertConfig,

    #[serde(default)]
    pub history: HistoryConfig,

    /// Price source. Without one, `run` has nothing to poll.
    #[serde(default)]
    pub fetcher: Option<FetcherConfig>,

    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Telegram notification configuration.
    #[serde(default)]
    pub telegram: TelegramAppConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    /// Routes created on startup if they do not exist yet.
    #[serde(default)]
    pub routes: Vec<RouteSeed>,
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.to_string(),
    }
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML content is
    /// malformed, or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Seed routes as validated [`RouteConfig`]s.
    ///
    /// # Errors
    ///
    /// Returns the first invalid seed.
    pub fn seed_routes(&self) -> std::result::Result<Vec<RouteConfig>, ConfigError> {
        self.routes.iter().map(RouteSeed::to_route).collect()
    }

    /// Check value ranges and cross-field constraints.
    fn validate(&self) -> std::result::Result<(), ConfigError> {
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(invalid("logging.format", "must be \"pretty\" or \"json\""));
        }

        let scheduler = &self.scheduler;
        if scheduler.interval_secs == 0 {
            return Err(invalid("scheduler.interval_secs", "must be greater than 0"));
        }
        if scheduler.fetch_timeout_secs == 0 {
            return Err(invalid("scheduler.fetch_timeout_secs", "must be greater than 0"));
        }
        if scheduler.max_attempts == 0 {
            return Err(invalid("scheduler.max_attempts", "must be greater than 0"));
        }
        if scheduler.backoff_multiplier < 1.0 {
            return Err(invalid("scheduler.backoff_multiplier", "must be >= 1.0"));
        }
        if scheduler.max_backoff_ms < scheduler.initial_backoff_ms {
            return Err(invalid(
                "scheduler.max_backoff_ms",
                "must be >= initial_backoff_ms",
            ));
        }
        if scheduler.degraded_after == 0 {
            return Err(invalid("scheduler.degraded_after", "must be greater than 0"));
        }

        let alerts = &self.alerts;
        if alerts.drop_threshold <= Decimal::ZERO || alerts.drop_threshold > Decimal::ONE {
            return Err(invalid("alerts.drop_threshold", "must be in (0, 1]"));
        }
        if alerts.jump_threshold <= Decimal::ZERO {
            return Err(invalid("alerts.jump_threshold", "must be greater than 0"));
        }
        if alerts.jump_lookback_days == 0 {
            return Err(invalid("alerts.jump_lookback_days", "must be greater than 0"));
        }

        match &self.fetcher {
            Some(FetcherConfig::Command { program, .. }) if program.trim().is_empty() => {
                return Err(invalid("fetcher.program", "cannot be empty"));
            }
            Some(FetcherConfig::Http { url }) => {
                Url::parse(url).map_err(|e| invalid("fetcher.url", &e.to_string()))?;
            }
            _ => {}
        }

        let resolver = &self.resolver;
        if resolver.train_speed_kmh.is_nan() || resolver.train_speed_kmh <= 0.0 {
            return Err(invalid("resolver.train_speed_kmh", "must be greater than 0"));
        }
        if resolver.airports_csv.is_some() != resolver.countries_csv.is_some() {
            return Err(invalid(
                "resolver",
                "airports_csv and countries_csv must be set together",
            ));
        }

        let mut ids = HashSet::new();
        for route in self.seed_routes()? {
            if !ids.insert(route.id().clone()) {
                return Err(ConfigError::InvalidValue {
                    field: "routes",
                    reason: format!("duplicate route id '{}'", route.id()),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use rust_decimal_macros::dec;

    fn config_error(toml: &str) -> ConfigError {
        match Config::parse_toml(toml) {
            Err(Error::Config(e)) => e,
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::parse_toml("").unwrap();
        assert_eq!(config.scheduler.interval_secs, 86_400);
        assert_eq!(config.scheduler.fetch_timeout_secs, 120);
        assert_eq!(config.scheduler.max_attempts, 3);
        assert_eq!(config.scheduler.degraded_after, 3);
        assert_eq!(config.alerts.drop_threshold, dec!(0.10));
        assert_eq!(config.history.same_day, SameDayPolicy::Lowest);
        assert!(config.fetcher.is_none());
        assert!(config.resolver.catalog_paths().is_none());
        assert!(!config.telegram.enabled);
        assert!(config.routes.is_empty());
    }

    #[test]
    fn parses_every_section() {
        let config = Config::parse_toml(
            r#"
            [logging]
            level = "debug"
            format = "json"

            [scheduler]
            interval_secs = 3600
            fetch_timeout_secs = 60

            [alerts]
            drop_threshold = 0.2

            [history]
            same_day = "latest"

            [fetcher]
            type = "command"
            program = "kayak-scraper"
            args = ["--headless"]

            [resolver]
            airports_csv = "data/airports.csv"
            countries_csv = "data/countries.csv"

            [telegram]
            enabled = true
            min_severity = "warning"

            [database]
            path = "/tmp/farewatch.db"

            [[routes]]
            name = "Paris to Tokyo"
            origin = "CDG,ORY"
            destination = "country:Japan"
            start = "2025-05-01"
            end = "2025-05-31"
            min_days = 7
            max_days = 14
            price_limit = 650
            "#,
        )
        .unwrap();

        assert_eq!(config.logging.format, "json");
        assert_eq!(config.scheduler.interval_secs, 3600);
        assert_eq!(config.scheduler.max_attempts, 3);
        assert_eq!(config.alerts.drop_threshold, dec!(0.2));
        assert_eq!(config.history.same_day, SameDayPolicy::Latest);
        assert_eq!(
            config.fetcher.as_ref().unwrap().describe(),
            "command kayak-scraper --headless"
        );
        assert!(config.resolver.catalog_paths().is_some());
        assert_eq!(config.telegram.min_severity, crate::port::Severity::Warning);
        assert_eq!(
            config.database.path.as_deref(),
            Some(Path::new("/tmp/farewatch.db"))
        );

        let routes = config.seed_routes().unwrap();
        assert_eq!(routes[0].id().as_str(), "paris-to-tokyo");
        assert_eq!(routes[0].price_limit(), Some(dec!(650)));
    }

    #[test]
    fn rejects_out_of_range_values() {
        let cases = [
            ("[scheduler]\ninterval_secs = 0", "scheduler.interval_secs"),
            ("[scheduler]\nmax_attempts = 0", "scheduler.max_attempts"),
            ("[scheduler]\nbackoff_multiplier = 0.5", "scheduler.backoff_multiplier"),
            (
                "[scheduler]\ninitial_backoff_ms = 5000\nmax_backoff_ms = 10",
                "scheduler.max_backoff_ms",
            ),
            ("[alerts]\ndrop_threshold = 1.5", "alerts.drop_threshold"),
            ("[logging]\nformat = \"xml\"", "logging.format"),
            ("[fetcher]\ntype = \"http\"\nurl = \"not a url\"", "fetcher.url"),
            ("[fetcher]\ntype = \"command\"\nprogram = \" \"", "fetcher.program"),
            ("[resolver]\nairports_csv = \"a.csv\"", "resolver"),
        ];
        for (toml, expected) in cases {
            match config_error(toml) {
                ConfigError::InvalidValue { field, .. } => assert_eq!(field, expected, "{toml}"),
                other => panic!("{toml}: unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn rejects_invalid_seed_route() {
        let err = config_error(
            r#"
            [[routes]]
            name = "Too short"
            origin = "CDG"
            destination = "JFK"
            start = "2025-05-01"
            end = "2025-05-05"
            min_days = 7
            max_days = 14
            "#,
        );
        assert!(matches!(err, ConfigError::InvalidRoute { ref name, .. } if name == "Too short"));
    }

    #[test]
    fn rejects_duplicate_seed_ids() {
        let route = r#"
            [[routes]]
            id = "same"
            name = "A"
            origin = "CDG"
            destination = "JFK"
            start = "2025-05-01"
            end = "2025-05-31"
            min_days = 7
            max_days = 14
        "#;
        let err = config_error(&format!("{route}\n{route}"));
        assert!(matches!(err, ConfigError::InvalidValue { field: "routes", .. }));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(config_error("[scheduler"), ConfigError::Parse(_)));
    }
}
