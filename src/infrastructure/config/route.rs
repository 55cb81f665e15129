//! Seed routes declared in the configuration file.
//!
//! ```toml
//! [[routes]]
//! name = "Paris to Tokyo"
//! origin = "CDG,ORY"
//! destination = "country:Japan"
//! start = "2025-05-01"
//! end = "2025-05-31"
//! min_days = 7
//! max_days = 14
//! max_flight_hours = 20
//! price_limit = 650
//! ```

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::route::DEFAULT_MAX_FLIGHT_HOURS;
use crate::domain::{AirportSet, DateRange, RouteConfig, RouteId, TripDuration};
use crate::error::ConfigError;

/// A route as written in `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteSeed {
    /// Stable id; derived from the name when omitted.
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    /// Airport set in its text form (`CDG,ORY`, `country:FR`, `city:Lyon@120`).
    pub origin: String,
    pub destination: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub min_days: u32,
    pub max_days: u32,
    #[serde(default = "default_max_flight_hours")]
    pub max_flight_hours: u32,
    #[serde(default)]
    pub price_limit: Option<Decimal>,
}

const fn default_max_flight_hours() -> u32 {
    DEFAULT_MAX_FLIGHT_HOURS
}

impl RouteSeed {
    /// Build and validate the route.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidRoute`] naming the seed.
    pub fn to_route(&self) -> Result<RouteConfig, ConfigError> {
        let invalid = |source| ConfigError::InvalidRoute {
            name: self.name.clone(),
            source,
        };
        let id = self
            .id
            .as_deref()
            .map_or_else(|| RouteId::from_name(&self.name), RouteId::new);
        let origin: AirportSet = self.origin.parse().map_err(invalid)?;
        let destination: AirportSet = self.destination.parse().map_err(invalid)?;
        let window = DateRange::new(self.start, self.end).map_err(invalid)?;
        let trip = TripDuration::new(self.min_days, self.max_days).map_err(invalid)?;

        RouteConfig::new(id, &self.name, origin, destination, window, trip)
            .and_then(|route| route.with_max_flight_hours(self.max_flight_hours))
            .and_then(|route| route.with_price_limit(self.price_limit))
            .map_err(invalid)
    }
}
