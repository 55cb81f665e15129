//! Tracked route configuration.
//!
//! A [`RouteConfig`] describes one search the user wants watched: where
//! from, where to, which dates, how long a stay, and how long a flight is
//! acceptable. Airport sets may be literal IATA codes or rules that an
//! airport resolver expands into codes before each fetch.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::{AirportCode, RouteId};
use super::money::Price;

/// Default upper bound on a single flight's duration, in hours.
pub const DEFAULT_MAX_FLIGHT_HOURS: u32 = 24;

/// A set of airports on one side of a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AirportSet {
    /// Literal IATA codes.
    Codes {
        /// The airports, in user order.
        codes: Vec<AirportCode>,
    },
    /// Every airport in a country, by name or ISO 3166 alpha-2 code.
    Country {
        /// Country name fragment or two-letter code.
        country: String,
    },
    /// Large airports reachable from a city within a ground-transport budget.
    NearCity {
        /// City name.
        city: String,
        /// Maximum ground transport time in minutes.
        max_transport_minutes: u32,
    },
}

impl AirportSet {
    /// Build a literal set from codes.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::EmptyAirportSet`] if `codes` is empty.
    pub fn codes(codes: Vec<AirportCode>) -> Result<Self, DomainError> {
        if codes.is_empty() {
            return Err(DomainError::EmptyAirportSet);
        }
        Ok(Self::Codes { codes })
    }

    /// Literal codes, if this set is not a rule.
    #[must_use]
    pub fn literal_codes(&self) -> Option<&[AirportCode]> {
        match self {
            Self::Codes { codes } => Some(codes),
            _ => None,
        }
    }

    fn validate(&self) -> Result<(), DomainError> {
        match self {
            Self::Codes { codes } if codes.is_empty() => Err(DomainError::EmptyAirportSet),
            Self::Country { country } if country.trim().is_empty() => {
                Err(DomainError::InvalidAirportSet {
                    input: country.clone(),
                    reason: "country cannot be empty".to_string(),
                })
            }
            Self::NearCity { city, .. } if city.trim().is_empty() => {
                Err(DomainError::InvalidAirportSet {
                    input: city.clone(),
                    reason: "city cannot be empty".to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}

/// Parses the compact text form used on the command line.
///
/// - `CDG,ORY` or `CDG ORY`: literal codes
/// - `country:France` or `country:FR`: every airport in a country
/// - `city:Lyon@120`: airports within 120 minutes of Lyon
impl FromStr for AirportSet {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        let invalid = |reason: &str| DomainError::InvalidAirportSet {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        if let Some(country) = input.strip_prefix("country:") {
            let set = Self::Country {
                country: country.trim().to_string(),
            };
            set.validate()?;
            return Ok(set);
        }

        if let Some(rule) = input.strip_prefix("city:") {
            let (city, minutes) = rule
                .rsplit_once('@')
                .ok_or_else(|| invalid("expected city:<name>@<minutes>"))?;
            let max_transport_minutes = minutes
                .trim()
                .parse::<u32>()
                .map_err(|_| invalid("transport time must be a whole number of minutes"))?;
            let set = Self::NearCity {
                city: city.trim().to_string(),
                max_transport_minutes,
            };
            set.validate()?;
            return Ok(set);
        }

        let codes = input
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .map(AirportCode::try_new)
            .collect::<Result<Vec<_>, _>>()?;
        Self::codes(codes)
    }
}

impl fmt::Display for AirportSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Codes { codes } => {
                let joined: Vec<&str> = codes.iter().map(AirportCode::as_str).collect();
                write!(f, "{}", joined.join(","))
            }
            Self::Country { country } => write!(f, "country:{country}"),
            Self::NearCity {
                city,
                max_transport_minutes,
            } => write!(f, "city:{city}@{max_transport_minutes}"),
        }
    }
}

/// Inclusive calendar window: first possible departure to last possible return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Create a window.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidDateWindow`] if `end` is before `start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DomainError> {
        if end < start {
            return Err(DomainError::InvalidDateWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// First departure date.
    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last return date.
    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of nights between start and end.
    #[must_use]
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

/// Bounds on the length of stay, in days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripDuration {
    min_days: u32,
    max_days: u32,
}

impl TripDuration {
    /// Create duration bounds.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidTripDuration`] if `min_days > max_days`.
    pub fn new(min_days: u32, max_days: u32) -> Result<Self, DomainError> {
        if min_days > max_days {
            return Err(DomainError::InvalidTripDuration {
                min: min_days,
                max: max_days,
            });
        }
        Ok(Self { min_days, max_days })
    }

    /// A fixed-length stay.
    #[must_use]
    pub const fn exactly(days: u32) -> Self {
        Self {
            min_days: days,
            max_days: days,
        }
    }

    /// Shortest stay.
    #[must_use]
    pub const fn min_days(&self) -> u32 {
        self.min_days
    }

    /// Longest stay.
    #[must_use]
    pub const fn max_days(&self) -> u32 {
        self.max_days
    }
}

/// One tracked search.
///
/// Fields are private; construct with [`RouteConfig::new`] which enforces
/// the invariants. Values deserialized from storage or configuration should
/// be checked with [`RouteConfig::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteConfig {
    id: RouteId,
    name: String,
    origin: AirportSet,
    destination: AirportSet,
    date_window: DateRange,
    trip_duration: TripDuration,
    #[serde(default = "default_max_flight_hours")]
    max_flight_hours: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    price_limit: Option<Price>,
}

fn default_max_flight_hours() -> u32 {
    DEFAULT_MAX_FLIGHT_HOURS
}

impl RouteConfig {
    /// Create and validate a route.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant; see [`RouteConfig::validate`].
    pub fn new(
        id: RouteId,
        name: impl Into<String>,
        origin: AirportSet,
        destination: AirportSet,
        date_window: DateRange,
        trip_duration: TripDuration,
    ) -> Result<Self, DomainError> {
        let route = Self {
            id,
            name: name.into(),
            origin,
            destination,
            date_window,
            trip_duration,
            max_flight_hours: DEFAULT_MAX_FLIGHT_HOURS,
            price_limit: None,
        };
        route.validate()?;
        Ok(route)
    }

    /// Set the maximum acceptable flight duration.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NonPositiveFlightDuration`] for zero hours.
    pub fn with_max_flight_hours(mut self, hours: u32) -> Result<Self, DomainError> {
        self.max_flight_hours = hours;
        self.validate()?;
        Ok(self)
    }

    /// Set a price at or below which the user wants an alert.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NonPositivePriceLimit`] for non-positive limits.
    pub fn with_price_limit(mut self, limit: Option<Price>) -> Result<Self, DomainError> {
        self.price_limit = limit;
        self.validate()?;
        Ok(self)
    }

    /// Check every route invariant.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::EmptyRouteName);
        }
        self.origin.validate()?;
        self.destination.validate()?;
        DateRange::new(self.date_window.start, self.date_window.end)?;
        TripDuration::new(self.trip_duration.min_days, self.trip_duration.max_days)?;
        let window_days = self.date_window.days();
        if window_days < i64::from(self.trip_duration.max_days) {
            return Err(DomainError::WindowTooShort {
                window_days,
                max_trip: self.trip_duration.max_days,
            });
        }
        if self.max_flight_hours == 0 {
            return Err(DomainError::NonPositiveFlightDuration);
        }
        if let Some(limit) = self.price_limit {
            if limit <= Price::ZERO {
                return Err(DomainError::NonPositivePriceLimit { limit });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn id(&self) -> &RouteId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn origin(&self) -> &AirportSet {
        &self.origin
    }

    #[must_use]
    pub fn destination(&self) -> &AirportSet {
        &self.destination
    }

    #[must_use]
    pub fn date_window(&self) -> DateRange {
        self.date_window
    }

    #[must_use]
    pub fn trip_duration(&self) -> TripDuration {
        self.trip_duration
    }

    #[must_use]
    pub fn max_flight_hours(&self) -> u32 {
        self.max_flight_hours
    }

    #[must_use]
    pub fn price_limit(&self) -> Option<Price> {
        self.price_limit
    }
}

/// A route whose airport rules have been expanded into concrete codes.
///
/// This is the input handed to price fetchers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRoute {
    pub route_id: RouteId,
    pub origins: Vec<AirportCode>,
    pub destinations: Vec<AirportCode>,
    pub date_window: DateRange,
    pub trip_duration: TripDuration,
    pub max_flight_hours: u32,
}

impl ResolvedRoute {
    /// Pair a route with the airports its sets resolved to.
    #[must_use]
    pub fn new(
        route: &RouteConfig,
        origins: Vec<AirportCode>,
        destinations: Vec<AirportCode>,
    ) -> Self {
        Self {
            route_id: route.id.clone(),
            origins,
            destinations,
            date_window: route.date_window,
            trip_duration: route.trip_duration,
            max_flight_hours: route.max_flight_hours,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn codes(s: &str) -> AirportSet {
        s.parse().unwrap()
    }

    fn route(window: (NaiveDate, NaiveDate), trip: TripDuration) -> Result<RouteConfig, DomainError> {
        RouteConfig::new(
            RouteId::new("r1"),
            "Paris to Tokyo",
            codes("CDG,ORY"),
            codes("NRT HND"),
            DateRange::new(window.0, window.1)?,
            trip,
        )
    }

    #[test]
    fn parses_literal_codes_with_mixed_separators() {
        let set = codes("cdg, ory  bva");
        assert_eq!(set.to_string(), "CDG,ORY,BVA");
    }

    #[test]
    fn parses_country_and_city_rules() {
        assert_eq!(
            "country:France".parse::<AirportSet>().unwrap(),
            AirportSet::Country {
                country: "France".into()
            }
        );
        assert_eq!(
            "city:Lyon@120".parse::<AirportSet>().unwrap(),
            AirportSet::NearCity {
                city: "Lyon".into(),
                max_transport_minutes: 120
            }
        );
    }

    #[test]
    fn rejects_malformed_rules() {
        assert!("city:Lyon".parse::<AirportSet>().is_err());
        assert!("city:Lyon@soon".parse::<AirportSet>().is_err());
        assert!("country:".parse::<AirportSet>().is_err());
        assert!(matches!(
            "".parse::<AirportSet>(),
            Err(DomainError::EmptyAirportSet)
        ));
    }

    #[test]
    fn window_must_fit_longest_trip() {
        let err = route(
            (date(2024, 6, 1), date(2024, 6, 10)),
            TripDuration::new(7, 14).unwrap(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            DomainError::WindowTooShort {
                window_days: 9,
                max_trip: 14
            }
        );
    }

    #[test]
    fn date_window_cannot_end_before_start() {
        assert!(DateRange::new(date(2024, 6, 2), date(2024, 6, 1)).is_err());
    }

    #[test]
    fn price_limit_must_be_positive() {
        let r = route(
            (date(2024, 6, 1), date(2024, 6, 30)),
            TripDuration::new(7, 14).unwrap(),
        )
        .unwrap();
        assert!(r.clone().with_price_limit(Some(Price::ZERO)).is_err());
        assert!(r.with_price_limit(Some(Price::new(450, 0))).is_ok());
    }

    #[test]
    fn route_round_trips_through_json() {
        let r = route(
            (date(2024, 6, 1), date(2024, 6, 30)),
            TripDuration::exactly(10),
        )
        .unwrap();
        let json = serde_json::to_string(&r).unwrap();
        let back: RouteConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
    }
}
