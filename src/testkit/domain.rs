//! Builders for domain primitives used across tests.
//!
//! Routes default to a Paris to New York search over May 2025 with one to
//! two week stays, so tests only spell out what they assert on.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::domain::{
    AirportSet, Currency, DateRange, PriceObservation, RouteConfig, RouteId, TripDuration,
};

/// Calendar date shorthand.
///
/// # Panics
///
/// Panics on an impossible date.
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

/// Day `d` of June 2024, the month most history tests live in.
pub fn day(d: u32) -> NaiveDate {
    date(2024, 6, d)
}

/// A valid route with the given ID and name derived from it.
///
/// # Panics
///
/// Panics if the fixed parameters stop being valid.
pub fn route(id: &str) -> RouteConfig {
    named_route(id, &format!("Route {id}"))
}

/// The default route under a chosen display name.
///
/// # Panics
///
/// Panics if the fixed parameters stop being valid.
pub fn named_route(id: &str, name: &str) -> RouteConfig {
    RouteConfig::new(
        RouteId::new(id),
        name,
        airports("CDG,ORY"),
        airports("JFK"),
        DateRange::new(date(2025, 5, 1), date(2025, 5, 31)).expect("valid window"),
        TripDuration::new(7, 14).expect("valid trip"),
    )
    .expect("valid test route")
}

/// Parse an airport set from its compact text form.
///
/// # Panics
///
/// Panics on malformed input.
pub fn airports(spec: &str) -> AirportSet {
    spec.parse().expect("valid airport set")
}

/// Observation in euros with a whole-unit price.
pub fn observation(date: NaiveDate, price: i64) -> PriceObservation {
    PriceObservation::new(date, Decimal::from(price), Currency::default())
}
