//! Domain validation errors for core domain types.
//!
//! These errors are returned when a value would break a domain invariant,
//! for example a non-positive fare or a date window shorter than the
//! longest trip being searched.
//!
//! # Examples
//!
//! ```
//! use chrono::NaiveDate;
//! use farewatch::domain::{Currency, DomainError, PriceHistory, PriceObservation};
//! use rust_decimal::Decimal;
//!
//! let mut history = PriceHistory::new();
//! let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let free = PriceObservation::new(date, Decimal::ZERO, Currency::default());
//!
//! assert!(matches!(
//!     history.upsert(free),
//!     Err(DomainError::InvalidObservation { .. })
//! ));
//! assert!(history.is_empty());
//! ```

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Observed prices must be strictly positive.
    #[error("observation price must be positive, got {price}")]
    InvalidObservation {
        /// The rejected price.
        price: Decimal,
    },

    /// IATA airport codes are exactly three ASCII letters.
    #[error("invalid IATA airport code '{code}'")]
    InvalidAirportCode {
        /// The rejected input.
        code: String,
    },

    /// Currency codes are three ASCII letters (ISO 4217).
    #[error("invalid currency code '{code}'")]
    InvalidCurrency {
        /// The rejected input.
        code: String,
    },

    /// A literal airport set must name at least one airport.
    #[error("airport set cannot be empty")]
    EmptyAirportSet,

    /// An airport rule could not be parsed from text.
    #[error("invalid airport set '{input}': {reason}")]
    InvalidAirportSet {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The date window ends before it starts.
    #[error("date window ends ({end}) before it starts ({start})")]
    InvalidDateWindow {
        /// First departure date.
        start: NaiveDate,
        /// Last return date.
        end: NaiveDate,
    },

    /// Minimum trip duration exceeds the maximum.
    #[error("trip duration minimum {min} exceeds maximum {max}")]
    InvalidTripDuration {
        /// Shortest stay in days.
        min: u32,
        /// Longest stay in days.
        max: u32,
    },

    /// The date window cannot contain the longest trip.
    #[error("date window of {window_days} days is shorter than the maximum trip of {max_trip} days")]
    WindowTooShort {
        /// Length of the date window in days.
        window_days: i64,
        /// Longest stay in days.
        max_trip: u32,
    },

    /// Maximum flight duration must be at least one hour.
    #[error("maximum flight duration must be positive")]
    NonPositiveFlightDuration,

    /// A price limit must be strictly positive.
    #[error("price limit must be positive, got {limit}")]
    NonPositivePriceLimit {
        /// The rejected limit.
        limit: Decimal,
    },

    /// Routes need a display name.
    #[error("route name cannot be empty")]
    EmptyRouteName,
}
