//! Daily price observations.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use url::Url;

use super::error::DomainError;
use super::id::AirportCode;
use super::money::{Currency, Price};
use super::search;

/// The concrete flight behind an observed minimum price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Itinerary {
    pub departure: AirportCode,
    pub destination: AirportCode,
    /// Airline or booking company name.
    #[serde(default)]
    pub company: String,
    /// Outbound duration as displayed by the source, e.g. `"18h 55min"`.
    #[serde(default)]
    pub duration_out: String,
    /// Return duration as displayed by the source.
    #[serde(default)]
    pub duration_return: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_date: Option<NaiveDate>,
}

impl Itinerary {
    /// Search page for this itinerary, when both trip dates are known.
    #[must_use]
    pub fn search_url(&self) -> Option<Url> {
        let departure_date = self.departure_date?;
        let return_date = self.return_date?;
        search::kayak_url(
            &self.departure,
            &self.destination,
            departure_date,
            return_date,
        )
        .ok()
    }
}

/// One recorded minimum price for a route on a calendar day.
///
/// Observations are immutable once created; a later fetch on the same day
/// produces a new observation that replaces this one in the history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceObservation {
    date: NaiveDate,
    price: Price,
    currency: Currency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    itinerary: Option<Itinerary>,
}

impl PriceObservation {
    /// Create an observation. The price is checked when it is recorded.
    #[must_use]
    pub fn new(date: NaiveDate, price: Price, currency: Currency) -> Self {
        Self {
            date,
            price,
            currency,
            itinerary: None,
        }
    }

    /// Attach the flight details behind the price.
    #[must_use]
    pub fn with_itinerary(mut self, itinerary: Itinerary) -> Self {
        self.itinerary = Some(itinerary);
        self
    }

    /// Reject non-positive prices.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidObservation`] when `price <= 0`.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.price <= Price::ZERO {
            return Err(DomainError::InvalidObservation { price: self.price });
        }
        Ok(())
    }

    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    #[must_use]
    pub const fn price(&self) -> Price {
        self.price
    }

    #[must_use]
    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    #[must_use]
    pub fn itinerary(&self) -> Option<&Itinerary> {
        self.itinerary.as_ref()
    }
}
