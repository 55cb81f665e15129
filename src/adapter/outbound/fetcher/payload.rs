//! JSON fare payload returned by price sources.
//!
//! ```json
//! {"price": 412.37, "currency": "EUR", "departure": "CDG",
//!  "destination": "JFK", "company": "Air France",
//!  "duration_out": "8h 25min", "duration_return": "7h 10min",
//!  "dep_date": "2025-05-03", "arrival_date": "2025-05-12"}
//! ```
//!
//! Every field except `price` is optional. A missing or null `price`, an
//! empty body, or `null` means the search returned nothing. The
//! observation is dated with `date` when present, otherwise today.

use std::str::FromStr;

use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::{AirportCode, Currency, Itinerary, PriceObservation};
use crate::error::FetchError;

#[derive(Debug, Deserialize)]
struct FarePayload {
    #[serde(default)]
    price: Option<serde_json::Number>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default, alias = "datetime")]
    date: Option<String>,
    #[serde(default)]
    departure: Option<String>,
    #[serde(default)]
    destination: Option<String>,
    #[serde(default)]
    company: String,
    #[serde(default)]
    duration_out: String,
    #[serde(default)]
    duration_return: String,
    #[serde(default)]
    dep_date: Option<String>,
    #[serde(default)]
    arrival_date: Option<String>,
}

fn parse_day(raw: &str) -> Result<NaiveDate, FetchError> {
    raw.trim()
        .get(..10)
        .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
        .ok_or_else(|| FetchError::Parse(format!("bad date '{raw}'")))
}

fn parse_code(raw: &str) -> Result<AirportCode, FetchError> {
    AirportCode::try_new(raw).map_err(|e| FetchError::Parse(e.to_string()))
}

/// Parse a price source response dated `today` unless it names a date.
///
/// # Errors
/// [`FetchError::NoResultsFound`] for an empty result, [`FetchError::Parse`]
/// for anything malformed.
pub fn parse_observation(body: &str, today: NaiveDate) -> Result<PriceObservation, FetchError> {
    let body = body.trim();
    if body.is_empty() || body == "null" {
        return Err(FetchError::NoResultsFound);
    }
    let payload: FarePayload =
        serde_json::from_str(body).map_err(|e| FetchError::Parse(e.to_string()))?;

    let Some(price) = payload.price else {
        return Err(FetchError::NoResultsFound);
    };
    let price = Decimal::from_str(&price.to_string())
        .map_err(|e| FetchError::Parse(format!("bad price '{price}': {e}")))?;
    let currency = match payload.currency.as_deref() {
        Some(code) => Currency::try_new(code).map_err(|e| FetchError::Parse(e.to_string()))?,
        None => Currency::default(),
    };
    let date = payload.date.as_deref().map(parse_day).transpose()?.unwrap_or(today);
    let observation = PriceObservation::new(date, price, currency);

    let (Some(departure), Some(destination)) = (payload.departure, payload.destination) else {
        return Ok(observation);
    };
    let itinerary = Itinerary {
        departure: parse_code(&departure)?,
        destination: parse_code(&destination)?,
        company: payload.company,
        duration_out: payload.duration_out,
        duration_return: payload.duration_return,
        departure_date: payload.dep_date.as_deref().map(parse_day).transpose()?,
        return_date: payload.arrival_date.as_deref().map(parse_day).transpose()?,
    };
    Ok(observation.with_itinerary(itinerary))
}

/// Today's date in local time.
#[must_use]
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
