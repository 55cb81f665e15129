//! Search page links for recorded deals.

use chrono::NaiveDate;
use url::Url;

use super::id::AirportCode;

const KAYAK_BASE: &str = "https://www.kayak.com/flights/";

/// Build the Kayak results page for a round trip, sorted by best flight.
///
/// # Errors
///
/// Returns a parse error only if the joined path is not a valid URL.
pub fn kayak_url(
    departure: &AirportCode,
    destination: &AirportCode,
    departure_date: NaiveDate,
    return_date: NaiveDate,
) -> Result<Url, url::ParseError> {
    let path = format!(
        "{departure}-{destination}/{}/{}",
        departure_date.format("%Y-%m-%d"),
        return_date.format("%Y-%m-%d"),
    );
    let mut url = Url::parse(KAYAK_BASE)?.join(&path)?;
    url.query_pairs_mut().append_pair("sort", "bestflight_a");
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_sorted_round_trip_link() {
        let url = kayak_url(
            &AirportCode::try_new("cdg").unwrap(),
            &AirportCode::try_new("jfk").unwrap(),
            NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 5, 15).unwrap(),
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.kayak.com/flights/CDG-JFK/2025-05-01/2025-05-15?sort=bestflight_a"
        );
    }
}
