//! OurAirports catalog resolver.
//!
//! Reads the `airports.csv` and `countries.csv` files published by
//! OurAirports. Country rules match a two-letter ISO code or a fragment of
//! the country name and return every airport with an IATA code. City rules
//! locate the city through the `municipality` column and return the large
//! airports with scheduled service that ground transport reaches in the
//! allotted time, nearest first.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::domain::{AirportCode, AirportSet};
use crate::error::{Error, Result};
use crate::port::AirportResolver;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Average ground transport speed used for city rules, in km/h.
pub const DEFAULT_TRAIN_SPEED_KMH: f64 = 80.0;

#[derive(Debug, Deserialize)]
struct AirportRow {
    #[serde(rename = "type")]
    kind: String,
    name: String,
    latitude_deg: f64,
    longitude_deg: f64,
    iso_country: String,
    #[serde(default)]
    municipality: Option<String>,
    #[serde(default)]
    scheduled_service: Option<String>,
    #[serde(default)]
    iata_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CountryRow {
    code: String,
    name: String,
}

/// One catalog airport.
#[derive(Debug, Clone)]
pub struct Airport {
    pub code: Option<AirportCode>,
    pub name: String,
    pub large: bool,
    pub scheduled: bool,
    pub iso_country: String,
    pub municipality: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<AirportRow> for Airport {
    fn from(row: AirportRow) -> Self {
        Self {
            code: row
                .iata_code
                .as_deref()
                .and_then(|code| AirportCode::try_new(code).ok()),
            name: row.name,
            large: row.kind == "large_airport",
            scheduled: row
                .scheduled_service
                .is_some_and(|s| s.eq_ignore_ascii_case("yes")),
            iso_country: row.iso_country,
            municipality: row.municipality.unwrap_or_default(),
            latitude: row.latitude_deg,
            longitude: row.longitude_deg,
        }
    }
}

/// Airports and countries loaded from OurAirports CSV files.
#[derive(Debug, Clone, Default)]
pub struct AirportCatalog {
    airports: Vec<Airport>,
    countries: Vec<(String, String)>,
}

impl AirportCatalog {
    /// Load both CSV files from disk.
    ///
    /// # Errors
    /// Returns an error if a file cannot be opened or a row is malformed.
    pub fn load(airports: &Path, countries: &Path) -> Result<Self> {
        let catalog = Self::from_readers(File::open(airports)?, File::open(countries)?)?;
        debug!(
            airports = catalog.airports.len(),
            countries = catalog.countries.len(),
            path = %airports.display(),
            "Loaded airport catalog"
        );
        Ok(catalog)
    }

    /// Parse both CSV documents.
    ///
    /// # Errors
    /// Returns an error if a row is malformed.
    pub fn from_readers(airports: impl Read, countries: impl Read) -> Result<Self> {
        let airports = csv::Reader::from_reader(airports)
            .deserialize::<AirportRow>()
            .map(|row| row.map(Airport::from))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let countries = csv::Reader::from_reader(countries)
            .deserialize::<CountryRow>()
            .map(|row| row.map(|r| (r.code.to_ascii_uppercase(), r.name)))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self {
            airports,
            countries,
        })
    }

    /// Number of airports in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.airports.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.airports.is_empty()
    }

    /// Find a country by ISO code or by a case-insensitive name fragment.
    ///
    /// Returns `(code, name)`.
    ///
    /// # Errors
    /// Returns [`Error::Resolution`] if nothing matches.
    pub fn country(&self, input: &str) -> Result<(&str, &str)> {
        let input = input.trim();
        if input.len() == 2 {
            if let Some((code, name)) = self
                .countries
                .iter()
                .find(|(code, _)| code.eq_ignore_ascii_case(input))
            {
                return Ok((code, name));
            }
        }
        let needle = input.to_lowercase();
        self.countries
            .iter()
            .find(|(_, name)| name.to_lowercase().contains(&needle))
            .map(|(code, name)| (code.as_str(), name.as_str()))
            .ok_or_else(|| Error::Resolution(format!("no country found matching '{input}'")))
    }

    /// Every airport with an IATA code in a country.
    ///
    /// # Errors
    /// Returns [`Error::Resolution`] if the country is unknown or has no
    /// coded airports.
    pub fn in_country(&self, input: &str) -> Result<Vec<AirportCode>> {
        let (code, name) = self.country(input)?;
        debug!(input, code, name, "Detected country");
        let codes = dedup(
            self.airports
                .iter()
                .filter(|a| a.iso_country == code)
                .filter_map(|a| a.code.clone()),
        );
        if codes.is_empty() {
            return Err(Error::Resolution(format!("no airports found in {name}")));
        }
        Ok(codes)
    }

    /// Locate a city by averaging the coordinates of its airports.
    fn locate_city(&self, city: &str) -> Option<(f64, f64)> {
        let city = city.trim();
        let (count, lat, lon) = self
            .airports
            .iter()
            .filter(|a| a.municipality.eq_ignore_ascii_case(city))
            .fold((0_u32, 0.0, 0.0), |(n, lat, lon), a| {
                (n + 1, lat + a.latitude, lon + a.longitude)
            });
        (count > 0).then(|| (lat / f64::from(count), lon / f64::from(count)))
    }

    /// Large scheduled airports within reach of a city, nearest first.
    ///
    /// The reach is `speed_kmh * minutes / 60` kilometres of great-circle
    /// distance.
    ///
    /// # Errors
    /// Returns [`Error::Resolution`] if the city is unknown or no airport
    /// is within reach.
    pub fn near_city(&self, city: &str, minutes: u32, speed_kmh: f64) -> Result<Vec<AirportCode>> {
        let (lat, lon) = self
            .locate_city(city)
            .ok_or_else(|| Error::Resolution(format!("unknown city '{city}'")))?;
        let reach_km = speed_kmh * f64::from(minutes) / 60.0;

        let mut candidates: Vec<(f64, AirportCode)> = self
            .airports
            .iter()
            .filter(|a| a.large && a.scheduled)
            .filter_map(|a| {
                let code = a.code.clone()?;
                let distance = haversine_km(lat, lon, a.latitude, a.longitude);
                (distance <= reach_km).then_some((distance, code))
            })
            .collect();
        candidates.sort_by(|a, b| a.0.total_cmp(&b.0));

        let codes = dedup(candidates.into_iter().map(|(_, code)| code));
        if codes.is_empty() {
            return Err(Error::Resolution(format!(
                "no large airport within {minutes} minutes of {city}"
            )));
        }
        Ok(codes)
    }
}

fn dedup(codes: impl Iterator<Item = AirportCode>) -> Vec<AirportCode> {
    let mut seen = std::collections::HashSet::new();
    codes.filter(|code| seen.insert(code.clone())).collect()
}

/// Great-circle distance between two points, in kilometres.
#[must_use]
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Resolver backed by an [`AirportCatalog`].
#[derive(Debug, Clone)]
pub struct CatalogResolver {
    catalog: AirportCatalog,
    train_speed_kmh: f64,
}

impl CatalogResolver {
    #[must_use]
    pub fn new(catalog: AirportCatalog) -> Self {
        Self {
            catalog,
            train_speed_kmh: DEFAULT_TRAIN_SPEED_KMH,
        }
    }

    /// Override the ground transport speed used for city rules.
    #[must_use]
    pub fn with_train_speed(mut self, kmh: f64) -> Self {
        self.train_speed_kmh = kmh;
        self
    }

    #[must_use]
    pub fn catalog(&self) -> &AirportCatalog {
        &self.catalog
    }
}

impl AirportResolver for CatalogResolver {
    fn resolve(&self, set: &AirportSet) -> Result<Vec<AirportCode>> {
        match set {
            AirportSet::Codes { codes } => Ok(codes.clone()),
            AirportSet::Country { country } => self.catalog.in_country(country),
            AirportSet::NearCity {
                city,
                max_transport_minutes,
            } => self
                .catalog
                .near_city(city, *max_transport_minutes, self.train_speed_kmh),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AIRPORTS: &str = "\
\"id\",\"ident\",\"type\",\"name\",\"latitude_deg\",\"longitude_deg\",\"iso_country\",\"municipality\",\"scheduled_service\",\"iata_code\"
1,LFPG,large_airport,Charles de Gaulle,49.0097,2.5479,FR,Paris,yes,CDG
2,LFPO,large_airport,Orly,48.7262,2.3652,FR,Paris,yes,ORY
3,LFPB,medium_airport,Le Bourget,48.9694,2.4414,FR,Paris,no,LBG
4,LFLL,large_airport,Lyon Saint-Exupery,45.7256,5.0811,FR,Lyon,yes,LYS
5,LFXX,small_airport,Private strip,48.5,2.5,FR,Melun,no,
6,EGLL,large_airport,Heathrow,51.4706,-0.4619,GB,London,yes,LHR
7,LFQQ,large_airport,Lille,50.5633,3.0869,FR,Lille,yes,LIL
";

    const COUNTRIES: &str = "\
\"id\",\"code\",\"name\",\"continent\"
1,FR,France,EU
2,GB,United Kingdom,EU
3,FJ,Fiji,OC
";

    fn resolver() -> CatalogResolver {
        let catalog =
            AirportCatalog::from_readers(AIRPORTS.as_bytes(), COUNTRIES.as_bytes()).unwrap();
        CatalogResolver::new(catalog)
    }

    fn codes(codes: &[AirportCode]) -> Vec<&str> {
        codes.iter().map(AirportCode::as_str).collect()
    }

    #[test]
    fn haversine_paris_to_london() {
        let km = haversine_km(48.8566, 2.3522, 51.5074, -0.1278);
        assert!((km - 343.5).abs() < 1.0, "got {km}");
    }

    #[test]
    fn country_by_iso_code_or_name() {
        let resolver = resolver();
        assert_eq!(resolver.catalog().country("fr").unwrap(), ("FR", "France"));
        assert_eq!(resolver.catalog().country("kingdom").unwrap().0, "GB");

        let set: AirportSet = "country:France".parse().unwrap();
        assert_eq!(
            codes(&resolver.resolve(&set).unwrap()),
            vec!["CDG", "ORY", "LBG", "LYS", "LIL"]
        );
    }

    #[test]
    fn unknown_country_fails() {
        let set: AirportSet = "country:Atlantis".parse().unwrap();
        assert!(matches!(resolver().resolve(&set), Err(Error::Resolution(_))));
    }

    #[test]
    fn country_without_airports_fails() {
        let set: AirportSet = "country:FJ".parse().unwrap();
        let err = resolver().resolve(&set).unwrap_err();
        assert!(err.to_string().contains("Fiji"));
    }

    #[test]
    fn near_city_keeps_large_scheduled_airports_in_reach() {
        // 60 minutes at 80 km/h reaches both Paris airports but not Lille.
        let set: AirportSet = "city:paris@60".parse().unwrap();
        let found = resolver().resolve(&set).unwrap();
        assert_eq!(codes(&found).len(), 2);
        assert!(codes(&found).contains(&"CDG"));
        assert!(codes(&found).contains(&"ORY"));

        // 3 hours adds Lille (about 200 km) but not Lyon (about 400 km).
        let set: AirportSet = "city:Paris@180".parse().unwrap();
        let found = resolver().resolve(&set).unwrap();
        assert_eq!(codes(&found).last(), Some(&"LIL"));
        assert!(!codes(&found).contains(&"LYS"));
    }

    #[test]
    fn faster_transport_widens_reach() {
        let set: AirportSet = "city:Paris@180".parse().unwrap();
        let found = resolver().with_train_speed(150.0).resolve(&set).unwrap();
        assert!(codes(&found).contains(&"LYS"));
    }

    #[test]
    fn unknown_city_or_nothing_in_reach_fails() {
        let resolver = resolver();
        let unknown: AirportSet = "city:Atlantis@60".parse().unwrap();
        assert!(matches!(resolver.resolve(&unknown), Err(Error::Resolution(_))));

        let melun: AirportSet = "city:Melun@1".parse().unwrap();
        assert!(matches!(resolver.resolve(&melun), Err(Error::Resolution(_))));
    }

    #[test]
    fn literal_codes_pass_through() {
        let set: AirportSet = "JFK".parse().unwrap();
        assert_eq!(codes(&resolver().resolve(&set).unwrap()), vec!["JFK"]);
    }
}
