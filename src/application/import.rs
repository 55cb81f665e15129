//! Import of legacy `flight_records.jsonl` files.
//!
//! Each line is one JSON object:
//!
//! ```json
//! {"date": "2024-05-02", "departure": "CDG", "destination": "NRT",
//!  "company": "Air France", "duration_out": "13h 40min",
//!  "duration_return": "14h 5min", "price": 612.0,
//!  "dep_date": "2024-09-01", "arrival_date": "2024-09-15"}
//! ```
//!
//! `datetime` is accepted in place of `date`, and dates may carry an hour
//! suffix (`2024-05-02-14`). Prices are euros. Only the cheapest price per
//! calendar day is kept, both within the file and against history that
//! already exists.

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::application::history::HistoryService;
use crate::domain::{AirportCode, Currency, Itinerary, PriceObservation, RouteId};
use crate::error::Result;

/// Summary of one import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    /// Non-blank lines read.
    pub lines: usize,
    /// Days written to history.
    pub imported: usize,
    /// Days where history already held a price at least as low.
    pub kept_existing: usize,
    /// Lines that could not be used, with their 1-based line number.
    pub skipped: Vec<SkippedLine>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedLine {
    pub line: usize,
    pub reason: String,
}

#[derive(Debug, Deserialize)]
struct LegacyRecord {
    #[serde(alias = "datetime")]
    date: String,
    departure: Option<String>,
    destination: Option<String>,
    #[serde(default)]
    company: String,
    #[serde(default)]
    duration_out: String,
    #[serde(default)]
    duration_return: String,
    price: serde_json::Number,
    dep_date: Option<String>,
    arrival_date: Option<String>,
}

impl LegacyRecord {
    fn into_observation(self) -> std::result::Result<PriceObservation, String> {
        let date = parse_day(&self.date).ok_or_else(|| format!("bad date '{}'", self.date))?;
        let price = Decimal::from_str(&self.price.to_string())
            .map_err(|err| format!("bad price '{}': {err}", self.price))?;
        let observation = PriceObservation::new(date, price, Currency::default());
        observation.validate().map_err(|err| err.to_string())?;

        let itinerary = match (self.departure, self.destination) {
            (Some(departure), Some(destination)) => Some(Itinerary {
                departure: AirportCode::try_new(&departure).map_err(|err| err.to_string())?,
                destination: AirportCode::try_new(&destination).map_err(|err| err.to_string())?,
                company: self.company,
                duration_out: self.duration_out,
                duration_return: self.duration_return,
                departure_date: self.dep_date.as_deref().and_then(parse_day),
                return_date: self.arrival_date.as_deref().and_then(parse_day),
            }),
            _ => None,
        };

        Ok(match itinerary {
            Some(itinerary) => observation.with_itinerary(itinerary),
            None => observation,
        })
    }
}

/// `YYYY-MM-DD`, optionally followed by `-HH` or a time.
fn parse_day(raw: &str) -> Option<NaiveDate> {
    let day = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Parse JSON lines into the cheapest observation per day.
///
/// Malformed lines are reported, never fatal.
#[must_use]
pub fn parse_records(content: &str) -> (BTreeMap<NaiveDate, PriceObservation>, ImportReport) {
    let mut report = ImportReport::default();
    let mut cheapest: BTreeMap<NaiveDate, PriceObservation> = BTreeMap::new();

    for (index, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        report.lines += 1;

        let parsed = serde_json::from_str::<LegacyRecord>(line)
            .map_err(|err| err.to_string())
            .and_then(LegacyRecord::into_observation);

        match parsed {
            Ok(observation) => {
                let keep = cheapest
                    .get(&observation.date())
                    .map_or(true, |existing| observation.price() < existing.price());
                if keep {
                    cheapest.insert(observation.date(), observation);
                }
            }
            Err(reason) => {
                debug!(line = index + 1, %reason, "Skipping legacy record");
                report.skipped.push(SkippedLine {
                    line: index + 1,
                    reason,
                });
            }
        }
    }

    (cheapest, report)
}

/// Imports legacy records into a route's history.
pub struct ImportService<'a> {
    history: &'a HistoryService,
}

impl<'a> ImportService<'a> {
    #[must_use]
    pub const fn new(history: &'a HistoryService) -> Self {
        Self { history }
    }

    /// Import a JSON lines file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or a write to history fails.
    pub async fn import_file(&self, route_id: &RouteId, path: &Path) -> Result<ImportReport> {
        let content = tokio::fs::read_to_string(path).await?;
        self.import_str(route_id, &content).await
    }

    /// Import JSON lines from memory.
    ///
    /// # Errors
    ///
    /// Fails if a write to history fails, including for an unknown route.
    pub async fn import_str(&self, route_id: &RouteId, content: &str) -> Result<ImportReport> {
        let (cheapest, mut report) = parse_records(content);
        let existing = self.history.history(route_id).await?;

        for (date, observation) in cheapest {
            if existing
                .get(date)
                .is_some_and(|stored| stored.price() <= observation.price())
            {
                report.kept_existing += 1;
                continue;
            }
            match self.history.record(route_id, &observation).await? {
                Some(_) => report.imported += 1,
                None => report.kept_existing += 1,
            }
        }

        info!(
            route_id = %route_id,
            lines = report.lines,
            imported = report.imported,
            kept_existing = report.kept_existing,
            skipped = report.skipped.len(),
            "Legacy records imported"
        );
        Ok(report)
    }
}
