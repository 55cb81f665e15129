//! Handlers for `history` and `best`.

use serde_json::json;
use tabled::Tabled;

use crate::adapter::inbound::cli::command::HistoryArgs;
use crate::adapter::inbound::cli::output;
use crate::domain::{PriceObservation, RouteId};
use crate::error::Result;
use crate::infrastructure::bootstrap::Services;

#[derive(Tabled)]
struct ObservationRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Flight")]
    flight: String,
    #[tabled(rename = "")]
    marker: String,
}

impl ObservationRow {
    fn new(observation: &PriceObservation, best: bool) -> Self {
        let flight = observation.itinerary().map_or_else(String::new, |it| {
            format!("{}→{} {}", it.departure, it.destination, it.company)
        });
        Self {
            date: observation.date().to_string(),
            price: format!("{} {}", observation.price(), observation.currency()),
            flight: flight.trim_end().to_string(),
            marker: if best { "best".to_string() } else { String::new() },
        }
    }
}

/// Execute `history`.
pub async fn execute(services: &Services, args: &HistoryArgs) -> Result<()> {
    let id = RouteId::new(args.route.as_str());
    let route = services.routes.require(&id).await?;
    let history = services.history.history(&id).await?;
    let best_date = history.best_ever().map(PriceObservation::date);

    let skip = args
        .limit
        .map_or(0, |limit| history.len().saturating_sub(limit));
    let shown: Vec<&PriceObservation> = history.iter().skip(skip).collect();

    if output::is_json() {
        output::json_output(json!({
            "command": "history",
            "route_id": id,
            "observations": shown,
            "best_ever": history.best_ever(),
        }));
        return Ok(());
    }

    output::section(route.name());
    if shown.is_empty() {
        output::note("No prices recorded yet");
        return Ok(());
    }
    output::table(
        shown
            .iter()
            .map(|obs| ObservationRow::new(obs, Some(obs.date()) == best_date)),
    );
    if skip > 0 {
        output::note(&format!("{skip} older days not shown"));
    }
    Ok(())
}

/// Execute `best`.
pub async fn best(services: &Services, id: &RouteId) -> Result<()> {
    let route = services.routes.require(id).await?;
    let best = services.history.best_ever(id).await?;

    if output::is_json() {
        output::json_output(json!({
            "command": "best",
            "route_id": id,
            "best_ever": best,
        }));
        return Ok(());
    }

    let Some(best) = best else {
        output::note(&format!("No prices recorded yet for {}", route.name()));
        return Ok(());
    };
    output::section(route.name());
    output::field(
        "Best",
        output::positive(format!("{} {}", best.price(), best.currency())),
    );
    output::field("Seen on", best.date());
    if let Some(itinerary) = best.itinerary() {
        output::field(
            "Flight",
            format!("{} → {}", itinerary.departure, itinerary.destination),
        );
        if !itinerary.company.is_empty() {
            output::field("Airline", &itinerary.company);
        }
        if let (Some(out), Some(back)) = (itinerary.departure_date, itinerary.return_date) {
            output::field("Trip", format!("{out} → {back}"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::domain::{day, observation};

    #[test]
    fn row_marks_best() {
        let row = ObservationRow::new(&observation(day(3), 199), true);
        assert_eq!(row.date, day(3).to_string());
        assert_eq!(row.marker, "best");
        assert!(row.flight.is_empty());
    }
}
