//! Handlers for `route add|list|show|remove`.

use serde_json::json;
use tabled::Tabled;

use crate::adapter::inbound::cli::command::RouteAddArgs;
use crate::adapter::inbound::cli::output;
use crate::domain::{DateRange, PriceObservation, RouteConfig, RouteId, TripDuration};
use crate::error::{Error, Result};
use crate::infrastructure::bootstrap::Services;

#[derive(Tabled)]
struct RouteRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "From")]
    origin: String,
    #[tabled(rename = "To")]
    destination: String,
    #[tabled(rename = "Dates")]
    window: String,
    #[tabled(rename = "Stay")]
    stay: String,
    #[tabled(rename = "Best")]
    best: String,
}

impl RouteRow {
    fn new(route: &RouteConfig, best: Option<&PriceObservation>) -> Self {
        Self {
            id: route.id().to_string(),
            name: route.name().to_string(),
            origin: route.origin().to_string(),
            destination: route.destination().to_string(),
            window: format!(
                "{} → {}",
                route.date_window().start(),
                route.date_window().end()
            ),
            stay: stay_label(route.trip_duration()),
            best: best.map_or_else(|| "-".to_string(), price_label),
        }
    }
}

fn stay_label(trip: TripDuration) -> String {
    if trip.min_days() == trip.max_days() {
        format!("{}d", trip.min_days())
    } else {
        format!("{}-{}d", trip.min_days(), trip.max_days())
    }
}

fn price_label(observation: &PriceObservation) -> String {
    format!(
        "{} {} ({})",
        observation.price(),
        observation.currency(),
        observation.date()
    )
}

/// Build a route from `route add` arguments.
///
/// # Errors
/// Returns the first violated route rule.
pub fn route_from_args(args: RouteAddArgs) -> Result<RouteConfig> {
    let id = args
        .id
        .map_or_else(|| RouteId::from_name(&args.name), RouteId::new);
    let route = RouteConfig::new(
        id,
        args.name,
        args.origin,
        args.destination,
        DateRange::new(args.start, args.end)?,
        TripDuration::new(args.min_days, args.max_days)?,
    )?;
    let route = match args.max_flight_hours {
        Some(hours) => route.with_max_flight_hours(hours)?,
        None => route,
    };
    Ok(route.with_price_limit(args.price_limit)?)
}

/// Execute `route add`.
pub async fn add(services: &Services, args: RouteAddArgs) -> Result<()> {
    let route = route_from_args(args)?;
    services.routes.add(route.clone()).await?;

    if output::is_json() {
        output::json_output(json!({
            "command": "route.add",
            "route": route,
        }));
        return Ok(());
    }

    output::success(&format!(
        "Route {} added ({})",
        output::highlight(route.id()),
        route.name()
    ));
    if route.origin().literal_codes().is_none() || route.destination().literal_codes().is_none()
    {
        output::hint("country and city sets need [resolver] catalog files to be checked");
    }
    Ok(())
}

/// Execute `route list`.
pub async fn list(services: &Services) -> Result<()> {
    let routes = services.routes.list().await?;

    let mut rows = Vec::with_capacity(routes.len());
    let mut entries = Vec::with_capacity(routes.len());
    for route in &routes {
        let best = services.history.best_ever(route.id()).await?;
        rows.push(RouteRow::new(route, best.as_ref()));
        entries.push(json!({ "route": route, "best_ever": best }));
    }

    if output::is_json() {
        output::json_output(json!({
            "command": "route.list",
            "routes": entries,
        }));
        return Ok(());
    }

    if rows.is_empty() {
        output::note("No routes tracked");
        output::hint("add one with `farewatch route add`");
        return Ok(());
    }
    output::table(rows);
    Ok(())
}

/// Execute `route show`.
pub async fn show(services: &Services, id: &RouteId) -> Result<()> {
    let route = services.routes.require(id).await?;
    let history = services.history.history(id).await?;
    let best = history.best_ever();

    if output::is_json() {
        output::json_output(json!({
            "command": "route.show",
            "route": route,
            "observations": history.len(),
            "best_ever": best,
            "latest": history.latest(),
        }));
        return Ok(());
    }

    output::section(route.name());
    output::field("ID", route.id());
    output::field("From", route.origin());
    output::field("To", route.destination());
    output::field(
        "Dates",
        format!(
            "{} → {}",
            route.date_window().start(),
            route.date_window().end()
        ),
    );
    output::field("Stay", stay_label(route.trip_duration()));
    output::field("Max flight", format!("{}h", route.max_flight_hours()));
    if let Some(limit) = route.price_limit() {
        output::field("Limit", limit);
    }
    output::field("Prices", history.len());
    match best {
        Some(best) => output::field("Best", output::positive(price_label(best))),
        None => output::field("Best", output::muted("none yet")),
    }
    if let Some(latest) = history.latest() {
        output::field("Latest", price_label(latest));
    }
    Ok(())
}

/// Execute `route remove`.
pub async fn remove(services: &Services, id: &RouteId) -> Result<()> {
    if !services.routes.remove(id).await? {
        return Err(Error::UnknownRoute(id.clone()));
    }

    if output::is_json() {
        output::json_output(json!({
            "command": "route.remove",
            "route_id": id,
        }));
        return Ok(());
    }
    output::success(&format!("Route {} removed with its history", output::highlight(id)));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AirportSet;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn args() -> RouteAddArgs {
        RouteAddArgs {
            name: "Paris to Tokyo".into(),
            id: None,
            origin: "CDG,ORY".parse::<AirportSet>().unwrap(),
            destination: "NRT".parse::<AirportSet>().unwrap(),
            start: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2025, 5, 31).unwrap(),
            min_days: 7,
            max_days: 14,
            max_flight_hours: Some(16),
            price_limit: Some(dec!(650)),
        }
    }

    #[test]
    fn builds_route_with_derived_id() {
        let route = route_from_args(args()).unwrap();
        assert_eq!(route.id(), &RouteId::from_name("Paris to Tokyo"));
        assert_eq!(route.max_flight_hours(), 16);
        assert_eq!(route.price_limit(), Some(dec!(650)));
    }

    #[test]
    fn rejects_inverted_window() {
        let mut bad = args();
        bad.end = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
        assert!(matches!(route_from_args(bad), Err(Error::Domain(_))));
    }

    #[test]
    fn stay_label_collapses_fixed_length() {
        assert_eq!(stay_label(TripDuration::exactly(7)), "7d");
        assert_eq!(stay_label(TripDuration::new(3, 5).unwrap()), "3-5d");
    }
}
