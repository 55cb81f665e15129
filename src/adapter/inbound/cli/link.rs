//! Handler for the `link` command.

use serde_json::json;

use crate::adapter::inbound::cli::output;
use crate::domain::RouteId;
use crate::error::Result;
use crate::infrastructure::bootstrap::Services;

/// Execute `link`: print the search page of the route's best flight.
pub async fn execute(services: &Services, id: &RouteId) -> Result<()> {
    services.routes.require(id).await?;
    let best = services.history.best_ever(id).await?;
    let url = best
        .as_ref()
        .and_then(|obs| obs.itinerary())
        .and_then(|itinerary| itinerary.search_url());

    if output::is_json() {
        output::json_output(json!({
            "command": "link",
            "route_id": id,
            "url": url.as_ref().map(url::Url::as_str),
        }));
        return Ok(());
    }

    match (best, url) {
        (_, Some(url)) => output::lines(url.as_str()),
        (None, None) => output::note("No prices recorded yet"),
        (Some(_), None) => {
            output::note("The best price has no flight details to link to");
        }
    }
    Ok(())
}
