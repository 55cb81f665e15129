//! Handler for the `run` command.

use std::sync::Arc;

use serde_json::json;
use tokio::task::JoinSet;
use tracing::{error, info};

use crate::adapter::inbound::cli::command::RunArgs;
use crate::adapter::inbound::cli::output;
use crate::application::scheduler::{RouteStatus, Scheduler, TickOutcome};
use crate::domain::RouteConfig;
use crate::error::{ConfigError, Error, Result};
use crate::infrastructure::bootstrap::Services;

/// Execute the run command.
pub async fn execute(args: &RunArgs, services: Services) -> Result<()> {
    let services = services.with_scheduler()?;
    let scheduler = services
        .scheduler
        .clone()
        .ok_or(ConfigError::MissingField { field: "fetcher" })?;

    let seeded = services.seed_routes().await?;
    let watched = services.watch_stored_routes().await?;
    if !output::is_json() {
        print_startup(&services, seeded, watched);
    }

    if args.once {
        return check_once(&services, &scheduler).await;
    }

    if watched == 0 {
        output::warning("No routes to watch");
        output::hint("add one with `farewatch route add` or a [[routes]] table in the config");
    }

    scheduler.start();
    info!("farewatch running, press Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");
    scheduler.stop();

    print_statuses(&scheduler.snapshot());
    Ok(())
}

fn print_startup(services: &Services, seeded: usize, watched: usize) {
    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Database", services.database.display());
    if let Some(fetcher) = &services.config.fetcher {
        output::field("Fetcher", fetcher.describe());
    }
    output::field(
        "Interval",
        format!("{}s", services.config.scheduler.interval_secs),
    );
    output::field("Routes", watched);
    if seeded > 0 {
        output::field("Seeded", seeded);
    }
}

/// Check every route once and report each outcome in name order.
async fn check_once(services: &Services, scheduler: &Arc<Scheduler>) -> Result<()> {
    let routes = services.routes.list().await?;
    let checked = tick_all(scheduler, routes).await?;
    let mut results = Vec::with_capacity(checked.len());

    output::section("Checks");
    for (route, outcome) in &checked {
        if !output::is_json() {
            print_outcome(route, outcome);
        }
        results.push(json!({
            "route_id": route.id(),
            "outcome": outcome_label(outcome),
            "detail": outcome_detail(outcome),
        }));
    }

    if output::is_json() {
        output::json_output(json!({
            "command": "run",
            "once": true,
            "results": results,
        }));
    }
    Ok(())
}

/// Tick every route at the same time, so a hanging route holds back no
/// other. Results keep the order of `routes`.
async fn tick_all(
    scheduler: &Arc<Scheduler>,
    routes: Vec<RouteConfig>,
) -> Result<Vec<(RouteConfig, TickOutcome)>> {
    let mut tasks = JoinSet::new();
    for (index, route) in routes.iter().enumerate() {
        let scheduler = Arc::clone(scheduler);
        let id = route.id().clone();
        tasks.spawn(async move { (index, scheduler.tick(&id).await) });
    }

    let mut outcomes: Vec<Option<TickOutcome>> = vec![None; routes.len()];
    while let Some(joined) = tasks.join_next().await {
        let (index, outcome) = joined.map_err(|e| {
            error!(error = %e, "Route check task failed");
            Error::Task(e.to_string())
        })?;
        outcomes[index] = Some(outcome?);
    }

    Ok(routes
        .into_iter()
        .zip(outcomes)
        .filter_map(|(route, outcome)| outcome.map(|outcome| (route, outcome)))
        .collect())
}

fn print_outcome(route: &RouteConfig, outcome: &TickOutcome) {
    let name = route.name();
    match outcome {
        TickOutcome::Recorded(record) if record.is_new_best() => {
            output::success(&format!("{name}: {}", outcome_detail(outcome)));
        }
        TickOutcome::Recorded(_) | TickOutcome::Unchanged => {
            output::field(name, outcome_detail(outcome));
        }
        TickOutcome::Failed(_) => {
            output::warning(&format!("{name}: {}", outcome_detail(outcome)));
        }
        TickOutcome::Skipped | TickOutcome::Removed => {
            output::note(&format!("{name}: {}", outcome_label(outcome)));
        }
    }
}

fn outcome_label(outcome: &TickOutcome) -> &'static str {
    match outcome {
        TickOutcome::Recorded(_) => "recorded",
        TickOutcome::Unchanged => "unchanged",
        TickOutcome::Failed(_) => "failed",
        TickOutcome::Skipped => "skipped",
        TickOutcome::Removed => "removed",
    }
}

fn outcome_detail(outcome: &TickOutcome) -> String {
    match outcome {
        TickOutcome::Recorded(record) => match record.previous_best() {
            Some(previous) if record.is_new_best() => {
                format!("new best price (was {previous})")
            }
            None => "first price recorded".to_string(),
            Some(best) => format!("price recorded (best {best})"),
        },
        TickOutcome::Unchanged => "kept today's stored price".to_string(),
        TickOutcome::Failed(failure) => failure.to_string(),
        TickOutcome::Skipped => "previous check still running".to_string(),
        TickOutcome::Removed => "route removed".to_string(),
    }
}

fn print_statuses(statuses: &[RouteStatus]) {
    if output::is_json() {
        output::json_output(json!({
            "command": "run",
            "routes": statuses,
        }));
        return;
    }
    if statuses.is_empty() {
        return;
    }

    output::section("Routes");
    for status in statuses {
        let price = status
            .last_price
            .map_or_else(|| output::muted("-"), |price| price.to_string());
        let health = if status.degraded {
            output::negative("degraded")
        } else {
            output::positive("ok")
        };
        output::field(
            &status.route_name,
            format!("{price}  {health}  {} checks", status.ticks),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::memory::MemoryStore;
    use crate::adapter::outbound::resolver::LiteralResolver;
    use crate::application::alert::AlertPolicy;
    use crate::application::history::{HistoryService, SameDayPolicy};
    use crate::application::scheduler::CycleFailure;
    use crate::error::FetchError;
    use crate::port::{NullNotifier, RouteStore};
    use crate::testkit::domain::{day, named_route, observation};
    use crate::testkit::fetcher::{ScriptedFetcher, Step};

    #[tokio::test(start_paused = true)]
    async fn tick_all_checks_routes_side_by_side() {
        let store = Arc::new(MemoryStore::new());
        let fetcher = ScriptedFetcher::always(Step::price(observation(day(1), 300)))
            .route("slow-1", Vec::new(), Step::hang())
            .route("slow-2", Vec::new(), Step::hang());
        let scheduler = Arc::new(Scheduler::new(
            crate::testkit::config::scheduler(),
            Arc::new(fetcher),
            Arc::new(LiteralResolver),
            store.clone(),
            Arc::new(HistoryService::new(store.clone(), SameDayPolicy::Lowest)),
            AlertPolicy::default(),
            Arc::new(NullNotifier),
        ));
        let routes = vec![
            named_route("slow-1", "A slow"),
            named_route("fast", "B fast"),
            named_route("slow-2", "C slow"),
        ];
        for route in &routes {
            store.save_route(route).await.unwrap();
            scheduler.watch(route.clone());
        }

        let started = tokio::time::Instant::now();
        let checked = tick_all(&scheduler, routes).await.unwrap();

        // One route's three timed-out attempts, not two routes' worth.
        assert!(started.elapsed() < std::time::Duration::from_secs(4));
        let names: Vec<_> = checked.iter().map(|(route, _)| route.name()).collect();
        assert_eq!(names, vec!["A slow", "B fast", "C slow"]);
        assert!(matches!(checked[0].1, TickOutcome::Failed(_)));
        assert!(matches!(checked[1].1, TickOutcome::Recorded(_)));
        assert!(matches!(checked[2].1, TickOutcome::Failed(_)));
    }

    #[test]
    fn labels_cover_every_outcome() {
        assert_eq!(outcome_label(&TickOutcome::Unchanged), "unchanged");
        assert_eq!(outcome_label(&TickOutcome::Skipped), "skipped");
        let failed = TickOutcome::Failed(CycleFailure::Fetch(FetchError::NoResultsFound));
        assert_eq!(outcome_label(&failed), "failed");
        assert_eq!(outcome_detail(&failed), FetchError::NoResultsFound.to_string());
    }
}
