//! Polling scheduler.
//!
//! Drives one independent check cycle per watched route:
//!
//! ```text
//! interval ──► tick ──► resolve airports ──► fetch (timeout, retries)
//!                                                   │
//!                          notifier ◄── alerts ◄── record
//! ```
//!
//! Each route has its own interval task. Every tick runs as a separate
//! task and claims the route's in-flight flag first, so a tick that fires
//! while the previous one is still fetching is skipped instead of queued.
//! A failing route never delays or blocks any other route.
//!
//! The route store is the source of truth between ticks: every tick
//! reloads its route first, so edits saved by another process take effect
//! on the next tick and a deleted route stops being polled.

mod config;
mod retry;
mod state;

pub use config::SchedulerConfig;
pub use retry::Backoff;
pub use state::{CycleFailure, RouteState, RouteStatus, TickOutcome};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use state::RouteSlot;

use crate::application::alert::AlertPolicy;
use crate::application::history::HistoryService;
use crate::domain::{
    PriceHistory, PriceObservation, RecordOutcome, ResolvedRoute, RouteConfig, RouteId,
};
use crate::error::{Error, FetchError, Result};
use crate::port::{AirportResolver, Event, Notifier, PriceFetcher, RouteStore};

/// Periodic price checker for a set of routes.
pub struct Scheduler {
    config: SchedulerConfig,
    fetcher: Arc<dyn PriceFetcher>,
    resolver: Arc<dyn AirportResolver>,
    store: Arc<dyn RouteStore>,
    history: Arc<HistoryService>,
    alerts: AlertPolicy,
    notifier: Arc<dyn Notifier>,
    routes: DashMap<RouteId, Arc<RouteSlot>>,
    running: AtomicBool,
}

impl Scheduler {
    pub fn new(
        config: SchedulerConfig,
        fetcher: Arc<dyn PriceFetcher>,
        resolver: Arc<dyn AirportResolver>,
        store: Arc<dyn RouteStore>,
        history: Arc<HistoryService>,
        alerts: AlertPolicy,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            fetcher,
            resolver,
            store,
            history,
            alerts,
            notifier,
            routes: DashMap::new(),
            running: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Start polling every watched route.
    ///
    /// The first check of each route runs immediately. Routes halted by
    /// [`Scheduler::stop`] resume with their counters intact.
    pub fn start(self: &Arc<Self>) {
        self.running.store(true, Ordering::Release);
        for mut entry in self.routes.iter_mut() {
            if entry.value().is_removed() {
                let revived = Arc::new(entry.value().revive());
                *entry.value_mut() = revived;
            }
        }
        info!(
            routes = self.routes.len(),
            interval_secs = self.config.interval_secs,
            fetcher = self.fetcher.name(),
            "Scheduler started"
        );
        let slots: Vec<_> = self.routes.iter().map(|entry| entry.value().clone()).collect();
        for slot in slots {
            self.spawn_driver(&slot);
        }
    }

    /// Stop every route task. Routes end in the `Removed` state but stay
    /// listed, so their final status can still be read.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
        for entry in &self.routes {
            entry.value().remove();
        }
        info!("Scheduler stopped");
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Watch a route, replacing any route with the same ID.
    ///
    /// A replaced route's task is stopped; a running scheduler starts the
    /// new one right away.
    pub fn watch(self: &Arc<Self>, route: RouteConfig) {
        let name = route.name().to_string();
        let slot = Arc::new(RouteSlot::new(route));
        let id = slot.id().clone();
        if let Some(previous) = self.routes.insert(id.clone(), slot.clone()) {
            previous.remove();
            debug!(route_id = %id, "Route replaced");
        }
        info!(route_id = %id, name = %name, "Watching route");
        if self.is_running() {
            self.spawn_driver(&slot);
        }
    }

    /// Stop watching a route. Returns whether it was watched.
    ///
    /// A tick in progress is aborted; a tick that already finished
    /// fetching will not record its price.
    pub fn unwatch(&self, route_id: &RouteId) -> bool {
        match self.routes.remove(route_id) {
            Some((_, slot)) => {
                slot.remove();
                info!(route_id = %route_id, "Stopped watching route");
                true
            }
            None => false,
        }
    }

    /// Status of one route.
    #[must_use]
    pub fn status(&self, route_id: &RouteId) -> Option<RouteStatus> {
        self.routes
            .get(route_id)
            .map(|slot| slot.status.lock().clone())
    }

    /// Status of every watched route, ordered by name.
    #[must_use]
    pub fn snapshot(&self) -> Vec<RouteStatus> {
        let mut statuses: Vec<_> = self
            .routes
            .iter()
            .map(|entry| entry.value().status.lock().clone())
            .collect();
        statuses.sort_by(|a, b| a.route_name.cmp(&b.route_name));
        statuses
    }

    /// Run one check of a route now.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownRoute`] if the route is not watched. Every
    /// other failure is reported in the returned [`TickOutcome`].
    pub async fn tick(&self, route_id: &RouteId) -> Result<TickOutcome> {
        let slot = self
            .routes
            .get(route_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| Error::UnknownRoute(route_id.clone()))?;
        Ok(self.run_tick(&slot).await)
    }

    fn spawn_driver(self: &Arc<Self>, slot: &Arc<RouteSlot>) {
        slot.ensure_driver(|| {
            let scheduler = Arc::clone(self);
            let slot = Arc::clone(slot);
            tokio::spawn(async move { scheduler.drive(slot).await })
        });
    }

    async fn drive(self: Arc<Self>, slot: Arc<RouteSlot>) {
        let mut interval = tokio::time::interval(self.config.interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            if slot.is_removed() {
                break;
            }
            let scheduler = Arc::clone(&self);
            let tick_slot = Arc::clone(&slot);
            let task = tokio::spawn(async move {
                scheduler.run_tick(&tick_slot).await;
            });
            slot.track_tick(task);
        }
    }

    async fn run_tick(&self, slot: &RouteSlot) -> TickOutcome {
        let route_id = slot.id();
        if slot.is_removed() {
            return TickOutcome::Removed;
        }

        let Some(_in_flight) = slot.begin() else {
            slot.status.lock().skipped_ticks += 1;
            debug!(route_id = %route_id, "Previous check still running, tick skipped");
            return TickOutcome::Skipped;
        };

        let Some(route) = self.reload(slot).await else {
            return TickOutcome::Removed;
        };

        {
            let mut status = slot.status.lock();
            status.state = RouteState::Fetching;
            status.ticks += 1;
        }

        let outcome = self.check(slot, &route).await;

        let events = match &outcome {
            TickOutcome::Recorded(_) | TickOutcome::Unchanged => self.on_success(slot),
            TickOutcome::Failed(failure) => self.on_failure(slot, failure),
            TickOutcome::Skipped => Vec::new(),
            TickOutcome::Removed => {
                slot.mark_removed();
                Vec::new()
            }
        };
        for event in events {
            self.notifier.notify(event);
        }
        outcome
    }

    /// Current parameters of a route, or `None` once it is gone from the
    /// store.
    ///
    /// A store that cannot be read leaves the last known parameters in
    /// place; the record step reports the storage failure.
    async fn reload(&self, slot: &RouteSlot) -> Option<RouteConfig> {
        match self.store.get_route(slot.id()).await {
            Ok(Some(stored)) => {
                if slot.refresh(stored) {
                    info!(route_id = %slot.id(), "Route parameters changed, using the stored ones");
                }
                Some(slot.route())
            }
            Ok(None) => {
                self.retire(slot);
                None
            }
            Err(err) => {
                warn!(route_id = %slot.id(), error = %err, "Route reload failed, using last known parameters");
                Some(slot.route())
            }
        }
    }

    /// Stop polling a route that no longer exists in the store.
    fn retire(&self, slot: &RouteSlot) {
        let id = slot.id();
        self.routes
            .remove_if(id, |_, current| std::ptr::eq(Arc::as_ptr(current), slot));
        self.history.forget(id);
        slot.remove();
        info!(route_id = %id, "Route deleted from store, polling stopped");
    }

    async fn check(&self, slot: &RouteSlot, route: &RouteConfig) -> TickOutcome {
        let resolved = match self.resolve(route) {
            Ok(resolved) => resolved,
            Err(err) => return TickOutcome::Failed(CycleFailure::Resolve(err.to_string())),
        };

        let observation = match self.fetch_with_retry(&resolved).await {
            Ok(observation) => observation,
            Err(err) => return TickOutcome::Failed(CycleFailure::Fetch(err)),
        };

        if slot.is_removed() {
            debug!(route_id = %route.id(), "Route removed during fetch, price discarded");
            return TickOutcome::Removed;
        }

        match self.history.record(route.id(), &observation).await {
            Ok(Some(outcome)) => {
                slot.status.lock().last_price = Some(observation.price());
                info!(
                    route_id = %route.id(),
                    date = %observation.date(),
                    price = %observation.price(),
                    currency = %observation.currency(),
                    new_best = outcome.is_new_best(),
                    "Price recorded"
                );
                self.raise_alerts(route, &observation, &outcome).await;
                TickOutcome::Recorded(outcome)
            }
            Ok(None) => TickOutcome::Unchanged,
            Err(Error::Domain(err)) => TickOutcome::Failed(CycleFailure::Rejected(err.to_string())),
            Err(Error::UnknownRoute(_)) => {
                debug!(route_id = %route.id(), "Route deleted from store, price discarded");
                self.retire(slot);
                TickOutcome::Removed
            }
            Err(err) => TickOutcome::Failed(CycleFailure::Storage(err.to_string())),
        }
    }

    fn resolve(&self, route: &RouteConfig) -> Result<ResolvedRoute> {
        let origins = self.resolver.resolve(route.origin())?;
        let destinations = self.resolver.resolve(route.destination())?;
        Ok(ResolvedRoute::new(route, origins, destinations))
    }

    async fn fetch_with_retry(
        &self,
        route: &ResolvedRoute,
    ) -> std::result::Result<PriceObservation, FetchError> {
        let timeout = self.config.fetch_timeout();
        let max_attempts = self.config.max_attempts.max(1);
        let mut backoff = Backoff::new(&self.config);
        let mut attempt = 1;

        loop {
            let result = match tokio::time::timeout(timeout, self.fetcher.fetch(route)).await {
                Ok(result) => result,
                Err(_) => Err(FetchError::Timeout(timeout)),
            };

            match result {
                Ok(observation) => return Ok(observation),
                Err(err) if err.is_retryable() && attempt < max_attempts => {
                    let delay = backoff.next_delay();
                    let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
                    warn!(
                        route_id = %route.route_id,
                        attempt,
                        max_attempts,
                        error = %err,
                        delay_ms,
                        "Fetch failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn raise_alerts(
        &self,
        route: &RouteConfig,
        observation: &PriceObservation,
        outcome: &RecordOutcome,
    ) {
        let history = match self.history.history(route.id()).await {
            Ok(history) => history,
            Err(err) => {
                warn!(route_id = %route.id(), error = %err, "History unavailable for alerts");
                PriceHistory::new()
            }
        };
        for event in self.alerts.evaluate(route, observation, outcome, &history) {
            self.notifier.notify(event);
        }
    }

    fn on_success(&self, slot: &RouteSlot) -> Vec<Event> {
        let mut status = slot.status.lock();
        let mut events = Vec::new();
        if status.degraded {
            info!(route_id = %status.route_id, "Route recovered");
            events.push(Event::RouteRecovered {
                route_id: status.route_id.clone(),
            });
        }
        status.state = RouteState::Recorded;
        status.consecutive_failures = 0;
        status.degraded = false;
        status.storage_degraded = false;
        status.last_success = Some(Utc::now());
        status.last_error = None;
        events
    }

    fn on_failure(&self, slot: &RouteSlot, failure: &CycleFailure) -> Vec<Event> {
        let mut status = slot.status.lock();
        let mut events = Vec::new();
        status.state = RouteState::FetchFailed;
        status.consecutive_failures += 1;
        status.last_error = Some(failure.to_string());

        warn!(
            route_id = %status.route_id,
            consecutive_failures = status.consecutive_failures,
            error = %failure,
            "Price check failed"
        );

        if let CycleFailure::Storage(reason) = failure {
            status.storage_degraded = true;
            events.push(Event::StorageDegraded {
                route_id: status.route_id.clone(),
                reason: reason.clone(),
            });
        }

        if !status.degraded && status.consecutive_failures >= self.config.degraded_after {
            status.degraded = true;
            warn!(
                route_id = %status.route_id,
                consecutive_failures = status.consecutive_failures,
                "Route degraded"
            );
            events.push(Event::RouteDegraded {
                route_id: status.route_id.clone(),
                consecutive_failures: status.consecutive_failures,
                last_error: failure.to_string(),
            });
        }
        events
    }
}
