//! Route management use cases.
//!
//! Keeps the store and the scheduler in step: a saved route is watched, an
//! edited route restarts its polling, a removed route stops polling and
//! loses its history.

use std::sync::Arc;

use tracing::info;

use crate::application::history::HistoryService;
use crate::application::scheduler::Scheduler;
use crate::domain::{RouteConfig, RouteId};
use crate::error::{Error, Result};
use crate::port::RouteStore;

/// CRUD over tracked routes.
pub struct RouteService {
    store: Arc<dyn RouteStore>,
    history: Arc<HistoryService>,
    scheduler: Option<Arc<Scheduler>>,
}

impl RouteService {
    #[must_use]
    pub fn new(store: Arc<dyn RouteStore>, history: Arc<HistoryService>) -> Self {
        Self {
            store,
            history,
            scheduler: None,
        }
    }

    /// Mirror route changes into a scheduler.
    #[must_use]
    pub fn with_scheduler(mut self, scheduler: Arc<Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Add a new route.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateRoute`] if the ID is taken, or the
    /// validation error of an invalid route.
    pub async fn add(&self, route: RouteConfig) -> Result<()> {
        route.validate()?;
        self.store.insert_route(&route).await?;
        info!(route_id = %route.id(), name = %route.name(), "Route added");
        self.watch(route);
        Ok(())
    }

    /// Replace an existing route's parameters. History is kept.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownRoute`] if the route does not exist.
    pub async fn update(&self, route: RouteConfig) -> Result<()> {
        route.validate()?;
        if self.store.get_route(route.id()).await?.is_none() {
            return Err(Error::UnknownRoute(route.id().clone()));
        }
        self.store.save_route(&route).await?;
        info!(route_id = %route.id(), name = %route.name(), "Route updated");
        self.watch(route);
        Ok(())
    }

    /// Add or replace a route.
    pub async fn upsert(&self, route: RouteConfig) -> Result<()> {
        route.validate()?;
        self.store.save_route(&route).await?;
        self.watch(route);
        Ok(())
    }

    /// Remove a route and its history. Returns whether it existed.
    pub async fn remove(&self, id: &RouteId) -> Result<bool> {
        if let Some(scheduler) = &self.scheduler {
            scheduler.unwatch(id);
        }
        let existed = self.store.delete_route(id).await?;
        self.history.forget(id);
        if existed {
            info!(route_id = %id, "Route removed");
        }
        Ok(existed)
    }

    pub async fn get(&self, id: &RouteId) -> Result<Option<RouteConfig>> {
        self.store.get_route(id).await
    }

    /// Get a route that must exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownRoute`] if it does not.
    pub async fn require(&self, id: &RouteId) -> Result<RouteConfig> {
        self.get(id)
            .await?
            .ok_or_else(|| Error::UnknownRoute(id.clone()))
    }

    pub async fn list(&self) -> Result<Vec<RouteConfig>> {
        self.store.list_routes().await
    }

    fn watch(&self, route: RouteConfig) {
        if let Some(scheduler) = &self.scheduler {
            scheduler.watch(route);
        }
    }
}
