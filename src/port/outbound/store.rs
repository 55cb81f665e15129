//! Persistence ports for routes and their price history.

use async_trait::async_trait;

use crate::domain::{PriceHistory, PriceObservation, RecordOutcome, RouteConfig, RouteId};
use crate::error::Result;

/// Storage operations for tracked routes.
#[async_trait]
pub trait RouteStore: Send + Sync {
    /// Save a route, replacing its parameters if it exists.
    ///
    /// Replacing a route keeps its history.
    async fn save_route(&self, route: &RouteConfig) -> Result<()>;

    /// Save a route whose ID must not be taken yet.
    ///
    /// The check and the write are one step, so of two concurrent inserts
    /// of the same ID exactly one succeeds. The other fails with
    /// [`crate::error::Error::DuplicateRoute`] and leaves the stored route
    /// untouched.
    async fn insert_route(&self, route: &RouteConfig) -> Result<()>;

    /// Get a route by ID.
    async fn get_route(&self, id: &RouteId) -> Result<Option<RouteConfig>>;

    /// List all routes ordered by name.
    async fn list_routes(&self) -> Result<Vec<RouteConfig>>;

    /// Delete a route and its whole history. Returns whether it existed.
    async fn delete_route(&self, id: &RouteId) -> Result<bool>;
}

/// Storage operations for per-route price history.
///
/// `record` must be durable before it returns: a caller that saw `Ok`
/// can rely on the observation surviving a crash.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Insert or replace the observation for its date.
    ///
    /// Fails with [`crate::domain::DomainError::InvalidObservation`] for
    /// non-positive prices and [`crate::error::Error::UnknownRoute`] when
    /// the route does not exist; neither alters stored history.
    async fn record(&self, route_id: &RouteId, observation: &PriceObservation)
        -> Result<RecordOutcome>;

    /// Snapshot of the route's history in ascending date order.
    ///
    /// An unknown route has an empty history.
    async fn history(&self, route_id: &RouteId) -> Result<PriceHistory>;

    /// Cheapest observation ever recorded for the route.
    async fn best_ever(&self, route_id: &RouteId) -> Result<Option<PriceObservation>> {
        Ok(self.history(route_id).await?.best_ever().cloned())
    }
}

/// Combined store used by the application.
pub trait Store: RouteStore + HistoryStore {}

impl<T: RouteStore + HistoryStore> Store for T {}
