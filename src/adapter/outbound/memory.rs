//! In-memory store.
//!
//! Used by tests and by embedders that need no durability. Readers get
//! cloned snapshots, so a history handed out is never mutated behind the
//! caller's back.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::domain::{PriceHistory, PriceObservation, RecordOutcome, RouteConfig, RouteId};
use crate::error::{Error, Result};
use crate::port::{HistoryStore, RouteStore};

#[derive(Default)]
struct Inner {
    routes: HashMap<RouteId, RouteConfig>,
    histories: HashMap<RouteId, PriceHistory>,
}

/// Volatile route and history store.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RouteStore for MemoryStore {
    async fn save_route(&self, route: &RouteConfig) -> Result<()> {
        route.validate()?;
        self.inner
            .write()
            .routes
            .insert(route.id().clone(), route.clone());
        Ok(())
    }

    async fn insert_route(&self, route: &RouteConfig) -> Result<()> {
        route.validate()?;
        let mut inner = self.inner.write();
        if inner.routes.contains_key(route.id()) {
            return Err(Error::DuplicateRoute(route.id().clone()));
        }
        inner.routes.insert(route.id().clone(), route.clone());
        Ok(())
    }

    async fn get_route(&self, id: &RouteId) -> Result<Option<RouteConfig>> {
        Ok(self.inner.read().routes.get(id).cloned())
    }

    async fn list_routes(&self) -> Result<Vec<RouteConfig>> {
        let mut routes: Vec<_> = self.inner.read().routes.values().cloned().collect();
        routes.sort_by(|a, b| a.name().cmp(b.name()).then_with(|| a.id().cmp(b.id())));
        Ok(routes)
    }

    async fn delete_route(&self, id: &RouteId) -> Result<bool> {
        let mut inner = self.inner.write();
        inner.histories.remove(id);
        Ok(inner.routes.remove(id).is_some())
    }
}

#[async_trait]
impl HistoryStore for MemoryStore {
    async fn record(
        &self,
        route_id: &RouteId,
        observation: &PriceObservation,
    ) -> Result<RecordOutcome> {
        let mut inner = self.inner.write();
        if !inner.routes.contains_key(route_id) {
            return Err(Error::UnknownRoute(route_id.clone()));
        }
        let outcome = inner
            .histories
            .entry(route_id.clone())
            .or_default()
            .upsert(observation.clone())?;
        Ok(outcome)
    }

    async fn history(&self, route_id: &RouteId) -> Result<PriceHistory> {
        Ok(self
            .inner
            .read()
            .histories
            .get(route_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;
    use crate::testkit::domain::{day, observation, route};

    #[tokio::test]
    async fn record_requires_known_route() {
        let store = MemoryStore::new();
        let err = store
            .record(&RouteId::new("ghost"), &observation(day(1), 100))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnknownRoute(_)));
    }

    #[tokio::test]
    async fn invalid_observation_leaves_history_untouched() {
        let store = MemoryStore::new();
        let r = route("a");
        store.save_route(&r).await.unwrap();
        store.record(r.id(), &observation(day(1), 100)).await.unwrap();

        let err = store.record(r.id(), &observation(day(2), 0)).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Domain(DomainError::InvalidObservation { .. })
        ));
        assert_eq!(store.history(r.id()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_cascades_to_history() {
        let store = MemoryStore::new();
        let r = route("a");
        store.save_route(&r).await.unwrap();
        store.record(r.id(), &observation(day(1), 100)).await.unwrap();

        assert!(store.delete_route(r.id()).await.unwrap());
        assert!(!store.delete_route(r.id()).await.unwrap());
        assert!(store.history(r.id()).await.unwrap().is_empty());
        assert!(store.best_ever(r.id()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn snapshots_do_not_see_later_writes() {
        let store = MemoryStore::new();
        let r = route("a");
        store.save_route(&r).await.unwrap();
        store.record(r.id(), &observation(day(1), 100)).await.unwrap();

        let snapshot = store.history(r.id()).await.unwrap();
        store.record(r.id(), &observation(day(2), 90)).await.unwrap();

        assert_eq!(snapshot.len(), 1);
        assert_eq!(store.history(r.id()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn list_is_ordered_by_name() {
        let store = MemoryStore::new();
        store.save_route(&route("b")).await.unwrap();
        store.save_route(&route("a")).await.unwrap();
        let names: Vec<_> = store
            .list_routes()
            .await
            .unwrap()
            .iter()
            .map(|r| r.name().to_string())
            .collect();
        assert_eq!(names, vec!["Route a", "Route b"]);
    }
}
