//! Write-serializing front for the price history store.
//!
//! Every write for a route goes through one async mutex, so two writers
//! can never interleave a read-modify-write and lose an update. Readers
//! bypass the lock and get whatever snapshot the store hands out.

use std::sync::Arc;

use dashmap::DashMap;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::{PriceHistory, PriceObservation, RecordOutcome, RouteId};
use crate::error::Result;
use crate::port::HistoryStore;

/// Which observation survives when a route is priced twice in one day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SameDayPolicy {
    /// Keep the cheaper of the two.
    #[default]
    Lowest,
    /// Always overwrite with the newer one.
    Latest,
}

/// Serializes history writes per route and applies the same-day policy.
pub struct HistoryService {
    store: Arc<dyn HistoryStore>,
    policy: SameDayPolicy,
    locks: DashMap<RouteId, Arc<Mutex<()>>>,
}

impl HistoryService {
    #[must_use]
    pub fn new(store: Arc<dyn HistoryStore>, policy: SameDayPolicy) -> Self {
        Self {
            store,
            policy,
            locks: DashMap::new(),
        }
    }

    #[must_use]
    pub const fn policy(&self) -> SameDayPolicy {
        self.policy
    }

    /// Record an observation.
    ///
    /// Returns `Ok(None)` when the same-day policy kept the existing
    /// observation and nothing was written.
    ///
    /// # Errors
    ///
    /// Invalid observations are rejected before the policy is consulted.
    /// Store errors are passed through unchanged.
    pub async fn record(
        &self,
        route_id: &RouteId,
        observation: &PriceObservation,
    ) -> Result<Option<RecordOutcome>> {
        observation.validate()?;

        let lock = self.lock_for(route_id);
        let _guard = lock.lock().await;

        if self.policy == SameDayPolicy::Lowest {
            let history = self.store.history(route_id).await?;
            if let Some(existing) = history.get(observation.date()) {
                if existing.price() <= observation.price() {
                    debug!(
                        route_id = %route_id,
                        date = %observation.date(),
                        kept = %existing.price(),
                        offered = %observation.price(),
                        "Same-day observation kept"
                    );
                    return Ok(None);
                }
            }
        }

        self.store.record(route_id, observation).await.map(Some)
    }

    /// Snapshot of a route's history.
    pub async fn history(&self, route_id: &RouteId) -> Result<PriceHistory> {
        self.store.history(route_id).await
    }

    /// Cheapest observation ever recorded for a route.
    pub async fn best_ever(&self, route_id: &RouteId) -> Result<Option<PriceObservation>> {
        self.store.best_ever(route_id).await
    }

    /// Drop the write lock of a removed route.
    pub fn forget(&self, route_id: &RouteId) {
        self.locks.remove(route_id);
    }

    fn lock_for(&self, route_id: &RouteId) -> Arc<Mutex<()>> {
        self.locks
            .entry(route_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::memory::MemoryStore;
    use crate::domain::{Currency, DomainError};
    use crate::error::Error;
    use crate::port::RouteStore;
    use crate::testkit::domain::{day, route};
    use rust_decimal_macros::dec;

    fn obs(d: u32, price: rust_decimal::Decimal) -> PriceObservation {
        PriceObservation::new(day(d), price, Currency::default())
    }

    async fn service(policy: SameDayPolicy) -> (HistoryService, RouteId) {
        let store = Arc::new(MemoryStore::new());
        let r = route("route");
        store.save_route(&r).await.unwrap();
        (HistoryService::new(store, policy), r.id().clone())
    }

    #[tokio::test]
    async fn lowest_policy_keeps_cheaper_same_day_price() {
        let (service, id) = service(SameDayPolicy::Lowest).await;
        service.record(&id, &obs(1, dec!(200))).await.unwrap();

        let kept = service.record(&id, &obs(1, dec!(250))).await.unwrap();
        assert!(kept.is_none());

        let replaced = service.record(&id, &obs(1, dec!(150))).await.unwrap().unwrap();
        assert_eq!(replaced.replaced().unwrap().price(), dec!(200));

        let history = service.history(&id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history.get(day(1)).unwrap().price(), dec!(150));
    }

    #[tokio::test]
    async fn latest_policy_overwrites() {
        let (service, id) = service(SameDayPolicy::Latest).await;
        service.record(&id, &obs(1, dec!(200))).await.unwrap();
        let outcome = service.record(&id, &obs(1, dec!(250))).await.unwrap().unwrap();

        assert!(!outcome.is_new_best());
        assert_eq!(
            service.best_ever(&id).await.unwrap().unwrap().price(),
            dec!(250)
        );
    }

    #[tokio::test]
    async fn invalid_price_rejected_before_policy() {
        let (service, id) = service(SameDayPolicy::Lowest).await;
        service.record(&id, &obs(1, dec!(200))).await.unwrap();

        let err = service.record(&id, &obs(1, dec!(-5))).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Domain(DomainError::InvalidObservation { .. })
        ));
        assert_eq!(service.history(&id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn concurrent_writers_do_not_lose_updates() {
        let (service, id) = service(SameDayPolicy::Lowest).await;
        let service = Arc::new(service);

        let handles: Vec<_> = (1..=20u32)
            .map(|d| {
                let service = service.clone();
                let id = id.clone();
                tokio::spawn(async move {
                    service
                        .record(&id, &obs(d, rust_decimal::Decimal::from(100 + d)))
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let history = service.history(&id).await.unwrap();
        assert_eq!(history.len(), 20);
        assert_eq!(history.best_ever().unwrap().price(), dec!(101));
    }
}
