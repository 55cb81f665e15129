//! Price source port.

use async_trait::async_trait;

use crate::domain::{PriceObservation, ResolvedRoute};
use crate::error::FetchError;

/// Source of today's minimum fare for a route.
///
/// Implementations hide all scraping or API mechanics. The returned
/// observation should be dated with the calendar day of the fetch.
/// Callers enforce their own timeout; implementations may still block on
/// slow networks.
#[async_trait]
pub trait PriceFetcher: Send + Sync {
    /// Fetch the cheapest matching offer.
    async fn fetch(&self, route: &ResolvedRoute) -> Result<PriceObservation, FetchError>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}
