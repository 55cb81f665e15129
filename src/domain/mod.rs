//! Pure domain types: routes, observations, and the price history log.
//!
//! Nothing in this module performs I/O. Adapters and application services
//! build on these types; the invariants of the history log (ordered dates,
//! one observation per day, derived best-ever) live here.

pub mod error;
pub mod history;
pub mod id;
pub mod money;
pub mod observation;
pub mod route;
pub mod search;

pub use error::DomainError;
pub use history::{PriceHistory, RecordOutcome};
pub use id::{AirportCode, RouteId};
pub use money::{Currency, Price};
pub use observation::{Itinerary, PriceObservation};
pub use route::{AirportSet, DateRange, ResolvedRoute, RouteConfig, TripDuration};
