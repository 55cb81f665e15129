//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports are the seams between the polling core and everything it does not
//! own: the price source, airport lookup, persistence, and delivery of
//! notifications to the user.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │   Scheduler + History   │
//!                    └───────────┬─────────────┘
//!        ┌──────────────┬────────┴──────┬───────────────┐
//!        ▼              ▼               ▼               ▼
//!  ┌───────────┐  ┌───────────┐  ┌─────────────┐  ┌───────────┐
//!  │  Fetcher  │  │ Resolver  │  │    Store    │  │ Notifier  │
//!  └───────────┘  └───────────┘  └─────────────┘  └───────────┘
//! ```

pub mod outbound;

pub use outbound::fetcher::PriceFetcher;
pub use outbound::notifier::{
    Event, LogNotifier, Notifier, NotifierRegistry, NullNotifier, Severity,
};
pub use outbound::resolver::AirportResolver;
pub use outbound::store::{HistoryStore, RouteStore, Store};
