//! farewatch - a flight fare watcher.
//!
//! farewatch tracks round-trip searches ("routes"), asks a price source for
//! the cheapest fare on a schedule, keeps one price per route per day, and
//! raises alerts when a fare hits a new low, drops sharply, or falls under
//! a limit.
//!
//! # Architecture
//!
//! The crate is laid out as ports and adapters:
//!
//! - [`domain`] - routes, airport sets, observations, and the per-route
//!   price history with its invariants. No I/O.
//! - [`port`] - the traits the core talks through: price fetcher, airport
//!   resolver, route and history stores, notifier.
//! - [`application`] - the use cases: history recording with the same-day
//!   policy, alert evaluation, route management, legacy import, and the
//!   polling [`Scheduler`](application::scheduler::Scheduler).
//! - [`adapter`] - SQLite and in-memory stores, command and HTTP fetchers,
//!   the airport catalog, Telegram, and the CLI.
//! - [`infrastructure`] - configuration loading and runtime wiring.
//!
//! # Features
//!
//! - `telegram` - send alerts to a Telegram chat.
//! - `testkit` - expose [`testkit`] helpers to integration tests.
//!
//! # Example
//!
//! ```
//! use farewatch::infrastructure::config::Config;
//!
//! let config = Config::parse_toml(
//!     r#"
//! [scheduler]
//! interval_secs = 3600
//!
//! [fetcher]
//! type = "command"
//! program = "fare-scraper"
//! "#,
//! )
//! .unwrap();
//! assert_eq!(config.scheduler.interval_secs, 3600);
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
