//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`fetcher`]: scripted [`PriceFetcher`](crate::port::PriceFetcher) for
//!   driving the scheduler through timeouts, failures, and slow responses.
//! - [`notifier`]: a notifier that records every event it receives.
//! - [`domain`]: builders for routes and observations.
//! - [`config`]: scheduler configurations without real waiting.

pub mod config;
pub mod domain;
pub mod fetcher;
pub mod notifier;
