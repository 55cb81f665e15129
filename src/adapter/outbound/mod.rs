//! Outbound adapters (driven side).

pub mod fetcher;
pub mod memory;
pub mod notifier;
pub mod resolver;
pub mod sqlite;
