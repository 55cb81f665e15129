//! SQLite persistence adapters.
//!
//! Provides the durable route and price history store using Diesel ORM.

pub mod database;
pub mod store;

pub use store::SqliteStore;
