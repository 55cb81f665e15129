//! Airport resolver adapters.
//!
//! [`LiteralResolver`] accepts only literal code sets. [`CatalogResolver`]
//! evaluates country and nearby-city rules against an OurAirports catalog.

pub mod catalog;
pub mod literal;

pub use catalog::{AirportCatalog, CatalogResolver};
pub use literal::LiteralResolver;
