//! Price fetcher adapters.
//!
//! Scraping stays outside the process. A fetcher hands the resolved route
//! to an external program or HTTP endpoint as JSON and reads back one
//! fare in the shape parsed by [`payload::parse_observation`].

pub mod command;
pub mod http;
pub mod payload;

pub use command::CommandFetcher;
pub use http::HttpFetcher;
