//! Infrastructure configuration modules.

pub mod fetcher;
pub mod logging;
pub mod resolver;
pub mod route;
pub mod settings;
pub mod telegram;

pub use settings::Config;
