//! Path utilities for farewatch.
//!
//! All data lives under `~/.farewatch/`:
//! - `~/.farewatch/config.toml` - main configuration
//! - `~/.farewatch/farewatch.db` - routes and price history

use std::path::PathBuf;

/// Returns the farewatch home directory (`~/.farewatch/`).
pub fn home_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".farewatch")
}

/// Returns the default config file path (`~/.farewatch/config.toml`).
pub fn default_config() -> PathBuf {
    home_dir().join("config.toml")
}

/// Returns the default database path (`~/.farewatch/farewatch.db`).
pub fn default_database() -> PathBuf {
    home_dir().join("farewatch.db")
}
