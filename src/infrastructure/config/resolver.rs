//! Airport catalog configuration.

use std::path::PathBuf;

use serde::Deserialize;

use crate::adapter::outbound::resolver::catalog::DEFAULT_TRAIN_SPEED_KMH;

/// OurAirports catalog files used for country and city rules.
///
/// Without both files only literal airport codes can be watched.
#[derive(Debug, Clone, Deserialize)]
pub struct ResolverConfig {
    /// Path to `airports.csv`.
    #[serde(default)]
    pub airports_csv: Option<PathBuf>,
    /// Path to `countries.csv`.
    #[serde(default)]
    pub countries_csv: Option<PathBuf>,
    /// Ground transport speed for city rules (km/h).
    #[serde(default = "default_train_speed_kmh")]
    pub train_speed_kmh: f64,
}

const fn default_train_speed_kmh() -> f64 {
    DEFAULT_TRAIN_SPEED_KMH
}

impl ResolverConfig {
    /// Both catalog files, if configured.
    #[must_use]
    pub fn catalog_paths(&self) -> Option<(&PathBuf, &PathBuf)> {
        self.airports_csv.as_ref().zip(self.countries_csv.as_ref())
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            airports_csv: None,
            countries_csv: None,
            train_speed_kmh: default_train_speed_kmh(),
        }
    }
}
