//! Airport resolution port.

use crate::domain::{AirportCode, AirportSet};
use crate::error::Result;

/// Expands an [`AirportSet`] into concrete IATA codes.
///
/// Literal sets must resolve to exactly their codes. Rule-based sets
/// (country, nearby city) are implementation specific; an implementation
/// that cannot evaluate a rule returns [`crate::error::Error::Resolution`].
pub trait AirportResolver: Send + Sync {
    /// Resolve a set; the result is never empty on success.
    fn resolve(&self, set: &AirportSet) -> Result<Vec<AirportCode>>;
}
