//! Domain identifier types with proper encapsulation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// Route identifier - newtype for type safety.
///
/// Generated as UUID v4 for routes created at runtime, or derived from a
/// slug of the route name for routes seeded from configuration so the id is
/// stable across restarts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteId(String);

impl RouteId {
    /// Create a `RouteId` from an existing string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Create a new `RouteId` with a generated UUID.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Derive a stable id from a human-readable route name.
    ///
    /// ```
    /// use farewatch::domain::RouteId;
    ///
    /// assert_eq!(RouteId::from_name("Paris -> Tokyo").as_str(), "paris-tokyo");
    /// ```
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let mut slug = String::with_capacity(name.len());
        for ch in name.chars() {
            if ch.is_ascii_alphanumeric() {
                slug.push(ch.to_ascii_lowercase());
            } else if !slug.ends_with('-') && !slug.is_empty() {
                slug.push('-');
            }
        }
        while slug.ends_with('-') {
            slug.pop();
        }
        if slug.is_empty() {
            return Self::generate();
        }
        Self(slug)
    }

    /// Get the route ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RouteId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for RouteId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// IATA airport code, always stored upper-case.
///
/// The inner String is private so every value has passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AirportCode(String);

impl AirportCode {
    /// Validate and normalize an airport code.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidAirportCode`] unless the trimmed input
    /// is exactly three ASCII letters.
    pub fn try_new(code: &str) -> Result<Self, DomainError> {
        let trimmed = code.trim();
        if trimmed.len() != 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DomainError::InvalidAirportCode {
                code: code.to_string(),
            });
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// Get the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AirportCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AirportCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_new(s)
    }
}

impl TryFrom<String> for AirportCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_new(&value)
    }
}

impl From<AirportCode> for String {
    fn from(code: AirportCode) -> Self {
        code.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn airport_code_is_normalized_to_upper_case() {
        let code = AirportCode::try_new(" cdg ").unwrap();
        assert_eq!(code.as_str(), "CDG");
    }

    #[test]
    fn airport_code_rejects_wrong_length_and_digits() {
        assert!(AirportCode::try_new("CD").is_err());
        assert!(AirportCode::try_new("CDGX").is_err());
        assert!(AirportCode::try_new("C1G").is_err());
    }

    #[test]
    fn airport_code_deserializes_with_validation() {
        let ok: AirportCode = serde_json::from_str("\"nrt\"").unwrap();
        assert_eq!(ok.as_str(), "NRT");
        assert!(serde_json::from_str::<AirportCode>("\"tokyo\"").is_err());
    }

    #[test]
    fn route_id_slug_collapses_separators() {
        assert_eq!(RouteId::from_name("  BRU / NRT  summer ").as_str(), "bru-nrt-summer");
    }

    #[test]
    fn route_id_from_symbols_only_falls_back_to_uuid() {
        let id = RouteId::from_name("->");
        assert!(uuid::Uuid::parse_str(id.as_str()).is_ok());
    }
}
