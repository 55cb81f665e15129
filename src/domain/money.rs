//! Monetary types for fare representation.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// Price represented as a Decimal for precision.
pub type Price = Decimal;

/// ISO 4217 currency code, stored upper-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    /// Validate and normalize a currency code.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidCurrency`] unless the input is three
    /// ASCII letters.
    pub fn try_new(code: &str) -> Result<Self, DomainError> {
        let trimmed = code.trim();
        if trimmed.len() != 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DomainError::InvalidCurrency {
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

/// Fares default to euros.
impl Default for Currency {
    fn default() -> Self {
        Self("EUR".to_string())
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Currency {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_new(&value)
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_defaults_to_eur() {
        assert_eq!(Currency::default().as_str(), "EUR");
    }

    #[test]
    fn currency_normalizes_and_validates() {
        assert_eq!(Currency::try_new("usd").unwrap().as_str(), "USD");
        assert!(Currency::try_new("US").is_err());
        assert!(Currency::try_new("€").is_err());
    }
}
