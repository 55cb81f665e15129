//! Resolver for literal code sets.

use crate::domain::{AirportCode, AirportSet};
use crate::error::{Error, Result};
use crate::port::AirportResolver;

/// Passes literal codes through and rejects every rule.
///
/// Used when no airport catalog is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiteralResolver;

impl AirportResolver for LiteralResolver {
    fn resolve(&self, set: &AirportSet) -> Result<Vec<AirportCode>> {
        set.literal_codes().map(<[AirportCode]>::to_vec).ok_or_else(|| {
            Error::Resolution(format!("'{set}' needs an airport catalog to resolve"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_codes_pass_through_in_order() {
        let set: AirportSet = "ORY,CDG".parse().unwrap();
        let codes = LiteralResolver.resolve(&set).unwrap();
        assert_eq!(codes[0].as_str(), "ORY");
        assert_eq!(codes[1].as_str(), "CDG");
    }

    #[test]
    fn rules_are_rejected() {
        let set: AirportSet = "country:France".parse().unwrap();
        let err = LiteralResolver.resolve(&set).unwrap_err();
        assert!(matches!(err, Error::Resolution(_)));
        assert!(err.to_string().contains("country:France"));
    }
}
