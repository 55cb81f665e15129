//! Per-route price history.
//!
//! A [`PriceHistory`] is an ordered log of [`PriceObservation`]s with at
//! most one entry per calendar day. The best-ever price is always derived
//! from the log on demand, so it can never drift from the stored sequence.
//!
//! # Examples
//!
//! ```
//! use chrono::NaiveDate;
//! use farewatch::domain::{Currency, PriceHistory, PriceObservation};
//! use rust_decimal::Decimal;
//!
//! let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
//! let obs = |d, p| PriceObservation::new(day(d), Decimal::new(p, 0), Currency::default());
//!
//! let mut history = PriceHistory::new();
//! history.upsert(obs(1, 120)).unwrap();
//! let outcome = history.upsert(obs(2, 95)).unwrap();
//! history.upsert(obs(3, 130)).unwrap();
//!
//! assert!(outcome.is_new_best());
//! assert_eq!(history.best_ever().unwrap().price(), Decimal::new(95, 0));
//! assert_eq!(history.len(), 3);
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::money::Price;
use super::observation::PriceObservation;

/// What a successful record did to the history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordOutcome {
    new_best: bool,
    previous_best: Option<Price>,
    replaced: Option<PriceObservation>,
}

impl RecordOutcome {
    /// True when the recorded price is strictly below every price held
    /// before the write, or when it is the route's first observation.
    #[must_use]
    pub const fn is_new_best(&self) -> bool {
        self.new_best
    }

    /// Best-ever price before the write.
    #[must_use]
    pub const fn previous_best(&self) -> Option<Price> {
        self.previous_best
    }

    /// Same-day observation that was overwritten, if any.
    #[must_use]
    pub fn replaced(&self) -> Option<&PriceObservation> {
        self.replaced.as_ref()
    }
}

/// Ordered, one-per-day log of observations for a single route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<PriceObservation>", into = "Vec<PriceObservation>")]
pub struct PriceHistory {
    observations: Vec<PriceObservation>,
}

impl PriceHistory {
    /// Create an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the observation for its date.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidObservation`] for non-positive prices;
    /// the history is left untouched.
    pub fn upsert(&mut self, observation: PriceObservation) -> Result<RecordOutcome, DomainError> {
        observation.validate()?;

        let previous_best = self.best_ever().map(PriceObservation::price);
        let new_best = previous_best.map_or(true, |best| observation.price() < best);

        let replaced = match self.position(observation.date()) {
            Ok(index) => Some(std::mem::replace(&mut self.observations[index], observation)),
            Err(index) => {
                self.observations.insert(index, observation);
                None
            }
        };

        Ok(RecordOutcome {
            new_best,
            previous_best,
            replaced,
        })
    }

    /// Cheapest observation ever recorded; the earliest one on ties.
    #[must_use]
    pub fn best_ever(&self) -> Option<&PriceObservation> {
        self.observations
            .iter()
            .min_by(|a, b| a.price().cmp(&b.price()))
    }

    /// Observation recorded for `date`, if any.
    #[must_use]
    pub fn get(&self, date: NaiveDate) -> Option<&PriceObservation> {
        self.position(date).ok().map(|index| &self.observations[index])
    }

    /// Most recent observation.
    #[must_use]
    pub fn latest(&self) -> Option<&PriceObservation> {
        self.observations.last()
    }

    /// Observations in ascending date order.
    pub fn iter(&self) -> std::slice::Iter<'_, PriceObservation> {
        self.observations.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    fn position(&self, date: NaiveDate) -> Result<usize, usize> {
        self.observations
            .binary_search_by_key(&date, PriceObservation::date)
    }
}

/// Builds a history from unordered input; later duplicates of a date win.
impl From<Vec<PriceObservation>> for PriceHistory {
    fn from(mut observations: Vec<PriceObservation>) -> Self {
        // Stable sort keeps input order within a date, so the last one is kept.
        observations.sort_by_key(PriceObservation::date);
        let mut deduped: Vec<PriceObservation> = Vec::with_capacity(observations.len());
        for observation in observations {
            match deduped.last_mut() {
                Some(last) if last.date() == observation.date() => *last = observation,
                _ => deduped.push(observation),
            }
        }
        Self {
            observations: deduped,
        }
    }
}

impl From<PriceHistory> for Vec<PriceObservation> {
    fn from(history: PriceHistory) -> Self {
        history.observations
    }
}

impl FromIterator<PriceObservation> for PriceHistory {
    fn from_iter<I: IntoIterator<Item = PriceObservation>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl<'a> IntoIterator for &'a PriceHistory {
    type Item = &'a PriceObservation;
    type IntoIter = std::slice::Iter<'a, PriceObservation>;

    fn into_iter(self) -> Self::IntoIter {
        self.observations.iter()
    }
}

impl IntoIterator for PriceHistory {
    type Item = PriceObservation;
    type IntoIter = std::vec::IntoIter<PriceObservation>;

    fn into_iter(self) -> Self::IntoIter {
        self.observations.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::Currency;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn obs(d: u32, price: Price) -> PriceObservation {
        PriceObservation::new(day(d), price, Currency::default())
    }

    #[test]
    fn upsert_keeps_dates_sorted_regardless_of_insert_order() {
        let mut history = PriceHistory::new();
        for d in [5, 1, 3, 2, 4] {
            history.upsert(obs(d, dec!(100) + Price::from(d))).unwrap();
        }
        let dates: Vec<_> = history.iter().map(PriceObservation::date).collect();
        assert_eq!(dates, vec![day(1), day(2), day(3), day(4), day(5)]);
    }

    #[test]
    fn same_date_overwrites_entirely() {
        let mut history = PriceHistory::new();
        history.upsert(obs(1, dec!(120))).unwrap();
        let outcome = history.upsert(obs(1, dec!(140))).unwrap();

        assert_eq!(history.len(), 1);
        assert_eq!(history.get(day(1)).unwrap().price(), dec!(140));
        assert_eq!(outcome.replaced().unwrap().price(), dec!(120));
        assert!(!outcome.is_new_best());
    }

    #[test]
    fn best_ever_follows_overwrites() {
        let mut history = PriceHistory::new();
        history.upsert(obs(1, dec!(80))).unwrap();
        history.upsert(obs(2, dec!(100))).unwrap();
        history.upsert(obs(1, dec!(150))).unwrap();
        assert_eq!(history.best_ever().unwrap().price(), dec!(100));
    }

    #[test]
    fn first_observation_is_new_best_and_ties_are_not() {
        let mut history = PriceHistory::new();
        assert!(history.upsert(obs(1, dec!(99))).unwrap().is_new_best());
        let tie = history.upsert(obs(2, dec!(99))).unwrap();
        assert!(!tie.is_new_best());
        assert_eq!(tie.previous_best(), Some(dec!(99)));
        assert_eq!(history.best_ever().unwrap().date(), day(1));
    }

    #[test]
    fn invalid_price_leaves_history_untouched() {
        let mut history = PriceHistory::new();
        history.upsert(obs(1, dec!(50))).unwrap();
        let before = history.clone();

        let err = history.upsert(obs(1, dec!(-1))).unwrap_err();
        assert_eq!(err, DomainError::InvalidObservation { price: dec!(-1) });
        assert_eq!(history, before);
    }

    #[test]
    fn from_vec_sorts_and_keeps_last_duplicate() {
        let history: PriceHistory =
            vec![obs(3, dec!(30)), obs(1, dec!(10)), obs(3, dec!(33))].into();
        let prices: Vec<_> = history.iter().map(PriceObservation::price).collect();
        assert_eq!(prices, vec![dec!(10), dec!(33)]);
    }

    #[test]
    fn serde_round_trip_preserves_order_and_best() {
        let history: PriceHistory =
            vec![obs(1, dec!(120)), obs(2, dec!(95)), obs(3, dec!(130))].into();
        let json = serde_json::to_string(&history).unwrap();
        let back: PriceHistory = serde_json::from_str(&json).unwrap();
        assert_eq!(back, history);
        assert_eq!(back.best_ever(), history.best_ever());
    }
}
