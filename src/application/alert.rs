//! Turns a recorded price into notifications.

use chrono::Duration;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::{PriceHistory, PriceObservation, RecordOutcome, RouteConfig};
use crate::port::outbound::notifier::{
    Event, LimitEvent, PriceDropEvent, PriceEvent, PriceJumpEvent,
};

/// Alert thresholds.
#[derive(Debug, Clone, Deserialize)]
pub struct AlertConfig {
    /// Fraction below the previous best that turns a new low into a drop alert.
    #[serde(default = "default_drop_threshold")]
    pub drop_threshold: Decimal,
    /// Fraction above an earlier price that counts as a jump.
    #[serde(default = "default_jump_threshold")]
    pub jump_threshold: Decimal,
    /// How many days back the jump comparison looks.
    #[serde(default = "default_jump_lookback_days")]
    pub jump_lookback_days: u32,
}

fn default_drop_threshold() -> Decimal {
    Decimal::new(10, 2) // 10%
}

fn default_jump_threshold() -> Decimal {
    Decimal::new(10, 2) // 10%
}

const fn default_jump_lookback_days() -> u32 {
    3
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            drop_threshold: default_drop_threshold(),
            jump_threshold: default_jump_threshold(),
            jump_lookback_days: default_jump_lookback_days(),
        }
    }
}

/// Stateless evaluator; everything it needs arrives with the call.
#[derive(Debug, Clone, Default)]
pub struct AlertPolicy {
    config: AlertConfig,
}

impl AlertPolicy {
    #[must_use]
    pub const fn new(config: AlertConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &AlertConfig {
        &self.config
    }

    /// Events for an observation that was just recorded.
    ///
    /// `history` must already contain the observation.
    #[must_use]
    pub fn evaluate(
        &self,
        route: &RouteConfig,
        observation: &PriceObservation,
        outcome: &RecordOutcome,
        history: &PriceHistory,
    ) -> Vec<Event> {
        let mut events = Vec::new();
        let base = || {
            PriceEvent::new(
                route.id().clone(),
                route.name(),
                observation,
                outcome.previous_best(),
            )
        };
        let price = observation.price();

        if outcome.is_new_best() {
            match outcome.previous_best() {
                Some(previous) if previous > Decimal::ZERO => {
                    let drop = (previous - price) / previous;
                    if drop >= self.config.drop_threshold {
                        events.push(Event::PriceDrop(PriceDropEvent { price: base(), drop }));
                    } else {
                        events.push(Event::NewBestEver(base()));
                    }
                }
                _ => events.push(Event::NewBestEver(base())),
            }
        }

        if let Some(limit) = route.price_limit() {
            if price <= limit {
                events.push(Event::BelowLimit(LimitEvent {
                    price: base(),
                    limit,
                }));
            }
        }

        let lookback = Duration::days(i64::from(self.config.jump_lookback_days));
        if let Some(reference) = observation
            .date()
            .checked_sub_signed(lookback)
            .and_then(|date| history.get(date))
        {
            let reference_price = reference.price();
            let ceiling = reference_price * (Decimal::ONE + self.config.jump_threshold);
            if reference_price > Decimal::ZERO && price > ceiling {
                events.push(Event::PriceJump(PriceJumpEvent {
                    price: base(),
                    reference_date: reference.date(),
                    reference_price,
                    jump: (price - reference_price) / reference_price,
                }));
            }
        }

        events
    }
}
