//! Notifier port for route events.
//!
//! This module defines the trait for delivering notifications about
//! attractive prices and about routes whose polling keeps failing.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Currency, Price, PriceObservation, RouteId};

/// How loudly an event should be surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Worth a line in the log or a quiet toast.
    Info,
    /// Something the user should look at.
    Warning,
    /// Act now.
    Alert,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Alert => "alert",
        };
        f.write_str(label)
    }
}

/// Events that can trigger notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A route reached a new all-time low.
    NewBestEver(PriceEvent),
    /// A new low that undercuts the previous best by at least the drop threshold.
    PriceDrop(PriceDropEvent),
    /// The price is at or under the route's configured limit.
    BelowLimit(LimitEvent),
    /// The price rose sharply against a recent observation.
    PriceJump(PriceJumpEvent),
    /// Polling has failed for several consecutive ticks.
    RouteDegraded {
        /// The failing route.
        route_id: RouteId,
        /// Failed ticks in a row.
        consecutive_failures: u32,
        /// Last error message.
        last_error: String,
    },
    /// A degraded route produced a price again.
    RouteRecovered {
        /// The recovered route.
        route_id: RouteId,
    },
    /// A fetched price could not be persisted.
    StorageDegraded {
        /// The affected route.
        route_id: RouteId,
        /// Storage error message.
        reason: String,
    },
}

/// A price worth reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceEvent {
    /// The route the price belongs to.
    pub route_id: RouteId,
    /// Route display name.
    pub route_name: String,
    /// Observation date.
    pub date: NaiveDate,
    /// Observed price.
    pub price: Price,
    /// Price currency.
    pub currency: Currency,
    /// Best-ever price before this observation.
    pub previous_best: Option<Price>,
}

impl PriceEvent {
    /// Build an event from a recorded observation.
    #[must_use]
    pub fn new(
        route_id: RouteId,
        route_name: impl Into<String>,
        observation: &PriceObservation,
        previous_best: Option<Price>,
    ) -> Self {
        Self {
            route_id,
            route_name: route_name.into(),
            date: observation.date(),
            price: observation.price(),
            currency: observation.currency().clone(),
            previous_best,
        }
    }
}

/// Large drop against the previous best.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceDropEvent {
    /// The new best price.
    #[serde(flatten)]
    pub price: PriceEvent,
    /// Fraction below the previous best (0.25 = 25% cheaper).
    pub drop: Price,
}

/// Price under the configured limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LimitEvent {
    /// The observed price.
    #[serde(flatten)]
    pub price: PriceEvent,
    /// The route's price limit.
    pub limit: Price,
}

/// Sharp increase against an earlier observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceJumpEvent {
    /// The observed price.
    #[serde(flatten)]
    pub price: PriceEvent,
    /// Date of the observation compared against.
    pub reference_date: NaiveDate,
    /// Price on the reference date.
    pub reference_price: Price,
    /// Fraction above the reference price.
    pub jump: Price,
}

impl Event {
    /// The route this event concerns.
    #[must_use]
    pub fn route_id(&self) -> &RouteId {
        match self {
            Self::NewBestEver(e) => &e.route_id,
            Self::PriceDrop(e) => &e.price.route_id,
            Self::BelowLimit(e) => &e.price.route_id,
            Self::PriceJump(e) => &e.price.route_id,
            Self::RouteDegraded { route_id, .. }
            | Self::RouteRecovered { route_id }
            | Self::StorageDegraded { route_id, .. } => route_id,
        }
    }

    /// Severity of the event.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::NewBestEver(_) | Self::RouteRecovered { .. } => Severity::Info,
            Self::PriceJump(_) | Self::RouteDegraded { .. } | Self::StorageDegraded { .. } => {
                Severity::Warning
            }
            Self::PriceDrop(_) | Self::BelowLimit(_) => Severity::Alert,
        }
    }

    /// Short title suitable for a toast header.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::NewBestEver(_) => "New all-time low",
            Self::PriceDrop(_) => "Price drop",
            Self::BelowLimit(_) => "Price under limit",
            Self::PriceJump(_) => "Price jump",
            Self::RouteDegraded { .. } => "Route degraded",
            Self::RouteRecovered { .. } => "Route recovered",
            Self::StorageDegraded { .. } => "Storage degraded",
        }
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::NewBestEver(e) => match e.previous_best {
                Some(prev) => format!(
                    "{}: {} {} on {} (previous best {} {})",
                    e.route_name, e.price, e.currency, e.date, prev, e.currency
                ),
                None => format!(
                    "{}: first price {} {} on {}",
                    e.route_name, e.price, e.currency, e.date
                ),
            },
            Self::PriceDrop(e) => format!(
                "{}: {} {} is {}% below the previous best",
                e.price.route_name,
                e.price.price,
                e.price.currency,
                percent(e.drop)
            ),
            Self::BelowLimit(e) => format!(
                "{}: {} {} is under your limit of {} {}",
                e.price.route_name, e.price.price, e.price.currency, e.limit, e.price.currency
            ),
            Self::PriceJump(e) => format!(
                "{}: {} {} is {}% above {} on {}",
                e.price.route_name,
                e.price.price,
                e.price.currency,
                percent(e.jump),
                e.reference_price,
                e.reference_date
            ),
            Self::RouteDegraded {
                route_id,
                consecutive_failures,
                last_error,
            } => format!(
                "{route_id}: {consecutive_failures} failed checks in a row ({last_error})"
            ),
            Self::RouteRecovered { route_id } => format!("{route_id}: prices are coming in again"),
            Self::StorageDegraded { route_id, reason } => {
                format!("{route_id}: price could not be saved ({reason})")
            }
        }
    }
}

fn percent(fraction: Price) -> Price {
    (fraction * Price::ONE_HUNDRED).round_dp(1).normalize()
}

/// Trait for notification handlers.
///
/// Notifications are fire-and-forget: `notify` must return quickly and
/// never propagate delivery failures. Implementations that talk to the
/// network should spawn a task and log errors there.
pub trait Notifier: Send + Sync {
    /// Handle an event.
    fn notify(&self, event: Event);
}

/// Registry of notifiers (composite pattern).
///
/// Broadcasts events to all registered notifiers.
#[derive(Default)]
pub struct NotifierRegistry {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl NotifierRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a notifier.
    pub fn register(&mut self, notifier: Box<dyn Notifier>) {
        self.notifiers.push(notifier);
    }

    /// Number of registered notifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    /// Check if registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }
}

impl Notifier for NotifierRegistry {
    fn notify(&self, event: Event) {
        for notifier in &self.notifiers {
            notifier.notify(event.clone());
        }
    }
}

/// A no-op notifier for testing or when notifications are disabled.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _event: Event) {}
}

/// A notifier that writes events to the log.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: Event) {
        let route_id = event.route_id().clone();
        let message = event.message();
        match event.severity() {
            Severity::Info => tracing::info!(route_id = %route_id, %message, "{}", event.title()),
            Severity::Warning => {
                tracing::warn!(route_id = %route_id, %message, "{}", event.title());
            }
            Severity::Alert => {
                tracing::warn!(route_id = %route_id, %message, alert = true, "{}", event.title());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn price_event(price: Price, previous_best: Option<Price>) -> PriceEvent {
        let observation = PriceObservation::new(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            price,
            Currency::default(),
        );
        PriceEvent::new(RouteId::new("paris-nyc"), "Paris to NYC", &observation, previous_best)
    }

    struct Counting(Arc<Mutex<Vec<Event>>>);

    impl Notifier for Counting {
        fn notify(&self, event: Event) {
            self.0.lock().push(event);
        }
    }

    #[test]
    fn registry_broadcasts_to_every_notifier() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut registry = NotifierRegistry::new();
        registry.register(Box::new(Counting(seen.clone())));
        registry.register(Box::new(Counting(seen.clone())));
        registry.register(Box::new(NullNotifier));
        assert_eq!(registry.len(), 3);

        registry.notify(Event::RouteRecovered {
            route_id: RouteId::new("r"),
        });

        assert_eq!(seen.lock().len(), 2);
    }

    #[test]
    fn empty_registry_is_empty() {
        assert!(NotifierRegistry::new().is_empty());
    }

    #[test]
    fn severity_by_kind() {
        let best = Event::NewBestEver(price_event(dec!(300), Some(dec!(320))));
        let drop = Event::PriceDrop(PriceDropEvent {
            price: price_event(dec!(200), Some(dec!(300))),
            drop: dec!(0.3333),
        });
        let degraded = Event::RouteDegraded {
            route_id: RouteId::new("r"),
            consecutive_failures: 3,
            last_error: "timeout".into(),
        };
        assert_eq!(best.severity(), Severity::Info);
        assert_eq!(drop.severity(), Severity::Alert);
        assert_eq!(degraded.severity(), Severity::Warning);
        assert!(Severity::Alert > Severity::Warning);
    }

    #[test]
    fn messages_mention_route_and_price() {
        let best = Event::NewBestEver(price_event(dec!(300), Some(dec!(320))));
        assert_eq!(
            best.message(),
            "Paris to NYC: 300 EUR on 2024-03-01 (previous best 320 EUR)"
        );

        let first = Event::NewBestEver(price_event(dec!(300), None));
        assert_eq!(first.message(), "Paris to NYC: first price 300 EUR on 2024-03-01");

        let drop = Event::PriceDrop(PriceDropEvent {
            price: price_event(dec!(200), Some(dec!(400))),
            drop: dec!(0.5),
        });
        assert_eq!(drop.message(), "Paris to NYC: 200 EUR is 50% below the previous best");
        assert_eq!(drop.route_id().as_str(), "paris-nyc");
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let event = Event::RouteRecovered {
            route_id: RouteId::new("r"),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "route_recovered");
        assert_eq!(json["route_id"], "r");
    }
}
