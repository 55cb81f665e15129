//! Scripted [`PriceFetcher`] for scheduler tests.
//!
//! Each call pops the next [`Step`] from the queue; once the queue is
//! empty the fallback step repeats forever. Routes given their own script
//! with [`ScriptedFetcher::route`] answer from it instead of the shared
//! one. Steps may sleep before answering, which on paused tokio time is
//! how tests provoke timeouts and overlapping ticks.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{PriceObservation, ResolvedRoute, RouteId};
use crate::error::FetchError;
use crate::port::PriceFetcher;

/// One scripted fetch.
#[derive(Debug, Clone)]
pub struct Step {
    delay: Duration,
    result: Result<PriceObservation, FetchError>,
}

impl Step {
    /// Answer immediately with a price.
    pub fn price(observation: PriceObservation) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Ok(observation),
        }
    }

    /// Answer immediately with an error.
    pub fn fail(error: FetchError) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Err(error),
        }
    }

    /// Never answer within any sensible timeout.
    pub fn hang() -> Self {
        Self::fail(FetchError::Network("hung".to_string())).after(Duration::from_secs(86_400))
    }

    /// Sleep before answering.
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

struct Script {
    steps: VecDeque<Step>,
    fallback: Step,
}

impl Script {
    fn next(&mut self) -> Step {
        self.steps
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

/// Fetcher that replays a script.
pub struct ScriptedFetcher {
    shared: Mutex<Script>,
    routes: Mutex<HashMap<RouteId, Script>>,
    calls: Arc<AtomicU32>,
    fetched: Mutex<Vec<ResolvedRoute>>,
}

impl ScriptedFetcher {
    /// Replay `steps`, then repeat `fallback`.
    pub fn new(steps: Vec<Step>, fallback: Step) -> Self {
        Self {
            shared: Mutex::new(Script {
                steps: steps.into(),
                fallback,
            }),
            routes: Mutex::new(HashMap::new()),
            calls: Arc::new(AtomicU32::new(0)),
            fetched: Mutex::new(Vec::new()),
        }
    }

    /// Always answer with the same step.
    pub fn always(step: Step) -> Self {
        Self::new(Vec::new(), step)
    }

    /// Give one route its own script.
    #[must_use]
    pub fn route(self, route_id: &str, steps: Vec<Step>, fallback: Step) -> Self {
        self.routes.lock().insert(
            RouteId::new(route_id),
            Script {
                steps: steps.into(),
                fallback,
            },
        );
        self
    }

    /// Number of fetches started.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of fetches started for one route.
    pub fn calls_for(&self, route_id: &RouteId) -> usize {
        self.fetched
            .lock()
            .iter()
            .filter(|route| &route.route_id == route_id)
            .count()
    }

    /// Every route handed to the fetcher, in call order.
    pub fn fetched(&self) -> Vec<ResolvedRoute> {
        self.fetched.lock().clone()
    }

    /// Shared call counter.
    pub fn call_counter(&self) -> Arc<AtomicU32> {
        self.calls.clone()
    }
}

#[async_trait]
impl PriceFetcher for ScriptedFetcher {
    async fn fetch(&self, route: &ResolvedRoute) -> Result<PriceObservation, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.fetched.lock().push(route.clone());
        let step = match self.routes.lock().get_mut(&route.route_id) {
            Some(script) => script.next(),
            None => self.shared.lock().next(),
        };
        if !step.delay.is_zero() {
            tokio::time::sleep(step.delay).await;
        }
        step.result
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}
