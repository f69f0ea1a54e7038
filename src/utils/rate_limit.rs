//! Sliding-window rate limiting.

use std::cell::RefCell;

use jiff::{SignedDuration, Timestamp};
use mockall::automock;
use rustc_hash::FxHashMap;

/// Length of the sliding window.
const WINDOW: SignedDuration = SignedDuration::from_secs(60);

/// Time source for the limiter, pulled out so tests can steer it.
#[automock]
pub trait Clock {
    /// The current instant.
    fn now(&self) -> Timestamp;
}

/// The wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A per-client sliding-window limiter: at most `limit` requests per
/// minute.
#[derive(Debug)]
pub struct RateLimiter<C = SystemClock> {
    limit: u32,
    hits: RefCell<FxHashMap<String, Vec<Timestamp>>>,
    clock: C,
}

impl RateLimiter<SystemClock> {
    /// A limiter over the wall clock.
    #[must_use]
    pub fn new(limit: u32) -> Self {
        Self::with_clock(limit, SystemClock)
    }
}

impl<C: Clock> RateLimiter<C> {
    /// A limiter over an explicit clock.
    #[must_use]
    pub fn with_clock(limit: u32, clock: C) -> Self {
        Self {
            limit,
            hits: RefCell::new(FxHashMap::default()),
            clock,
        }
    }

    /// Record a request for the client and report whether it fits in the
    /// window.
    pub fn is_allowed(&self, client: &str) -> bool {
        let now = self.clock.now();
        let window_start = now.checked_sub(WINDOW).unwrap_or(Timestamp::MIN);

        let mut hits = self.hits.borrow_mut();
        let timestamps = hits.entry(client.to_owned()).or_default();

        timestamps.retain(|&hit| hit > window_start);

        if timestamps.len() >= self.limit as usize {
            return false;
        }

        timestamps.push(now);

        true
    }

    /// How many requests the client has left in the current window.
    #[must_use]
    pub fn remaining(&self, client: &str) -> u32 {
        let now = self.clock.now();
        let window_start = now.checked_sub(WINDOW).unwrap_or(Timestamp::MIN);

        let hits = self.hits.borrow();

        let used = hits
            .get(client)
            .map(|timestamps| timestamps.iter().filter(|&&hit| hit > window_start).count())
            .unwrap_or(0);

        self.limit
            .saturating_sub(u32::try_from(used).unwrap_or(u32::MAX))
    }

    /// Forget a client's history.
    pub fn reset(&self, client: &str) {
        self.hits.borrow_mut().remove(client);
    }
}
