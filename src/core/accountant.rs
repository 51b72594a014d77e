//! Resource accounting for sandboxed concurrency.
//!
//! The launcher only talks to the [`Accountant`] trait. [`InMemoryAccountant`]
//! is the in-process ledger used by default and in tests.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, warn};

use super::error::SandboxError;
use super::handle::EventHandle;

/// Resource category charged for each accounted thread.
pub const EVENTS_CATEGORY: &str = "events";

/// Quota ledger shared by every launching and worker thread.
pub trait Accountant: Send + Sync {
    /// Reserve one unit of `category` for `handle`.
    ///
    /// # Errors
    ///
    /// - `SandboxError::ResourceExhausted` if the category is full
    /// - `SandboxError::DuplicateHandle` if `handle` already holds a unit
    fn charge(&self, category: &str, handle: &EventHandle) -> Result<(), SandboxError>;

    /// Return the unit held by `handle` to `category`.
    fn release(&self, category: &str, handle: &EventHandle);
}

#[derive(Debug, Default)]
struct Ledger {
    items: HashMap<String, HashSet<EventHandle>>,
    released_total: u64,
}

impl Ledger {
    fn outstanding(&self, category: &str) -> usize {
        self.items.get(category).map_or(0, HashSet::len)
    }
}

/// Set-based ledger with a fixed limit per category.
///
/// Categories without a configured limit are unlimited.
#[derive(Debug, Default)]
pub struct InMemoryAccountant {
    limits: Mutex<HashMap<String, u32>>,
    ledger: Mutex<Ledger>,
    released: Condvar,
}

impl InMemoryAccountant {
    /// Create an accountant with an `events` limit.
    #[must_use]
    pub fn with_events_limit(limit: u32) -> Self {
        let accountant = Self::default();
        accountant.set_limit(EVENTS_CATEGORY, limit);
        accountant
    }

    /// Set or replace the limit for `category`.
    pub fn set_limit(&self, category: &str, limit: u32) {
        self.limits.lock().insert(category.to_owned(), limit);
    }

    /// Configured limit for `category`, if any.
    #[must_use]
    pub fn limit(&self, category: &str) -> Option<u32> {
        self.limits.lock().get(category).copied()
    }

    /// Units of `category` currently reserved.
    #[must_use]
    pub fn outstanding(&self, category: &str) -> usize {
        self.ledger.lock().outstanding(category)
    }

    /// Whether `handle` currently holds a unit of `category`.
    #[must_use]
    pub fn is_reserved(&self, category: &str, handle: &EventHandle) -> bool {
        self.ledger
            .lock()
            .items
            .get(category)
            .is_some_and(|set| set.contains(handle))
    }

    /// Total successful releases across all categories.
    #[must_use]
    pub fn released_total(&self) -> u64 {
        self.ledger.lock().released_total
    }

    /// Block until `category` has no outstanding units or `timeout` passes.
    ///
    /// Returns `true` if the category drained in time.
    pub fn wait_idle(&self, category: &str, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut ledger = self.ledger.lock();
        while ledger.outstanding(category) > 0 {
            if self.released.wait_until(&mut ledger, deadline).timed_out() {
                return ledger.outstanding(category) == 0;
            }
        }
        true
    }
}

impl Accountant for InMemoryAccountant {
    fn charge(&self, category: &str, handle: &EventHandle) -> Result<(), SandboxError> {
        let limit = self.limit(category);
        let mut ledger = self.ledger.lock();
        let set = ledger.items.entry(category.to_owned()).or_default();

        if let Some(limit) = limit {
            if set.len() >= limit as usize {
                return Err(SandboxError::ResourceExhausted {
                    category: category.to_owned(),
                    limit,
                });
            }
        }
        if !set.insert(handle.clone()) {
            return Err(SandboxError::DuplicateHandle(handle.to_string()));
        }

        debug!(category, handle = %handle, in_use = set.len(), "Charged resource");
        Ok(())
    }

    fn release(&self, category: &str, handle: &EventHandle) {
        let mut ledger = self.ledger.lock();
        let removed = ledger
            .items
            .get_mut(category)
            .is_some_and(|set| set.remove(handle));

        if removed {
            ledger.released_total += 1;
            debug!(category, handle = %handle, "Released resource");
            self.released.notify_all();
        } else {
            warn!(category, handle = %handle, "Release for handle with no reservation");
        }
    }
}
