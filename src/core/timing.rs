//! Blocking wait exposed to sandboxed code.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Blocking timer. Implementations must never return before `duration` has elapsed.
pub trait TimingProvider: Send + Sync {
    /// Block the calling thread for at least `duration`.
    fn block_for(&self, duration: Duration);
}

/// Timing provider backed by `std::thread::sleep`.
///
/// The OS may wake a sleeping thread early, so this re-sleeps until the
/// deadline has actually passed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl TimingProvider for ThreadSleeper {
    fn block_for(&self, duration: Duration) {
        let Some(deadline) = Instant::now().checked_add(duration) else {
            // Past the representable future; never wakes.
            loop {
                thread::sleep(duration);
            }
        };
        loop {
            let now = Instant::now();
            if now >= deadline {
                return;
            }
            thread::sleep(deadline - now);
        }
    }
}

/// Non-preemptible sleep for sandboxed code.
#[derive(Clone)]
pub struct BlockingWait {
    provider: Arc<dyn TimingProvider>,
}

impl BlockingWait {
    /// Create a wait backed by `provider`.
    pub fn new(provider: Arc<dyn TimingProvider>) -> Self {
        Self { provider }
    }

    /// Suspend the calling thread for at least `seconds`.
    ///
    /// Negative and NaN values are clamped to no wait. Values too large for a
    /// `Duration`, infinity included, wait for `Duration::MAX`.
    pub fn sleep(&self, seconds: f64) {
        self.provider.block_for(seconds_to_duration(seconds));
    }
}

fn seconds_to_duration(seconds: f64) -> Duration {
    if seconds.is_nan() || seconds <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX)
}

impl Default for BlockingWait {
    fn default() -> Self {
        Self::new(Arc::new(ThreadSleeper))
    }
}
