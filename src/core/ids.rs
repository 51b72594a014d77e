//! Unique identifier and thread-name provider.

use std::sync::atomic::{AtomicU64, Ordering};

/// Source of unique handle suffixes and diagnosable thread names.
pub trait IdProvider: Send + Sync {
    /// Return a suffix that is never handed out twice by this provider.
    fn new_unique_suffix(&self) -> String;

    /// Return a display name for a new thread, derived from `prefix`.
    fn thread_display_name(&self, prefix: &str) -> String;
}

/// Default provider: uuid v4 suffixes and sequentially numbered thread names.
#[derive(Debug, Default)]
pub struct UuidIdProvider {
    thread_counter: AtomicU64,
}

impl UuidIdProvider {
    /// Create a provider with the thread counter at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdProvider for UuidIdProvider {
    fn new_unique_suffix(&self) -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }

    fn thread_display_name(&self, prefix: &str) -> String {
        let n = self.thread_counter.fetch_add(1, Ordering::Relaxed);
        format!("{prefix}thread-{n}")
    }
}
