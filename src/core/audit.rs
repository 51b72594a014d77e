//! Lifecycle audit for accounted threads.
//!
//! Every state transition of a launched unit can be mirrored to an
//! [`AuditSink`], giving an ordered record of charges, releases and fatal
//! outcomes per handle.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::core::handle::EventHandle;
use crate::util::clock::now_ms;

/// State of one launched unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitState {
    /// A callable was accepted and a handle generated.
    Requested,
    /// The accountant charged one unit for the handle.
    Reserved,
    /// The worker thread started running the callable.
    Running,
    /// The callable completed and the unit was returned.
    Released,
    /// An error escaped and the process was told to terminate.
    Terminated,
    /// The accountant refused the charge.
    Rejected,
    /// The OS thread could not be created.
    Fatal,
}

impl UnitState {
    /// Whether no further transition can follow.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Released | Self::Terminated | Self::Rejected | Self::Fatal
        )
    }
}

/// One recorded transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleEvent {
    /// Handle the transition belongs to.
    pub handle: EventHandle,
    /// State entered.
    pub state: UnitState,
    /// Timestamp milliseconds.
    pub at_ms: u128,
    /// Additional context.
    pub detail: Option<String>,
}

/// Audit sink abstraction.
pub trait AuditSink: Send {
    /// Record a lifecycle event.
    fn record(&mut self, event: LifecycleEvent);
}

/// Bounded in-memory audit sink; the oldest event is dropped on overflow.
pub struct InMemoryAuditSink {
    events: VecDeque<LifecycleEvent>,
    max_events: usize,
}

impl InMemoryAuditSink {
    /// Create a new in-memory sink with a bounded buffer.
    #[must_use]
    pub fn new(max_events: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(max_events),
            max_events,
        }
    }

    /// Retrieve a snapshot of stored events.
    #[must_use]
    pub fn events(&self) -> Vec<LifecycleEvent> {
        self.events.iter().cloned().collect()
    }

    /// States recorded for `handle`, oldest first.
    #[must_use]
    pub fn states_for(&self, handle: &EventHandle) -> Vec<UnitState> {
        self.events
            .iter()
            .filter(|e| &e.handle == handle)
            .map(|e| e.state)
            .collect()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&mut self, event: LifecycleEvent) {
        if self.max_events == 0 {
            return;
        }
        if self.events.len() >= self.max_events {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }
}

/// Helper to build a lifecycle event stamped with the current time.
pub fn build_lifecycle_event(
    handle: &EventHandle,
    state: UnitState,
    detail: Option<String>,
) -> LifecycleEvent {
    LifecycleEvent {
        handle: handle.clone(),
        state,
        at_ms: now_ms(),
        detail,
    }
}
