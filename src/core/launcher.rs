//! Accounted thread launcher.
//!
//! [`ThreadLauncher::create_thread`] is the only way sandboxed code gets a new
//! thread. Each launch:
//!
//! 1. rejects non-callable arguments before anything is charged,
//! 2. charges one `events` unit under a fresh [`EventHandle`],
//! 3. starts a named OS thread running the callable under the [`Supervisor`],
//! 4. releases the unit when the callable completes.
//!
//! An escaped error ends the process with the reservation still held. A thread
//! that fails to start ends the process from the calling side.

use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use super::accountant::{Accountant, EVENTS_CATEGORY};
use super::audit::{build_lifecycle_event, AuditSink, UnitState};
use super::error::SandboxError;
use super::handle::{generate_handle, EventHandle, EVENT_PREFIX};
use super::ids::IdProvider;
use super::supervisor::Supervisor;
use super::value::{CallableResult, SandboxFn, SandboxValue};

/// Abstraction for starting a named OS thread.
pub trait Spawn: Send + Sync {
    /// Start `task` on a new thread called `name`.
    ///
    /// # Errors
    ///
    /// Returns the host error if the thread could not be created. `task` is
    /// dropped without running in that case.
    fn spawn<F>(&self, name: String, task: F) -> io::Result<()>
    where
        F: FnOnce() + Send + 'static;
}

/// Statistics about launched units.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchStats {
    /// Calls that passed the argument check.
    pub requested: u64,
    /// Units charged and handed to a thread.
    pub launched: u64,
    /// Units whose callable completed and were released.
    pub released: u64,
    /// Calls refused by the accountant.
    pub rejected: u64,
    /// Units whose callable let an error escape.
    pub terminated: u64,
    /// Launches whose thread could not be created.
    pub fatal: u64,
    /// Units currently holding a reservation.
    pub active: u64,
}

/// Internal counters (thread-safe).
#[derive(Debug, Default)]
struct LaunchCounters {
    requested: AtomicU64,
    launched: AtomicU64,
    released: AtomicU64,
    rejected: AtomicU64,
    terminated: AtomicU64,
    fatal: AtomicU64,
}

impl LaunchCounters {
    fn snapshot(&self) -> LaunchStats {
        let launched = self.launched.load(Ordering::Relaxed);
        let released = self.released.load(Ordering::Relaxed);
        let terminated = self.terminated.load(Ordering::Relaxed);
        let fatal = self.fatal.load(Ordering::Relaxed);
        LaunchStats {
            requested: self.requested.load(Ordering::Relaxed),
            launched,
            released,
            rejected: self.rejected.load(Ordering::Relaxed),
            terminated,
            fatal,
            active: launched.saturating_sub(released + terminated + fatal),
        }
    }
}

/// Counters plus the optional audit sink, shared with worker threads.
struct Lifecycle {
    counters: LaunchCounters,
    audit: Option<Mutex<Box<dyn AuditSink>>>,
}

impl Lifecycle {
    fn enter(&self, handle: &EventHandle, state: UnitState, detail: Option<String>) {
        let counter = match state {
            UnitState::Requested => Some(&self.counters.requested),
            UnitState::Reserved => Some(&self.counters.launched),
            UnitState::Released => Some(&self.counters.released),
            UnitState::Rejected => Some(&self.counters.rejected),
            UnitState::Terminated => Some(&self.counters.terminated),
            UnitState::Fatal => Some(&self.counters.fatal),
            UnitState::Running => None,
        };
        if let Some(counter) = counter {
            counter.fetch_add(1, Ordering::Relaxed);
        }
        if let Some(audit) = &self.audit {
            audit.lock().record(build_lifecycle_event(handle, state, detail));
        }
    }
}

/// A charged `events` unit, released on drop unless forfeited.
struct Reservation {
    accountant: Arc<dyn Accountant>,
    handle: EventHandle,
    armed: bool,
}

impl Reservation {
    fn new(accountant: Arc<dyn Accountant>, handle: EventHandle) -> Self {
        Self {
            accountant,
            handle,
            armed: true,
        }
    }

    /// Give up the unit without releasing it. The process is ending.
    fn forfeit(mut self) {
        self.armed = false;
    }
}

impl Drop for Reservation {
    fn drop(&mut self) {
        if self.armed {
            self.accountant.release(EVENTS_CATEGORY, &self.handle);
        }
    }
}

/// Starts accounted, supervised threads for sandboxed code.
pub struct ThreadLauncher<S: Spawn> {
    accountant: Arc<dyn Accountant>,
    ids: Arc<dyn IdProvider>,
    supervisor: Supervisor,
    spawner: S,
    lifecycle: Arc<Lifecycle>,
}

impl<S: Spawn> ThreadLauncher<S> {
    /// Create a launcher from its collaborators.
    pub fn new(
        accountant: Arc<dyn Accountant>,
        ids: Arc<dyn IdProvider>,
        supervisor: Supervisor,
        spawner: S,
    ) -> Self {
        Self {
            accountant,
            ids,
            supervisor,
            spawner,
            lifecycle: Arc::new(Lifecycle {
                counters: LaunchCounters::default(),
                audit: None,
            }),
        }
    }

    /// Attach an audit sink that receives every lifecycle transition.
    #[must_use]
    pub fn with_audit(self, audit: Box<dyn AuditSink>) -> Self {
        Self {
            lifecycle: Arc::new(Lifecycle {
                counters: LaunchCounters::default(),
                audit: Some(Mutex::new(audit)),
            }),
            ..self
        }
    }

    /// Create a thread running `function`, charging one `events` unit.
    ///
    /// # Errors
    ///
    /// - `SandboxError::Argument` if `function` is not callable; nothing is charged
    /// - `SandboxError::ResourceExhausted` if no `events` unit is available
    /// - `SandboxError::ThreadCreation` if the thread could not be started and
    ///   the terminator returned
    pub fn create_thread(&self, function: SandboxValue) -> Result<(), SandboxError> {
        match function {
            SandboxValue::Callable(function) => self.launch(function),
            other => {
                debug!(got = other.type_name(), "Rejected non-callable thread target");
                Err(SandboxError::Argument(format!(
                    "Provided function is not callable! (got {})",
                    other.type_name()
                )))
            }
        }
    }

    /// Typed entry point for host code that already holds a closure.
    ///
    /// # Errors
    ///
    /// Same as [`Self::create_thread`], minus the argument check.
    pub fn spawn<F>(&self, function: F) -> Result<(), SandboxError>
    where
        F: FnOnce() -> CallableResult + Send + 'static,
    {
        self.launch(Box::new(function))
    }

    /// Get current launch statistics.
    #[must_use]
    pub fn stats(&self) -> LaunchStats {
        self.lifecycle.counters.snapshot()
    }

    fn launch(&self, function: SandboxFn) -> Result<(), SandboxError> {
        let handle = generate_handle(self.ids.as_ref());
        self.lifecycle.enter(&handle, UnitState::Requested, None);

        if let Err(err) = self.accountant.charge(EVENTS_CATEGORY, &handle) {
            warn!(handle = %handle, error = %err, "Thread launch rejected by accountant");
            self.lifecycle
                .enter(&handle, UnitState::Rejected, Some(err.to_string()));
            return Err(err);
        }
        self.lifecycle.enter(&handle, UnitState::Reserved, None);

        let name = self.ids.thread_display_name(EVENT_PREFIX);
        let worker = {
            let accountant = Arc::clone(&self.accountant);
            let supervisor = self.supervisor.clone();
            let lifecycle = Arc::clone(&self.lifecycle);
            let handle = handle.clone();
            move || {
                // Created on the worker so a refused spawn never releases.
                let reservation = Reservation::new(accountant, handle.clone());
                lifecycle.enter(&handle, UnitState::Running, None);

                match supervisor.run_guarded(&handle, function) {
                    Ok(()) => {
                        drop(reservation);
                        lifecycle.enter(&handle, UnitState::Released, None);
                        debug!(handle = %handle, "Accounted thread finished");
                    }
                    Err(status) => {
                        reservation.forfeit();
                        lifecycle.enter(
                            &handle,
                            UnitState::Terminated,
                            Some(format!("status {}", status.code())),
                        );
                    }
                }
            }
        };

        if let Err(err) = self.spawner.spawn(name, worker) {
            self.lifecycle
                .enter(&handle, UnitState::Fatal, Some(err.to_string()));
            let status = self.supervisor.thread_creation_failed(&handle, &err);
            return Err(SandboxError::ThreadCreation {
                status: status.code(),
                reason: err.to_string(),
            });
        }

        debug!(handle = %handle, "Accounted thread started");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::accountant::InMemoryAccountant;
    use crate::core::ids::UuidIdProvider;
    use crate::core::supervisor::{CollectingReporter, RecordingTerminator};

    /// Runs the task inline on the calling thread.
    struct InlineSpawner;

    impl Spawn for InlineSpawner {
        fn spawn<F>(&self, _name: String, task: F) -> io::Result<()>
        where
            F: FnOnce() + Send + 'static,
        {
            task();
            Ok(())
        }
    }

    struct RefusingSpawner;

    impl Spawn for RefusingSpawner {
        fn spawn<F>(&self, _name: String, _task: F) -> io::Result<()>
        where
            F: FnOnce() + Send + 'static,
        {
            Err(io::Error::new(io::ErrorKind::WouldBlock, "thread limit reached"))
        }
    }

    fn launcher<S: Spawn>(
        spawner: S,
        limit: u32,
    ) -> (ThreadLauncher<S>, Arc<InMemoryAccountant>, Arc<RecordingTerminator>) {
        let accountant = Arc::new(InMemoryAccountant::with_events_limit(limit));
        let terminator = Arc::new(RecordingTerminator::new());
        let supervisor = Supervisor::new(Arc::new(CollectingReporter::new()), terminator.clone());
        let launcher = ThreadLauncher::new(
            accountant.clone(),
            Arc::new(UuidIdProvider::new()),
            supervisor,
            spawner,
        );
        (launcher, accountant, terminator)
    }

    #[test]
    fn test_inline_completion_releases() {
        let (launcher, accountant, _) = launcher(InlineSpawner, 1);
        launcher.spawn(|| Ok(())).unwrap();

        assert_eq!(accountant.outstanding(EVENTS_CATEGORY), 0);
        assert_eq!(accountant.released_total(), 1);
        let stats = launcher.stats();
        assert_eq!(stats.launched, 1);
        assert_eq!(stats.released, 1);
        assert_eq!(stats.active, 0);
    }

    #[test]
    fn test_non_callable_charges_nothing() {
        let (launcher, accountant, _) = launcher(InlineSpawner, 1);
        let err = launcher.create_thread(SandboxValue::Int(5)).unwrap_err();

        assert!(matches!(err, SandboxError::Argument(_)));
        assert!(err.to_string().contains("int"));
        assert_eq!(accountant.outstanding(EVENTS_CATEGORY), 0);
        assert_eq!(launcher.stats(), LaunchStats::default());
    }

    #[test]
    fn test_refused_spawn_is_fatal_and_keeps_reservation() {
        let (launcher, accountant, terminator) = launcher(RefusingSpawner, 1);
        let err = launcher.spawn(|| Ok(())).unwrap_err();

        assert!(matches!(err, SandboxError::ThreadCreation { status: 56, .. }));
        assert_eq!(
            terminator.statuses(),
            vec![crate::core::supervisor::FatalStatus::ThreadCreationFailed]
        );
        assert_eq!(accountant.outstanding(EVENTS_CATEGORY), 1);
        assert_eq!(accountant.released_total(), 0);
        assert_eq!(launcher.stats().fatal, 1);
    }

    struct PanickingReporter;

    impl crate::core::supervisor::DiagnosticReporter for PanickingReporter {
        fn report_uncaught(
            &self,
            _handle: &EventHandle,
            _error: &crate::core::supervisor::UncaughtError,
        ) {
            panic!("reporter broke");
        }
    }

    #[test]
    fn test_panicking_reporter_keeps_reservation() {
        let accountant = Arc::new(InMemoryAccountant::with_events_limit(1));
        let terminator = Arc::new(RecordingTerminator::new());
        let launcher = ThreadLauncher::new(
            accountant.clone(),
            Arc::new(UuidIdProvider::new()),
            Supervisor::new(Arc::new(PanickingReporter), terminator.clone()),
            InlineSpawner,
        );
        launcher.spawn(|| Err(anyhow::anyhow!("escaped"))).unwrap();

        assert_eq!(
            terminator.statuses(),
            vec![crate::core::supervisor::FatalStatus::UncaughtError]
        );
        assert_eq!(accountant.outstanding(EVENTS_CATEGORY), 1);
        assert_eq!(accountant.released_total(), 0);
        assert_eq!(launcher.stats().terminated, 1);
    }

    #[test]
    fn test_reservation_guard_releases_on_drop() {
        let accountant = Arc::new(InMemoryAccountant::with_events_limit(1));
        let handle = EventHandle::parse("_EVENT:guard").unwrap();
        accountant.charge(EVENTS_CATEGORY, &handle).unwrap();

        drop(Reservation::new(accountant.clone(), handle.clone()));
        assert!(!accountant.is_reserved(EVENTS_CATEGORY, &handle));
    }

    #[test]
    fn test_forfeited_reservation_is_not_released() {
        let accountant = Arc::new(InMemoryAccountant::with_events_limit(1));
        let handle = EventHandle::parse("_EVENT:forfeit").unwrap();
        accountant.charge(EVENTS_CATEGORY, &handle).unwrap();

        Reservation::new(accountant.clone(), handle.clone()).forfeit();
        assert!(accountant.is_reserved(EVENTS_CATEGORY, &handle));
    }
}
