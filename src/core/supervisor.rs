//! Fail-stop supervision of accounted threads.
//!
//! Every launched thread runs its sandboxed callable inside
//! [`Supervisor::run_guarded`]. An error escaping the callable (an `Err`
//! return or a panic) is reported and then ends the whole process through the
//! [`Terminator`]. A thread that cannot even be started ends the process with a
//! different status. There is no intermediate severity.
//!
//! # Status codes
//!
//! The supervising process distinguishes the two fatal paths by exit status:
//!
//! | Status | Meaning |
//! |--------|---------|
//! | 30 | uncaught error inside an accounted thread |
//! | 56 | the underlying thread could not be created |

use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use thiserror::Error;
use tracing::error;

use super::handle::EventHandle;
use super::value::SandboxFn;

/// Reserved process exit statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FatalStatus {
    /// A sandboxed callable let an error escape its thread.
    UncaughtError,
    /// The host refused to create an OS thread.
    ThreadCreationFailed,
}

impl FatalStatus {
    /// Numeric exit status inspected by the supervising process.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::UncaughtError => 30,
            Self::ThreadCreationFailed => 56,
        }
    }
}

/// Error that escaped a sandboxed callable.
#[derive(Debug, Error)]
pub enum UncaughtError {
    /// The callable returned an error.
    #[error("sandboxed callable raised: {0:#}")]
    Raised(anyhow::Error),
    /// The callable panicked.
    #[error("sandboxed callable panicked: {0}")]
    Panicked(String),
}

fn panic_payload_to_string(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Receives errors that escaped an accounted thread. Must not panic.
pub trait DiagnosticReporter: Send + Sync {
    /// Report `error` raised by the thread owning `handle`.
    fn report_uncaught(&self, handle: &EventHandle, error: &UncaughtError);
}

/// Ends the process with a reserved status.
///
/// The process implementation never returns. Test implementations may record
/// the status and return; callers treat a return as "process is over" and do
/// no further accounting for the affected thread.
pub trait Terminator: Send + Sync {
    /// Terminate with `status`.
    fn terminate(&self, status: FatalStatus);
}

/// Reporter that logs through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl DiagnosticReporter for TracingReporter {
    fn report_uncaught(&self, handle: &EventHandle, error: &UncaughtError) {
        error!(handle = %handle, error = %error, "Uncaught error in accounted thread");
    }
}

/// Terminator that exits the process immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessTerminator;

impl Terminator for ProcessTerminator {
    fn terminate(&self, status: FatalStatus) {
        error!(status = status.code(), ?status, "Terminating sandbox process");
        std::process::exit(status.code());
    }
}

/// Reporter that keeps every report in memory.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    reports: Mutex<Vec<(EventHandle, String)>>,
}

impl CollectingReporter {
    /// Create an empty reporter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of `(handle, message)` pairs reported so far.
    #[must_use]
    pub fn reports(&self) -> Vec<(EventHandle, String)> {
        self.reports.lock().clone()
    }
}

impl DiagnosticReporter for CollectingReporter {
    fn report_uncaught(&self, handle: &EventHandle, error: &UncaughtError) {
        self.reports.lock().push((handle.clone(), error.to_string()));
    }
}

/// Terminator that records statuses instead of exiting.
#[derive(Debug, Default)]
pub struct RecordingTerminator {
    statuses: Mutex<Vec<FatalStatus>>,
    signal: Condvar,
}

impl RecordingTerminator {
    /// Create a terminator with no recorded statuses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Statuses passed to `terminate` so far, in call order.
    #[must_use]
    pub fn statuses(&self) -> Vec<FatalStatus> {
        self.statuses.lock().clone()
    }

    /// Block until at least one termination is recorded or `timeout` passes.
    pub fn wait_for_termination(&self, timeout: Duration) -> Option<FatalStatus> {
        let deadline = Instant::now() + timeout;
        let mut statuses = self.statuses.lock();
        while statuses.is_empty() {
            if self.signal.wait_until(&mut statuses, deadline).timed_out() {
                break;
            }
        }
        statuses.first().copied()
    }
}

impl Terminator for RecordingTerminator {
    fn terminate(&self, status: FatalStatus) {
        self.statuses.lock().push(status);
        self.signal.notify_all();
    }
}

/// Applies the fail-stop policy around sandboxed code.
#[derive(Clone)]
pub struct Supervisor {
    reporter: Arc<dyn DiagnosticReporter>,
    terminator: Arc<dyn Terminator>,
}

impl Supervisor {
    /// Create a supervisor from its collaborators.
    pub fn new(reporter: Arc<dyn DiagnosticReporter>, terminator: Arc<dyn Terminator>) -> Self {
        Self {
            reporter,
            terminator,
        }
    }

    /// Run `function` inside a failure boundary.
    ///
    /// # Errors
    ///
    /// If an error escapes, it is reported, the terminator is invoked with
    /// [`FatalStatus::UncaughtError`], and that status is returned. The caller
    /// must not release the thread's reservation in that case. A panicking
    /// reporter is logged and does not skip termination.
    pub fn run_guarded(&self, handle: &EventHandle, function: SandboxFn) -> Result<(), FatalStatus> {
        let escaped = match panic::catch_unwind(AssertUnwindSafe(function)) {
            Ok(Ok(())) => return Ok(()),
            Ok(Err(err)) => UncaughtError::Raised(err),
            Err(payload) => UncaughtError::Panicked(panic_payload_to_string(payload.as_ref())),
        };

        let reported =
            panic::catch_unwind(AssertUnwindSafe(|| self.reporter.report_uncaught(handle, &escaped)));
        if let Err(payload) = reported {
            error!(
                handle = %handle,
                error = %escaped,
                reporter_panic = %panic_payload_to_string(payload.as_ref()),
                "Diagnostic reporter panicked"
            );
        }
        let status = FatalStatus::UncaughtError;
        self.terminator.terminate(status);
        Err(status)
    }

    /// Handle a refused thread start on the calling side.
    pub fn thread_creation_failed(&self, handle: &EventHandle, err: &io::Error) -> FatalStatus {
        error!(handle = %handle, error = %err, "Failed to start accounted thread");
        let status = FatalStatus::ThreadCreationFailed;
        self.terminator.terminate(status);
        status
    }
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new(Arc::new(TracingReporter), Arc::new(ProcessTerminator))
    }
}
