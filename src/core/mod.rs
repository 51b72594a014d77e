//! Sandbox concurrency primitives: handles, accounting, supervision and launch.

pub mod accountant;
pub mod audit;
pub mod error;
pub mod handle;
pub mod ids;
pub mod launcher;
pub mod supervisor;
pub mod timing;
pub mod value;

pub use accountant::{Accountant, InMemoryAccountant, EVENTS_CATEGORY};
pub use audit::{build_lifecycle_event, AuditSink, InMemoryAuditSink, LifecycleEvent, UnitState};
pub use error::{AppResult, SandboxError};
pub use handle::{generate_handle, is_valid_handle, EventHandle, EVENT_PREFIX};
pub use ids::{IdProvider, UuidIdProvider};
pub use launcher::{LaunchStats, Spawn, ThreadLauncher};
pub use supervisor::{
    CollectingReporter, DiagnosticReporter, FatalStatus, ProcessTerminator, RecordingTerminator,
    Supervisor, Terminator, TracingReporter, UncaughtError,
};
pub use timing::{BlockingWait, ThreadSleeper, TimingProvider};
pub use value::{CallableResult, SandboxFn, SandboxValue};
