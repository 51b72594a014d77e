//! API surface offered to sandboxed code.

use crate::core::{
    BlockingWait, CallableResult, LaunchStats, SandboxError, SandboxValue, Spawn, ThreadLauncher,
};
use crate::runtime::NativeSpawner;

/// The timer and thread calls exposed inside the sandbox.
pub struct SandboxApi<S: Spawn = NativeSpawner> {
    wait: BlockingWait,
    launcher: ThreadLauncher<S>,
}

impl<S: Spawn> SandboxApi<S> {
    /// Assemble the API from a blocking wait and a launcher.
    pub fn new(wait: BlockingWait, launcher: ThreadLauncher<S>) -> Self {
        Self { wait, launcher }
    }

    /// Pause the calling thread for at least `seconds`. Never returns early.
    pub fn sleep(&self, seconds: f64) {
        self.wait.sleep(seconds);
    }

    /// Start a new accounted thread running `function`.
    ///
    /// # Errors
    ///
    /// See [`ThreadLauncher::create_thread`].
    pub fn create_thread(&self, function: SandboxValue) -> Result<(), SandboxError> {
        self.launcher.create_thread(function)
    }

    /// Start a new accounted thread from a host closure.
    ///
    /// # Errors
    ///
    /// See [`ThreadLauncher::spawn`].
    pub fn spawn<F>(&self, function: F) -> Result<(), SandboxError>
    where
        F: FnOnce() -> CallableResult + Send + 'static,
    {
        self.launcher.spawn(function)
    }

    /// Launch statistics so far.
    #[must_use]
    pub fn stats(&self) -> LaunchStats {
        self.launcher.stats()
    }
}
