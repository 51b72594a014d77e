//! OS thread spawner implementation.

use std::io;
use std::thread;

use tracing::debug;

use crate::core::Spawn;

/// Spawner that starts detached OS threads via `std::thread::Builder`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeSpawner {
    stack_size: Option<usize>,
}

impl NativeSpawner {
    /// Create a spawner using the platform default stack size.
    #[must_use]
    pub const fn new() -> Self {
        Self { stack_size: None }
    }

    /// Create a spawner with a fixed stack size in bytes.
    #[must_use]
    pub const fn with_stack_size(stack_size: usize) -> Self {
        Self {
            stack_size: Some(stack_size),
        }
    }
}

impl Spawn for NativeSpawner {
    fn spawn<F>(&self, name: String, task: F) -> io::Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let mut builder = thread::Builder::new().name(name);
        if let Some(size) = self.stack_size {
            builder = builder.stack_size(size);
        }
        // Detached: the join handle is dropped, the thread runs to completion.
        let handle = builder.spawn(task)?;
        debug!(thread = ?handle.thread().name(), "Spawned accounted OS thread");
        Ok(())
    }
}
