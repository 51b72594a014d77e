//! Error types for sandbox thread operations.

use thiserror::Error;

/// Errors surfaced to sandboxed callers and embedding code.
#[derive(Debug, Error)]
pub enum SandboxError {
    /// The caller passed a value that cannot be used for the operation.
    #[error("argument error: {0}")]
    Argument(String),
    /// The resource category has no capacity left.
    #[error("resource exhausted: {category} (limit {limit})")]
    ResourceExhausted {
        /// Category that was full at charge time.
        category: String,
        /// Configured limit for the category.
        limit: u32,
    },
    /// A reservation already exists for this handle.
    #[error("handle already reserved: {0}")]
    DuplicateHandle(String),
    /// The underlying OS thread could not be started.
    ///
    /// Only observable when the configured terminator returns instead of
    /// ending the process.
    #[error("thread creation failed (status {status}): {reason}")]
    ThreadCreation {
        /// Reserved status code passed to the terminator.
        status: i32,
        /// Reason reported by the host.
        reason: String,
    },
    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SandboxError {
    /// Whether the caller may retry the same request later.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ResourceExhausted { .. })
    }
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
