//! # Prometheus Sandbox Threads
//!
//! Accounted, fail-stop concurrency for sandboxes running untrusted code under a
//! resource budget.
//!
//! Sandboxed programs get exactly two concurrency operations:
//!
//! - **`sleep`**: a blocking wait that never returns early
//! - **`create_thread`**: start a new OS thread running a zero-argument callable
//!
//! The interesting part is the discipline around thread creation. Every thread
//! is named by a unique [`core::EventHandle`], charged one unit of the `events`
//! quota before it starts, and releases that unit exactly once when its callable
//! completes. Anything else is fatal to the whole process:
//!
//! | Outcome | Caller sees | Process |
//! |---------|-------------|---------|
//! | callable completes | `Ok(())` | unit released |
//! | argument is not callable | `SandboxError::Argument` | nothing charged |
//! | `events` quota full | `SandboxError::ResourceExhausted` | nothing started |
//! | error escapes the callable | (already returned) | exits with status 30 |
//! | OS refuses the thread | (does not return) | exits with status 56 |
//!
//! ## Usage
//!
//! ```rust,ignore
//! use prometheus_sandbox_threads::builders::SandboxBuilder;
//! use prometheus_sandbox_threads::config::SandboxConfig;
//! use prometheus_sandbox_threads::core::SandboxValue;
//!
//! let api = SandboxBuilder::new(SandboxConfig::new().with_events_limit(8)).build()?;
//!
//! api.create_thread(SandboxValue::callable(|| {
//!     // untrusted work
//!     Ok(())
//! }))?;
//! api.sleep(0.5);
//! ```
//!
//! All collaborators (accountant, id provider, timing, reporter, terminator) are
//! traits injected through [`builders::SandboxBuilder`], so tests can simulate
//! quota exhaustion or observe the fatal status without ending the test process.
//! See `tests/launcher_test.rs` for the end-to-end scenarios.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core handles, accounting, supervision and the thread launcher.
pub mod core;
/// Configuration models for accounted threads.
pub mod config;
/// Builders to construct the sandbox API from configuration.
pub mod builders;
/// Runtime adapters (OS threads) and API surface.
pub mod runtime;
/// Shared utilities.
pub mod util;
