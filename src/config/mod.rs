//! Configuration models for accounted threads.

pub mod sandbox;

pub use sandbox::SandboxConfig;
