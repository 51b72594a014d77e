//! Builders to construct the sandbox API from configuration.

pub mod sandbox_builder;

pub use sandbox_builder::SandboxBuilder;
