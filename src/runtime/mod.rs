//! Runtime adapters and the API surface exposed to sandboxed code.

pub mod api;
pub mod native_spawner;

pub use api::SandboxApi;
pub use native_spawner::NativeSpawner;
