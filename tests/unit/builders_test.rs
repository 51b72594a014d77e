//! Tests for builder modules

use prometheus_sandbox_threads::builders::SandboxBuilder;
use prometheus_sandbox_threads::config::SandboxConfig;
use prometheus_sandbox_threads::core::SandboxError;

#[test]
fn test_sandbox_builder_keeps_config() {
    let config = SandboxConfig::new()
        .with_events_limit(7)
        .with_thread_stack_size(128 * 1024);

    let builder = SandboxBuilder::new(config.clone());
    assert_eq!(builder.config(), &config);
}

#[test]
fn test_sandbox_builder_rejects_invalid_config() {
    let result = SandboxBuilder::new(SandboxConfig::new().with_events_limit(0)).build();
    assert!(matches!(result, Err(SandboxError::InvalidConfig(_))));
}

#[test]
fn test_sandbox_builder_defaults_build() {
    let api = SandboxBuilder::new(SandboxConfig::default()).build().unwrap();
    assert_eq!(api.stats().launched, 0);
}
