//! Tests for configuration validation

use prometheus_sandbox_threads::config::SandboxConfig;

#[test]
fn test_default_config_is_valid() {
    let config = SandboxConfig::default();
    assert_eq!(config.events_limit, 10);
    assert!(config.thread_stack_size.is_none());
    assert!(config.validate().is_ok());
}

#[test]
fn test_zero_events_limit_invalid() {
    let invalid = SandboxConfig::new().with_events_limit(0);
    assert!(invalid.validate().is_err());
}

#[test]
fn test_tiny_stack_invalid() {
    let invalid = SandboxConfig::new().with_thread_stack_size(1024);
    assert!(invalid.validate().is_err());

    let valid = SandboxConfig::new().with_thread_stack_size(256 * 1024);
    assert!(valid.validate().is_ok());
}

#[test]
fn test_config_from_json() {
    let json = r#"{
        "events_limit": 25,
        "thread_stack_size": 65536
    }"#;

    let config = SandboxConfig::from_json_str(json).unwrap();
    assert_eq!(config.events_limit, 25);
    assert_eq!(config.thread_stack_size, Some(65536));
}

#[test]
fn test_config_from_json_stack_optional() {
    let config = SandboxConfig::from_json_str(r#"{ "events_limit": 3 }"#).unwrap();
    assert_eq!(config.thread_stack_size, None);
}

#[test]
fn test_config_from_json_rejects_invalid() {
    assert!(SandboxConfig::from_json_str(r#"{ "events_limit": 0 }"#).is_err());
    assert!(SandboxConfig::from_json_str("not json").is_err());
}

#[test]
fn test_config_from_env() {
    std::env::set_var("SANDBOX_EVENTS_LIMIT", " 12 ");
    std::env::set_var("SANDBOX_THREAD_STACK_SIZE", "131072");

    let config = SandboxConfig::from_env().unwrap();
    assert_eq!(config.events_limit, 12);
    assert_eq!(config.thread_stack_size, Some(131_072));

    std::env::set_var("SANDBOX_EVENTS_LIMIT", "many");
    assert!(SandboxConfig::from_env().is_err());

    std::env::remove_var("SANDBOX_EVENTS_LIMIT");
    std::env::remove_var("SANDBOX_THREAD_STACK_SIZE");
}
