//! Tests for event handle generation and validation

use prometheus_sandbox_threads::core::{
    generate_handle, is_valid_handle, IdProvider, SandboxValue, UuidIdProvider, EVENT_PREFIX,
};

/// Provider with predictable output.
struct FixedIds;

impl IdProvider for FixedIds {
    fn new_unique_suffix(&self) -> String {
        "42".to_string()
    }

    fn thread_display_name(&self, prefix: &str) -> String {
        format!("{prefix}fixed")
    }
}

#[test]
fn test_handle_is_prefix_plus_suffix() {
    let handle = generate_handle(&FixedIds);
    assert_eq!(handle.as_str(), "_EVENT:42");
    assert_eq!(handle.suffix(), "42");
}

#[test]
fn test_generated_handle_validates() {
    let ids = UuidIdProvider::new();
    let handle = generate_handle(&ids);
    assert!(handle.as_str().starts_with(EVENT_PREFIX));
    assert!(is_valid_handle(&SandboxValue::from(handle.to_string())));
}

#[test]
fn test_non_string_values_are_invalid() {
    assert!(!is_valid_handle(&SandboxValue::Int(42)));
    assert!(!is_valid_handle(&SandboxValue::Real(4.2)));
    assert!(!is_valid_handle(&SandboxValue::Bool(true)));
    assert!(!is_valid_handle(&SandboxValue::Unit));
}

#[test]
fn test_unprefixed_strings_are_invalid() {
    assert!(!is_valid_handle(&SandboxValue::from("42")));
    assert!(!is_valid_handle(&SandboxValue::from("_event:42")));
    assert!(!is_valid_handle(&SandboxValue::from(" _EVENT:42")));
}
