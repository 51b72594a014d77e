//! Tests for error types

use prometheus_sandbox_threads::core::SandboxError;

#[test]
fn test_argument_error() {
    let err = SandboxError::Argument("Provided function is not callable!".to_string());
    assert_eq!(
        format!("{}", err),
        "argument error: Provided function is not callable!"
    );
}

#[test]
fn test_resource_exhausted_error() {
    let err = SandboxError::ResourceExhausted {
        category: "events".to_string(),
        limit: 10,
    };
    assert_eq!(format!("{}", err), "resource exhausted: events (limit 10)");
}

#[test]
fn test_duplicate_handle_error() {
    let err = SandboxError::DuplicateHandle("_EVENT:abc".to_string());
    assert_eq!(format!("{}", err), "handle already reserved: _EVENT:abc");
}

#[test]
fn test_thread_creation_error() {
    let err = SandboxError::ThreadCreation {
        status: 56,
        reason: "Resource temporarily unavailable".to_string(),
    };
    assert_eq!(
        format!("{}", err),
        "thread creation failed (status 56): Resource temporarily unavailable"
    );
}

#[test]
fn test_invalid_config_error() {
    let err = SandboxError::InvalidConfig("events_limit must be greater than 0".to_string());
    assert_eq!(
        format!("{}", err),
        "invalid configuration: events_limit must be greater than 0"
    );
}
