//! Tests for the lifecycle audit sink

use prometheus_sandbox_threads::core::{
    build_lifecycle_event, AuditSink, EventHandle, InMemoryAuditSink, UnitState,
};

fn handle(suffix: &str) -> EventHandle {
    EventHandle::parse(&format!("_EVENT:{suffix}")).unwrap()
}

#[test]
fn test_in_memory_audit_sink() {
    let mut sink = InMemoryAuditSink::new(10);

    sink.record(build_lifecycle_event(
        &handle("1"),
        UnitState::Rejected,
        Some("resource exhausted".to_string()),
    ));

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].handle, handle("1"));
    assert_eq!(events[0].state, UnitState::Rejected);
    assert_eq!(events[0].detail.as_deref(), Some("resource exhausted"));
    assert!(events[0].at_ms > 0);
}

#[test]
fn test_audit_sink_overflow() {
    let mut sink = InMemoryAuditSink::new(2);

    sink.record(build_lifecycle_event(&handle("1"), UnitState::Requested, None));
    sink.record(build_lifecycle_event(&handle("2"), UnitState::Requested, None));
    sink.record(build_lifecycle_event(&handle("3"), UnitState::Requested, None));

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].handle, handle("2")); // First one popped
    assert_eq!(events[1].handle, handle("3"));
}

#[test]
fn test_zero_capacity_sink_keeps_nothing() {
    let mut sink = InMemoryAuditSink::new(0);
    sink.record(build_lifecycle_event(&handle("1"), UnitState::Requested, None));
    assert!(sink.events().is_empty());
}
