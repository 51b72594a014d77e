//! Tests for utility functions

use prometheus_sandbox_threads::util::{init_tracing, now_ms};

#[test]
fn test_now_ms_is_after_epoch() {
    let a = now_ms();
    let b = now_ms();
    assert!(a > 0);
    assert!(b >= a);
}

#[test]
fn test_init_tracing_is_idempotent() {
    init_tracing();
    init_tracing();
    tracing::info!("tracing initialized twice without panicking");
}
