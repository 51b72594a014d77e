//! Tests for the native thread spawner

use prometheus_sandbox_threads::core::Spawn;
use prometheus_sandbox_threads::runtime::NativeSpawner;

#[test]
fn test_native_spawner_runs_named_thread() {
    let spawner = NativeSpawner::with_stack_size(256 * 1024);

    let (tx, rx) = crossbeam_channel::bounded(1);
    spawner
        .spawn("_EVENT:thread-test".to_string(), move || {
            let name = std::thread::current().name().map(str::to_owned);
            tx.send(name).unwrap();
        })
        .unwrap();

    let name = rx
        .recv_timeout(std::time::Duration::from_secs(5))
        .expect("spawned thread result");
    assert_eq!(name.as_deref(), Some("_EVENT:thread-test"));
}
