//! Store loss escalates to process shutdown.

mod common;

use std::future::pending;
use std::sync::Arc;
use std::time::{Duration, Instant};

use capybara_api::health::LivenessMonitor;
use capybara_api::lifecycle::{supervise, Shutdown, ShutdownReason};
use capybara_api::store::{CounterStore, MemoryStore};
use common::{client, start_server, test_config};
use reqwest::StatusCode;
use tokio::task::JoinHandle;

fn fast_monitor(store: Arc<dyn CounterStore>) -> LivenessMonitor {
    LivenessMonitor::new(store, Duration::from_millis(20), Duration::from_millis(100), 1)
}

#[tokio::test]
async fn lost_store_drains_server_and_exits_with_failure() {
    let server = start_server(test_config(500)).await;
    let store: Arc<dyn CounterStore> = server.store.clone();
    let monitor_task = tokio::spawn(fast_monitor(store).run(server.shutdown.subscribe()));

    let resp = client().get(server.url("/v1/fact")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    server.store.set_failing(true);
    let outcome = tokio::time::timeout(
        Duration::from_secs(5),
        supervise(
            server.handle,
            monitor_task,
            &server.shutdown,
            Duration::from_secs(2),
            pending(),
        ),
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(outcome.reason, ShutdownReason::StoreLost);
    assert_eq!(outcome.exit_code(), 1);
    assert!(outcome.drained);
    assert_eq!(server.shutdown.reason(), Some(ShutdownReason::StoreLost));

    let after = client().get(format!("http://{}/v1/fact", server.addr)).send().await;
    assert!(after.is_err());
}

#[tokio::test]
async fn drain_deadline_abandons_stuck_server() {
    let store = Arc::new(MemoryStore::new());
    store.set_failing(true);
    let shutdown = Shutdown::new();

    let stuck: JoinHandle<Result<(), std::io::Error>> = tokio::spawn(pending());
    let monitor_task = tokio::spawn(fast_monitor(store.clone()).run(shutdown.subscribe()));

    let started = Instant::now();
    let outcome = supervise(stuck, monitor_task, &shutdown, Duration::from_millis(100), pending())
        .await
        .unwrap();

    assert_eq!(outcome.reason, ShutdownReason::StoreLost);
    assert_eq!(outcome.exit_code(), 1);
    assert!(!outcome.drained);
    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(store.ping_count() >= 1);
}

#[tokio::test]
async fn healthy_store_keeps_running_until_signal() {
    let server = start_server(test_config(500)).await;
    let store: Arc<dyn CounterStore> = server.store.clone();
    let monitor_task = tokio::spawn(fast_monitor(store).run(server.shutdown.subscribe()));

    let signal = tokio::time::sleep(Duration::from_millis(100));
    let outcome = tokio::time::timeout(
        Duration::from_secs(5),
        supervise(server.handle, monitor_task, &server.shutdown, Duration::from_secs(2), signal),
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(outcome.reason, ShutdownReason::Signal);
    assert_eq!(outcome.exit_code(), 0);
    assert!(outcome.drained);
    assert!(server.store.ping_count() >= 1);
}
