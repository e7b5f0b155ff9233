//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use capybara_api::config::AppConfig;
use capybara_api::content::CapyLibrary;
use capybara_api::http::{HttpServer, Pipeline};
use capybara_api::lifecycle::{Shutdown, ShutdownReason};
use capybara_api::routing;
use capybara_api::store::MemoryStore;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const CONTAINER_ID: &str = "test-container";

/// A running server on an ephemeral port, backed by an in-memory store.
#[allow(dead_code)]
pub struct TestServer {
    pub addr: SocketAddr,
    pub store: Arc<MemoryStore>,
    pub pipeline: Pipeline,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<Result<(), std::io::Error>>,
    _content: TempDir,
}

#[allow(dead_code)]
impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn stop(&self) {
        self.shutdown.trigger(ShutdownReason::Signal);
    }
}

/// Library with three tiny images on disk.
pub fn test_library() -> (CapyLibrary, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let images: Vec<PathBuf> = (1..=3)
        .map(|i| {
            let path = dir.path().join(format!("capy{}.png", i));
            std::fs::write(&path, format!("png-{}", i)).unwrap();
            path
        })
        .collect();

    let library = CapyLibrary::new(
        images,
        Default::default(),
        vec!["Capybaras are large.".into(), "Capybaras swim.".into()],
        "http://localhost:3000",
    );
    (library, dir)
}

/// Start the content routes behind the full pipeline.
pub async fn start_server(config: AppConfig) -> TestServer {
    let (library, dir) = test_library();
    let routes = routing::router(Arc::new(library), CONTAINER_ID);
    start_with_routes(config, routes, dir).await
}

/// Start arbitrary routes behind the full pipeline.
#[allow(dead_code)]
pub async fn start_custom_server(config: AppConfig, routes: Router) -> TestServer {
    start_with_routes(config, routes, tempfile::tempdir().unwrap()).await
}

async fn start_with_routes(config: AppConfig, routes: Router, content: TempDir) -> TestServer {
    let store = Arc::new(MemoryStore::new());
    let pipeline = Pipeline::from_config(&config, store.clone());
    let server = HttpServer::with_routes(routes, pipeline.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    TestServer {
        addr,
        store,
        pipeline,
        shutdown,
        handle,
        _content: content,
    }
}

/// Config with a small quota and no trusted proxies.
pub fn test_config(max_requests: u32) -> AppConfig {
    let mut config = AppConfig::default();
    config.rate_limit.max_requests = max_requests;
    config.proxy.trusted_ranges = Vec::new();
    config
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .pool_max_idle_per_host(0)
        .build()
        .unwrap()
}

/// Poll `check` until it holds or the deadline passes.
#[allow(dead_code)]
pub async fn eventually<F: Fn() -> bool>(check: F) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}
