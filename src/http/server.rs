//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the route table and wrap it in the request pipeline
//! - Serve with peer addresses available to the pipeline
//! - Run the rate-bucket sweeper alongside the listener
//! - Stop accepting and drain on the shutdown signal

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::config::AppConfig;
use crate::content::CapyLibrary;
use crate::http::middleware::Pipeline;
use crate::routing;
use crate::store::CounterStore;

/// HTTP server for the content API.
pub struct HttpServer {
    router: Router,
    pipeline: Pipeline,
}

impl HttpServer {
    /// Create a server serving the content routes.
    pub fn new(config: &AppConfig, store: Arc<dyn CounterStore>, library: Arc<CapyLibrary>) -> Self {
        let routes = routing::router(library, container_id());
        let pipeline = Pipeline::from_config(config, store);
        Self::with_routes(routes, pipeline)
    }

    /// Create a server for an arbitrary route table behind the same pipeline.
    pub fn with_routes(routes: Router, pipeline: Pipeline) -> Self {
        let router = pipeline.apply(routes);
        Self { router, pipeline }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Serve until the shutdown signal fires, then finish in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let limiter = self.pipeline.limiter.clone();
        if limiter.is_enabled() {
            tokio::spawn(limiter.run_sweeper(shutdown.resubscribe()));
        }

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Host name reported by the greeting endpoints.
pub fn container_id() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "UNKNOWN".to_string())
}
