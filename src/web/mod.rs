//! HTTP API for the device registry.
//!
//! ## Architecture
//!
//! - `auth`: middleware resolving the upstream-authenticated identity
//! - `routes`: request handlers for the device endpoints
//!
//! ## Endpoints
//!
//! - `POST /admin/device/upload-csv` - bulk import (admin)
//! - `GET /admin/device/download-csv` - streamed export (admin)
//! - `DELETE /device/{id}` - delete a device and its owned photo (admin)
//! - `GET /health` - liveness probe (public)

pub mod auth;
pub mod routes;

use axum::{
    Router, middleware,
    routing::{delete, get, post},
};
use std::net::SocketAddr;
use tokio::sync::broadcast;

use crate::context::AppContext;

/// Web server for the registry API.
pub struct WebServer {
    bind_addr: SocketAddr,
    ctx: AppContext,
    shutdown_tx: broadcast::Sender<()>,
}

impl WebServer {
    /// Create a new web server bound to the given address.
    pub fn new(ctx: AppContext, bind_addr: SocketAddr) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            bind_addr,
            ctx,
            shutdown_tx,
        }
    }

    /// Start the web server. Runs until shutdown() is called.
    pub async fn start(&self) -> anyhow::Result<()> {
        let app = router(self.ctx.clone());

        let listener = tokio::net::TcpListener::bind(self.bind_addr).await?;
        tracing::info!(addr = %self.bind_addr, "Device registry API listening");

        let mut shutdown_rx = self.shutdown_tx.subscribe();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        Ok(())
    }

    /// Signal the server to shut down gracefully.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}

/// Assemble the application router. The device endpoints sit behind the
/// identity middleware; the health probe does not.
pub fn router(ctx: AppContext) -> Router {
    let protected = Router::new()
        .route("/device/{id}", delete(routes::delete_device))
        .route("/admin/device/upload-csv", post(routes::upload_csv))
        .route("/admin/device/download-csv", get(routes::download_csv))
        .layer(middleware::from_fn(auth::identity_middleware));

    Router::new()
        .merge(protected)
        .route("/health", get(routes::health))
        .with_state(ctx)
}
