//! HTTP surface over the resource collections.
//!
//! # Routes
//!
//! Mounted under the configured prefix (default `/api`):
//! - `GET /{resource}` - List records
//! - `POST /{resource}` - Create a record
//! - `GET /{resource}/{id}` - Read a record
//! - `PUT /{resource}/{id}` - Update a record
//! - `DELETE /{resource}/{id}` - Delete a record
//!
//! `GET /` answers with a plain-text liveness message.

pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::{
    http::{header, Method},
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::catalog::Catalog;
use crate::config::ServerConfig;
use crate::error::Result;

pub use error::{ApiError, ApiResult};

/// Build the router for a catalog.
pub fn router(catalog: Arc<Catalog>, config: &ServerConfig) -> Router {
    let api = Router::new()
        .route(
            "/{resource}",
            get(handlers::list_records).post(handlers::create_record),
        )
        .route(
            "/{resource}/{id}",
            get(handlers::get_record)
                .put(handlers::update_record)
                .delete(handlers::delete_record),
        );

    let router = Router::new().route("/", get(handlers::liveness));
    let router = if config.api_prefix == "/" {
        router.merge(api)
    } else {
        router.nest(&config.api_prefix, api)
    };

    let router = router
        .with_state(catalog)
        .layer(TraceLayer::new_for_http());

    if config.cors {
        router.layer(cors_layer())
    } else {
        router
    }
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Serve the catalog until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(catalog: Arc<Catalog>, config: &ServerConfig) -> Result<()> {
    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, prefix = %config.api_prefix, "Server listening");

    axum::serve(listener, router(catalog, config))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // Without a signal handler, run until the process is killed
        std::future::pending::<()>().await;
    }
}
