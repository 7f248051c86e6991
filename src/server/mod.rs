//! Remote scan service.
//!
//! Runs scans on demand and exposes the result store over http. The store
//! is synchronous, so every store call runs on tokio's blocking pool.
//!
//! Routes:
//! - GET / - index page
//! - GET /results/{id} - html view of a record
//! - POST /api/scan - run a scan and store it
//! - GET /api/scan/{id} - full record
//! - GET /api/results?limit=N - record summaries
//! - GET /api/results/summary/{id} - record digest
//! - DELETE /api/results/{id} - remove a record
//! - GET /api/statistics - count and size of stored records
//! - GET /api/health - liveness
//! - GET /api/download/{id} - record as a file attachment
//! - GET /api/apis - scan operation catalog

mod handlers;
mod pages;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::{error, info};

use crate::api::{Envelope, ErrorBody};
use crate::config::ServerConfig;
use crate::error::{Error, ErrorKind};
use crate::scan::MetricSource;
use crate::store::ResultStore;

/// Shared handler state. Built once at startup and cloned into each request.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ResultStore>,
    pub source: Arc<dyn MetricSource>,
    pub port: u16,
}

impl AppState {
    pub fn new(store: ResultStore, source: impl MetricSource + 'static, port: u16) -> Self {
        AppState {
            store: Arc::new(store),
            source: Arc::new(source),
            port,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/results/{id}", get(handlers::result_page))
        .route("/api/scan", post(handlers::create_scan))
        .route("/api/scan/{id}", get(handlers::get_record))
        .route("/api/results", get(handlers::list_results))
        .route("/api/results/summary/{id}", get(handlers::get_digest))
        .route("/api/results/{id}", axum::routing::delete(handlers::delete_result))
        .route("/api/statistics", get(handlers::statistics))
        .route("/api/health", get(handlers::health))
        .route("/api/download/{id}", get(handlers::download))
        .route("/api/apis", get(handlers::list_apis))
        .with_state(state)
}

/// Bind and serve until ctrl-c.
pub async fn serve(config: &ServerConfig, state: AppState) -> crate::error::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| Error::Bind { addr: addr.clone(), source })?;

    info!(
        %addr,
        results_dir = %state.store.dir().display(),
        "scan service listening"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|source| Error::Bind { addr, source })?;

    info!("scan service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

/// Store and scan failures rendered as an error envelope.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Io | ErrorKind::Transport => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        }

        let body: Envelope<()> = Envelope::Error(ErrorBody::from_error(&self.0));
        (status, Json(body)).into_response()
    }
}
