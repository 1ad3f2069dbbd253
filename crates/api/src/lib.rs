//! HTTP surface of the accounting pipeline.
//!
//! Thin Axum handlers over `daura-core`: parse, authenticate, delegate,
//! render. No accounting decision lives in this crate.

pub mod middleware;
pub mod routes;

use axum::Router;
use daura_core::accounting::AccountingService;
use daura_shared::JwtService;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Verifies bearer tokens.
    pub jwt_service: Arc<JwtService>,
    /// The accounting pipeline, shared with the reconciliation sweeper.
    pub accounting: Arc<AccountingService>,
}

/// Creates the main application router.
///
/// Health stays outside the `/api/v1` nest so probes never need a token.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::routes())
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
