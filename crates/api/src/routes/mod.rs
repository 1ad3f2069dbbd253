//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::auth::auth_middleware};

pub mod account;
pub mod activities;
pub mod health;
pub mod ledger;
pub mod rates;

/// Creates the API router with protected routes that need state for middleware.
///
/// Everything under `/api/v1` requires a bearer token; the health probe is
/// mounted separately by [`crate::create_router`].
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(activities::routes())
        .merge(account::routes())
        .merge(rates::routes())
        .merge(ledger::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
}
