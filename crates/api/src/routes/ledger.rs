//! Operator-facing ledger review routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde_json::json;
use tracing::error;

use daura_db::LedgerRepository;

use crate::AppState;
use crate::middleware::AuthUser;

/// Oldest parked entries returned per review call.
const REVIEW_BATCH: u64 = 100;

/// GET /ledger/review handler. Operator role only.
///
/// Lists entries parked as `failed_apply` by the reconciliation sweep,
/// oldest first. Each one represents recorded value an account never
/// received and needs a manual decision.
async fn review_failed(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    if !auth.is_ops() {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": "FORBIDDEN",
                "message": "Operator role required for ledger review"
            })),
        )
            .into_response();
    }

    let repo = LedgerRepository::new((*state.db).clone());

    match repo.failed_entries(REVIEW_BATCH).await {
        Ok(entries) => (StatusCode::OK, Json(json!({ "data": entries }))).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to list parked ledger entries");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "error": "PERSISTENCE_ERROR",
                    "message": "Could not read parked entries"
                })),
            )
                .into_response()
        }
    }
}

/// Creates ledger review routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/ledger/review", get(review_failed))
}
