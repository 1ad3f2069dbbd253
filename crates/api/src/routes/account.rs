//! Account balance routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use daura_db::AccountRepository;

use crate::AppState;
use crate::middleware::AuthUser;

/// Account balance response.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    /// Account identifier.
    pub id: Uuid,
    /// Human-readable account name.
    pub display_name: String,
    /// Current running balance, in points.
    pub balance: Decimal,
    /// When the balance last changed.
    pub updated_at: DateTime<Utc>,
}

/// GET /account handler.
///
/// The balance shown here is the sum of every applied entry; entries still
/// `recorded` are not reflected until the reconciliation sweep lands them.
async fn get_account(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let repo = AccountRepository::new((*state.db).clone());

    match repo.find_by_id(auth.account_id()).await {
        Ok(Some(account)) => (
            StatusCode::OK,
            Json(json!(AccountResponse {
                id: account.id,
                display_name: account.display_name,
                balance: account.balance,
                updated_at: account.updated_at.with_timezone(&Utc),
            })),
        )
            .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "UNKNOWN_ACCOUNT",
                "message": "No account exists for this token"
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to read account");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "error": "PERSISTENCE_ERROR",
                    "message": "Could not read account"
                })),
            )
                .into_response()
        }
    }
}

/// Creates account routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/account", get(get_account))
}
