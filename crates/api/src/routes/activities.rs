//! Activity submission and ledger history routes.
//!
//! `POST /activities` is the front door of the pipeline: one request, one
//! priced ledger entry. Clients that send an `idempotency_key` can retry
//! the call safely; a replay returns the original entry with `200` instead
//! of `201` and `replayed: true`.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use daura_core::accounting::SubmitOutcome;
use daura_core::activity::{ActivityKind, ActivityRequest, Unit};
use daura_core::ledger::{AccountSnapshot, LedgerEntry, LedgerStore};
use daura_db::LedgerRepository;
use daura_shared::types::{EntryId, PageRequest, PageResponse};

use crate::AppState;
use crate::middleware::AuthUser;

/// Request body for submitting an activity.
#[derive(Debug, Deserialize)]
pub struct SubmitActivityRequest {
    /// Activity kind: `waste_sale` or `emission_report`.
    pub kind: String,
    /// Category code within the kind.
    pub code: String,
    /// Reported quantity.
    pub quantity: Decimal,
    /// Measurement unit for the quantity.
    pub unit: String,
    /// Client token that makes retried submissions safe.
    pub idempotency_key: Option<String>,
}

/// Response body for an accepted submission or reversal.
#[derive(Debug, Serialize)]
pub struct ActivityResponse {
    /// The resulting ledger entry, including its surfaced status.
    pub entry: LedgerEntry,
    /// Balance after apply. Absent while the entry is still awaiting
    /// reconciliation, or when the kind never moves a balance.
    pub balance: Option<AccountSnapshot>,
    /// True when an idempotency key matched an existing entry.
    pub replayed: bool,
}

impl From<SubmitOutcome> for ActivityResponse {
    fn from(outcome: SubmitOutcome) -> Self {
        Self {
            entry: outcome.entry,
            balance: outcome.balance,
            replayed: outcome.replayed,
        }
    }
}

fn parse_kind(raw: &str) -> Option<ActivityKind> {
    match raw {
        "waste_sale" => Some(ActivityKind::WasteSale),
        "emission_report" => Some(ActivityKind::EmissionReport),
        _ => None,
    }
}

fn parse_unit(raw: &str) -> Option<Unit> {
    match raw {
        "kg" => Some(Unit::Kg),
        "kwh" => Some(Unit::Kwh),
        "liter" => Some(Unit::Liter),
        "km" => Some(Unit::Km),
        _ => None,
    }
}

fn bad_request(message: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "INVALID_REQUEST", "message": message })),
    )
        .into_response()
}

fn status_from(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Renders an accepted outcome: `201` for a fresh entry, `200` for a replay.
fn accepted(outcome: SubmitOutcome) -> Response {
    let status = if outcome.replayed {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    (status, Json(json!(ActivityResponse::from(outcome)))).into_response()
}

/// POST /activities handler.
async fn submit_activity(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<SubmitActivityRequest>,
) -> impl IntoResponse {
    let Some(kind) = parse_kind(&body.kind) else {
        return bad_request(format!("Unknown activity kind '{}'", body.kind));
    };
    let Some(unit) = parse_unit(&body.unit) else {
        return bad_request(format!("Unknown unit '{}'", body.unit));
    };

    let request = ActivityRequest {
        account_id: auth.account_id(),
        kind,
        code: body.code,
        quantity: body.quantity,
        unit,
        idempotency_key: body.idempotency_key,
    };

    match state.accounting.submit(request).await {
        Ok(outcome) => accepted(outcome),
        Err(e) => {
            error!(error = %e, code = e.error_code(), "Activity submission rejected");
            (
                status_from(e.http_status_code()),
                Json(json!({ "error": e.error_code(), "message": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// GET /activities handler. Newest entries first.
async fn list_activities(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
) -> impl IntoResponse {
    let repo = LedgerRepository::new((*state.db).clone());

    match repo.entries_for_account(auth.account_id(), &page).await {
        Ok((entries, total)) => {
            let response = PageResponse::new(entries, page.page, page.per_page, total);
            (StatusCode::OK, Json(json!(response))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list ledger entries");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "error": "PERSISTENCE_ERROR",
                    "message": "Could not read ledger history"
                })),
            )
                .into_response()
        }
    }
}

/// GET /activities/{id} handler.
async fn get_activity(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = LedgerRepository::new((*state.db).clone());

    match repo.entry(EntryId::from_uuid(id)).await {
        Ok(Some(entry)) if entry.account_id == auth.account_id() || auth.is_ops() => {
            (StatusCode::OK, Json(json!(entry))).into_response()
        }
        // Entries owned by other accounts look exactly like missing ones.
        Ok(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "ENTRY_NOT_FOUND",
                "message": format!("Ledger entry not found: {id}")
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, entry_id = %id, "Failed to read ledger entry");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "error": "PERSISTENCE_ERROR",
                    "message": "Could not read ledger entry"
                })),
            )
                .into_response()
        }
    }
}

/// POST /activities/{id}/reversal handler. Operator role only.
async fn reverse_activity(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    if !auth.is_ops() {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": "FORBIDDEN",
                "message": "Operator role required to reverse entries"
            })),
        )
            .into_response();
    }

    match state.accounting.reverse(EntryId::from_uuid(id)).await {
        Ok(outcome) => accepted(outcome),
        Err(e) => {
            error!(error = %e, code = e.error_code(), entry_id = %id, "Reversal rejected");
            (
                status_from(e.http_status_code()),
                Json(json!({ "error": e.error_code(), "message": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// Creates activity routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/activities", post(submit_activity).get(list_activities))
        .route("/activities/{id}", get(get_activity))
        .route("/activities/{id}/reversal", post(reverse_activity))
}
