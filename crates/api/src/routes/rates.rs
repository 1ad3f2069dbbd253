//! Waste rate catalog routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use rust_decimal::Decimal;
use sea_orm::ActiveEnum;
use serde::Serialize;
use serde_json::json;
use tracing::error;

use daura_db::RateRepository;
use daura_db::entities::waste_rates;

use crate::AppState;
use crate::middleware::AuthUser;

/// One row of the active rate catalog.
#[derive(Debug, Serialize)]
pub struct RateResponse {
    /// Waste category code used in submissions.
    pub code: String,
    /// Human-readable category label.
    pub label: String,
    /// Unit the rate is quoted per.
    pub unit: String,
    /// Points credited per unit.
    pub rate: Decimal,
}

impl From<waste_rates::Model> for RateResponse {
    fn from(model: waste_rates::Model) -> Self {
        Self {
            code: model.code,
            label: model.label,
            unit: model.unit.to_value(),
            rate: model.rate,
        }
    }
}

/// GET /rates handler.
///
/// Lists the categories currently accepted for waste sales. Retired rates
/// never appear here, matching what submission pricing will resolve.
async fn list_rates(State(state): State<AppState>, _auth: AuthUser) -> impl IntoResponse {
    let repo = RateRepository::new((*state.db).clone());

    match repo.active_rates().await {
        Ok(rates) => {
            let data: Vec<RateResponse> = rates.into_iter().map(RateResponse::from).collect();
            (StatusCode::OK, Json(json!({ "data": data }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list waste rates");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "error": "PERSISTENCE_ERROR",
                    "message": "Could not read the rate catalog"
                })),
            )
                .into_response()
        }
    }
}

/// Creates rate catalog routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/rates", get(list_rates))
}
