//! Bearer-token authentication for everything under `/api/v1`.
//!
//! Tokens are minted by the identity provider (or the seeder, locally) and
//! verified against the shared secret. Handlers never see a request whose
//! token failed validation; the claims they read from [`AuthUser`] were
//! checked here.

use axum::{
    Json,
    extract::{FromRequestParts, Request, State},
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::AppState;
use daura_shared::{Claims, JwtError, types::AccountId};

fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

fn reject(error: &str, message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": error, "message": message })),
    )
        .into_response()
}

/// Validates the bearer token and stashes its claims in request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let Some(token) = header.and_then(bearer_token) else {
        return reject(
            "MISSING_TOKEN",
            "Authorization header with Bearer token is required",
        );
    };

    match state.jwt_service.validate_token(token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(JwtError::Expired) => reject("TOKEN_EXPIRED", "Token has expired"),
        Err(_) => reject("INVALID_TOKEN", "Invalid or malformed token"),
    }
}

/// The authenticated caller, extracted from claims the middleware verified.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// The account this token submits and reads on behalf of.
    #[must_use]
    pub fn account_id(&self) -> AccountId {
        AccountId::from_uuid(self.0.account_id())
    }

    /// True when the token carries the operator role.
    #[must_use]
    pub fn is_ops(&self) -> bool {
        self.0.is_ops()
    }

    /// The caller's role string.
    #[must_use]
    pub fn role(&self) -> &str {
        &self.0.role
    }

    /// The verified claims themselves.
    #[must_use]
    pub fn claims(&self) -> &Claims {
        &self.0
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Absent claims mean a route was mounted outside the middleware.
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({
                        "error": "UNAUTHORIZED",
                        "message": "Authentication required"
                    })),
                )
            })
    }
}
