//! Authentication claims for bearer tokens.
//!
//! Identity lives outside this service: tokens are minted by the identity
//! provider and Daura only verifies them. The subject is the caller's
//! account identifier, which the pipeline trusts as-is.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role granted to operators who may review and correct the ledger.
pub const ROLE_OPS: &str = "ops";

/// Role granted to regular account holders.
pub const ROLE_MEMBER: &str = "member";

/// JWT claims for bearer tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (account ID).
    pub sub: Uuid,
    /// Caller's role (`member` or `ops`).
    pub role: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for an account.
    #[must_use]
    pub fn new(account_id: Uuid, role: &str, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: account_id,
            role: role.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the account ID from claims.
    #[must_use]
    pub const fn account_id(&self) -> Uuid {
        self.sub
    }

    /// Returns true if the caller holds the operator role.
    #[must_use]
    pub fn is_ops(&self) -> bool {
        self.role == ROLE_OPS
    }
}
