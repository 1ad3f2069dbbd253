//! Emission scoring service client.
//!
//! Emission reports are priced by an external CO2e scoring API. The wire
//! contract: `POST {base}/co2e` authenticated with an `X-API-KEY` header,
//! a JSON body naming the emission factor and the reported quantity, and
//! a JSON response whose `co2e` field is the total for the whole quantity.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use daura_shared::config::PricingConfig;

use crate::activity::Unit;

/// Errors from the emission scoring service.
#[derive(Debug, Error)]
pub enum ScoringError {
    /// The request never produced an HTTP response.
    #[error("Scoring request failed: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("Scoring service returned status {status}")]
    Status {
        /// HTTP status code returned.
        status: u16,
    },

    /// The response body did not carry a usable CO2e total.
    #[error("Malformed scoring response: {0}")]
    MalformedResponse(String),
}

/// One scoring request: an activity whose CO2e total is needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringRequest {
    /// Scoring activity identifier, e.g. `electricity`.
    pub activity_id: String,
    /// Reported quantity.
    pub quantity: Decimal,
    /// Unit of the quantity.
    pub unit: Unit,
}

/// Port for the external emission scoring service.
///
/// Exactly one call per resolution attempt. Retries and caching are
/// deliberately absent so a stale factor can never price an entry.
#[async_trait]
pub trait EmissionScorer: Send + Sync {
    /// Returns the CO2e total, in kg, for the whole reported quantity.
    async fn score(&self, request: &ScoringRequest) -> Result<Decimal, ScoringError>;
}

#[derive(Debug, Serialize)]
struct ScoreBody<'a> {
    emission_factor: EmissionFactor<'a>,
    parameters: Parameters<'a>,
}

#[derive(Debug, Serialize)]
struct EmissionFactor<'a> {
    activity_id: &'a str,
    source: &'a str,
    region: &'a str,
}

#[derive(Debug, Serialize)]
struct Parameters<'a> {
    #[serde(with = "rust_decimal::serde::float")]
    activity_value: Decimal,
    activity_unit: &'a str,
}

#[derive(Debug, Deserialize)]
struct ScoreResponse {
    #[serde(with = "rust_decimal::serde::float")]
    co2e: Decimal,
}

/// HTTP client for the scoring API.
///
/// Carries no timeout of its own; the resolver bounds every call.
#[derive(Debug, Clone)]
pub struct ScoringClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    region: String,
    factor_source: String,
}

impl ScoringClient {
    /// Creates a client from pricing configuration.
    #[must_use]
    pub fn new(config: &PricingConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.scoring_base_url.trim_end_matches('/').to_string(),
            api_key: config.scoring_api_key.clone(),
            region: config.region.clone(),
            factor_source: config.factor_source.clone(),
        }
    }
}

#[async_trait]
impl EmissionScorer for ScoringClient {
    async fn score(&self, request: &ScoringRequest) -> Result<Decimal, ScoringError> {
        let body = ScoreBody {
            emission_factor: EmissionFactor {
                activity_id: &request.activity_id,
                source: &self.factor_source,
                region: &self.region,
            },
            parameters: Parameters {
                activity_value: request.quantity,
                activity_unit: request.unit.as_str(),
            },
        };

        let response = self
            .http
            .post(format!("{}/co2e", self.base_url))
            .header("X-API-KEY", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ScoringError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScoringError::Status {
                status: status.as_u16(),
            });
        }

        let parsed: ScoreResponse = response
            .json()
            .await
            .map_err(|e| ScoringError::MalformedResponse(e.to_string()))?;

        Ok(parsed.co2e)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_request_wire_shape() {
        let body = ScoreBody {
            emission_factor: EmissionFactor {
                activity_id: "electricity",
                source: "GHG_PROTOCOL",
                region: "ID",
            },
            parameters: Parameters {
                activity_value: dec!(120),
                activity_unit: Unit::Kwh.as_str(),
            },
        };

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "emission_factor": {
                    "activity_id": "electricity",
                    "source": "GHG_PROTOCOL",
                    "region": "ID"
                },
                "parameters": {
                    "activity_value": 120.0,
                    "activity_unit": "kwh"
                }
            })
        );
    }

    #[test]
    fn test_response_parses_co2e() {
        let parsed: ScoreResponse =
            serde_json::from_value(json!({"co2e": 52.5, "co2e_unit": "kg"})).unwrap();
        assert_eq!(parsed.co2e, dec!(52.5));
    }

    #[test]
    fn test_response_without_co2e_is_rejected() {
        let parsed =
            serde_json::from_value::<ScoreResponse>(json!({"message": "ok"}));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let config = PricingConfig {
            scoring_base_url: "https://scores.example/".to_string(),
            scoring_api_key: "k".to_string(),
            region: "ID".to_string(),
            factor_source: "GHG_PROTOCOL".to_string(),
            scoring_timeout_secs: 10,
        };
        let client = ScoringClient::new(&config);
        assert_eq!(client.base_url, "https://scores.example");
    }
}
