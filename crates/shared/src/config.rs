//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtConfig,
    /// Emission scoring service configuration.
    pub pricing: PricingConfig,
    /// Ledger and reconciliation tuning.
    #[serde(default)]
    pub ledger: LedgerConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT configuration.
///
/// Daura only validates bearer tokens; issuance belongs to the identity
/// provider. The expiry here is used when minting development tokens.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// Secret key for verifying token signatures.
    pub secret: String,
    /// Token expiration in seconds (dev-token minting only).
    #[serde(default = "default_token_expiry")]
    pub token_expiry_secs: u64,
}

fn default_token_expiry() -> u64 {
    900 // 15 minutes
}

/// Emission scoring service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PricingConfig {
    /// Base URL of the scoring API.
    pub scoring_base_url: String,
    /// API key sent in the `X-API-KEY` header.
    pub scoring_api_key: String,
    /// Region code passed to the scoring service.
    #[serde(default = "default_region")]
    pub region: String,
    /// Emission factor source dataset.
    #[serde(default = "default_factor_source")]
    pub factor_source: String,
    /// Upper bound on a single scoring call, in seconds.
    #[serde(default = "default_scoring_timeout")]
    pub scoring_timeout_secs: u64,
}

fn default_region() -> String {
    "ID".to_string()
}

fn default_factor_source() -> String {
    "GHG_PROTOCOL".to_string()
}

fn default_scoring_timeout() -> u64 {
    10
}

/// Ledger and reconciliation tuning.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// How long an entry may sit in `recorded` before the sweep picks it up,
    /// in seconds.
    #[serde(default = "default_reconcile_grace")]
    pub reconcile_grace_secs: u64,
    /// Interval between reconciliation sweeps, in seconds.
    #[serde(default = "default_reconcile_interval")]
    pub reconcile_interval_secs: u64,
    /// Apply retries per entry before it is parked as `failed_apply`.
    #[serde(default = "default_max_apply_attempts")]
    pub max_apply_attempts: u32,
    /// Maximum entries examined per sweep.
    #[serde(default = "default_sweep_batch_size")]
    pub sweep_batch_size: u64,
}

fn default_reconcile_grace() -> u64 {
    300 // 5 minutes
}

fn default_reconcile_interval() -> u64 {
    60
}

fn default_max_apply_attempts() -> u32 {
    5
}

fn default_sweep_batch_size() -> u64 {
    100
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            reconcile_grace_secs: default_reconcile_grace(),
            reconcile_interval_secs: default_reconcile_interval(),
            max_apply_attempts: default_max_apply_attempts(),
            sweep_batch_size: default_sweep_batch_size(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("DAURA").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
