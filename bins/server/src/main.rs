//! Daura API server.
//!
//! Boots the HTTP surface and the background reconciliation sweep over a
//! shared accounting pipeline.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use daura_api::{AppState, create_router};
use daura_core::accounting::AccountingService;
use daura_core::pricing::{RateResolver, ScoringClient};
use daura_db::{LedgerRepository, RateRepository, connect};
use daura_shared::{AppConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "daura=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Connect to database
    let db = connect(&config.database.url).await?;
    info!("Connected to database");

    // Create JWT service
    let jwt_service = JwtService::new((&config.jwt).into());

    // Wire the accounting pipeline: repositories as the store and rate
    // table ports, the scoring client as the emission rate source.
    let ledger_repo = Arc::new(LedgerRepository::new(db.clone()));
    let rate_repo = Arc::new(RateRepository::new(db.clone()));
    let scorer = Arc::new(ScoringClient::new(&config.pricing));
    let resolver = RateResolver::new(
        rate_repo,
        scorer,
        Duration::from_secs(config.pricing.scoring_timeout_secs),
    );
    let accounting = Arc::new(AccountingService::new(
        ledger_repo,
        resolver,
        &config.ledger,
    ));

    // Background reconciliation sweep. The first tick fires immediately,
    // so entries stranded by a crash are picked up on restart.
    let sweeper = Arc::clone(&accounting);
    let interval_secs = config.ledger.reconcile_interval_secs.max(1);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match sweeper.reconcile_once(chrono::Utc::now()).await {
                Ok(report) if report.examined > 0 => {
                    info!(
                        examined = report.examined,
                        applied = report.applied,
                        parked = report.parked,
                        "Reconciliation sweep finished"
                    );
                }
                Ok(_) => {}
                Err(e) => {
                    error!(error = %e, "Reconciliation sweep failed");
                }
            }
        }
    });
    info!(interval_secs, "Reconciliation sweep scheduled");

    // Create application state
    let state = AppState {
        db: Arc::new(db),
        jwt_service: Arc::new(jwt_service),
        accounting,
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
