//! Schema migration runner.
//!
//! Thin wrapper around the sea-orm-migration CLI: `migrator up` applies
//! pending migrations, `down` rolls back, `status` lists, `fresh` rebuilds
//! from nothing. Reads `DATABASE_URL` from the environment or `.env`.

use daura_db::migration::Migrator;
use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // The CLI sets up its own tracing.
    cli::run_cli(Migrator).await;
}
