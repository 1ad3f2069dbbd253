//! Postgres persistence for the accounting pipeline.
//!
//! `SeaORM` entities mirror the migrated schema; the repositories implement
//! the `daura-core` store and lookup ports on top of them. Nothing outside
//! this crate writes SQL.

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{AccountRepository, LedgerRepository, RateRepository};

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Opens the shared connection pool.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}
