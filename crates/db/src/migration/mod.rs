//! Schema migrations, applied in order by the migrator binary.

pub use sea_orm_migration::prelude::*;

mod m20260815_000001_initial;

/// Registry of every migration this crate knows about.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20260815_000001_initial::Migration)]
    }
}
