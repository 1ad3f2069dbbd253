//! Account repository for balance reads and provisioning.

use daura_shared::types::AccountId;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, Set};

use crate::entities::accounts;

/// Repository for account rows.
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Point-reads an account by id.
    pub async fn find_by_id(&self, id: AccountId) -> Result<Option<accounts::Model>, DbErr> {
        accounts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
    }

    /// Creates an account with a zero balance.
    ///
    /// Identity lives outside this service; provisioning exists for the
    /// seeder and for tests.
    pub async fn create(
        &self,
        id: AccountId,
        display_name: &str,
    ) -> Result<accounts::Model, DbErr> {
        accounts::ActiveModel {
            id: Set(id.into_inner()),
            display_name: Set(display_name.to_string()),
            balance: Set(Decimal::ZERO),
            ..Default::default()
        }
        .insert(&self.db)
        .await
    }
}
