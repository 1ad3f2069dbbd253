//! Rate repository for the waste-sale rate catalog.

use daura_core::pricing::{PricingError, RateLookup};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder};

use crate::entities::waste_rates;

/// Repository for the seeded waste-rate catalog.
pub struct RateRepository {
    db: DatabaseConnection,
}

impl RateRepository {
    /// Creates a new rate repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists the active catalog for price display, ordered by code.
    pub async fn active_rates(&self) -> Result<Vec<waste_rates::Model>, DbErr> {
        waste_rates::Entity::find()
            .filter(waste_rates::Column::Active.eq(true))
            .order_by_asc(waste_rates::Column::Code)
            .all(&self.db)
            .await
    }
}

#[async_trait::async_trait]
impl RateLookup for RateRepository {
    async fn waste_rate(&self, code: &str) -> Result<Option<Decimal>, PricingError> {
        let row = waste_rates::Entity::find()
            .filter(waste_rates::Column::Code.eq(code))
            .filter(waste_rates::Column::Active.eq(true))
            .one(&self.db)
            .await
            .map_err(|e| PricingError::RateUnavailable(e.to_string()))?;

        Ok(row.map(|r| r.rate))
    }
}
