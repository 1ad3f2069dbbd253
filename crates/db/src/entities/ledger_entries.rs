//! `SeaORM` Entity for ledger_entries table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{ActivityKind, ActivityUnit, EntryStatus, RateSource};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub account_id: Uuid,
    pub kind: ActivityKind,
    pub code: String,
    pub quantity: Decimal,
    pub unit: ActivityUnit,
    pub rate: Decimal,
    pub rate_source: RateSource,
    pub priced_at: DateTimeWithTimeZone,
    pub value: Decimal,
    pub status: EntryStatus,
    pub idempotency_key: Option<String>,
    pub reverses: Option<Uuid>,
    pub apply_attempts: i32,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id"
    )]
    Accounts,
    #[sea_orm(belongs_to = "Entity", from = "Column::Reverses", to = "Column::Id")]
    SelfRef,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
