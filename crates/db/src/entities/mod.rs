//! `SeaORM` entities for the Daura schema.

pub mod accounts;
pub mod ledger_entries;
pub mod sea_orm_active_enums;
pub mod waste_rates;
