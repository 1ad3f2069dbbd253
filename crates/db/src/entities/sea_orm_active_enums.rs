//! `SeaORM` active enums mapping the Postgres enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Activity kind an entry was born from (`activity_kind` in Postgres).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "activity_kind")]
pub enum ActivityKind {
    /// Consumption activity scored for emissions.
    #[sea_orm(string_value = "emission_report")]
    EmissionReport,
    /// Recyclable waste sold for points.
    #[sea_orm(string_value = "waste_sale")]
    WasteSale,
}

/// Measurement unit for a submitted quantity (`activity_unit` in Postgres).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "activity_unit")]
pub enum ActivityUnit {
    /// Kilograms.
    #[sea_orm(string_value = "kg")]
    Kg,
    /// Kilometers.
    #[sea_orm(string_value = "km")]
    Km,
    /// Kilowatt-hours.
    #[sea_orm(string_value = "kwh")]
    Kwh,
    /// Liters.
    #[sea_orm(string_value = "liter")]
    Liter,
}

/// Application status of a ledger entry (`entry_status` in Postgres).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "entry_status")]
pub enum EntryStatus {
    /// Value is reflected in the account balance (or carries none).
    #[sea_orm(string_value = "applied")]
    Applied,
    /// Apply retry budget exhausted, parked for review.
    #[sea_orm(string_value = "failed_apply")]
    FailedApply,
    /// Durably written, balance not yet updated.
    #[sea_orm(string_value = "recorded")]
    Recorded,
}

/// Where a rate came from (`rate_source` in Postgres).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "rate_source")]
pub enum RateSource {
    /// Remote emission scoring service.
    #[sea_orm(string_value = "external_service")]
    ExternalService,
    /// Seeded waste-rate catalog.
    #[sea_orm(string_value = "local_table")]
    LocalTable,
}
