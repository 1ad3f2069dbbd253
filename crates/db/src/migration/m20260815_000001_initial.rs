//! Initial database migration.
//!
//! Creates the accounts, ledger_entries, and waste_rates tables with their
//! enums, constraints, and the entry-immutability trigger.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: CORE TABLES
        // ============================================================
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(LEDGER_ENTRIES_SQL).await?;
        db.execute_unprepared(WASTE_RATES_SQL).await?;

        // ============================================================
        // PART 3: TRIGGERS & FUNCTIONS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        // ============================================================
        // PART 4: SEED DATA
        // ============================================================
        db.execute_unprepared(SEED_WASTE_RATES_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Activity kinds the pipeline accepts
CREATE TYPE activity_kind AS ENUM ('waste_sale', 'emission_report');

-- Measurement units, validated per kind in application code
CREATE TYPE activity_unit AS ENUM ('kg', 'kwh', 'liter', 'km');

-- Ledger entry application status
CREATE TYPE entry_status AS ENUM ('recorded', 'applied', 'failed_apply');

-- Where a rate was resolved from
CREATE TYPE rate_source AS ENUM ('local_table', 'external_service');
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    display_name VARCHAR(120) NOT NULL,
    balance NUMERIC(19, 4) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_balance_non_negative CHECK (balance >= 0)
);
";

const LEDGER_ENTRIES_SQL: &str = r"
CREATE TABLE ledger_entries (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    account_id UUID NOT NULL REFERENCES accounts(id),
    kind activity_kind NOT NULL,
    code VARCHAR(64) NOT NULL,
    quantity NUMERIC(19, 4) NOT NULL,
    unit activity_unit NOT NULL,
    rate NUMERIC(19, 6) NOT NULL,
    rate_source rate_source NOT NULL,
    priced_at TIMESTAMPTZ NOT NULL,
    value NUMERIC(19, 4) NOT NULL,
    status entry_status NOT NULL DEFAULT 'recorded',
    idempotency_key VARCHAR(128),
    reverses UUID REFERENCES ledger_entries(id),
    apply_attempts INTEGER NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_quantity_positive CHECK (quantity > 0),
    CONSTRAINT chk_apply_attempts_non_negative CHECK (apply_attempts >= 0)
);

-- One live entry per (account, idempotency key); keyless submissions are exempt
CREATE UNIQUE INDEX uq_le_account_idempotency_key
    ON ledger_entries(account_id, idempotency_key)
    WHERE idempotency_key IS NOT NULL;

CREATE INDEX idx_le_account_created ON ledger_entries(account_id, created_at DESC);
CREATE INDEX idx_le_status_created ON ledger_entries(status, created_at);
";

const WASTE_RATES_SQL: &str = r"
CREATE TABLE waste_rates (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    code VARCHAR(64) NOT NULL UNIQUE,
    label VARCHAR(120) NOT NULL,
    unit activity_unit NOT NULL DEFAULT 'kg',
    rate NUMERIC(19, 6) NOT NULL,
    active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_rate_positive CHECK (rate > 0)
);
";

const TRIGGERS_SQL: &str = r"
-- ============================================================
-- FUNCTION: prevent_entry_mutation
-- Ledger entries are append-only: pricing fields never change
-- and a terminal status never transitions again
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_entry_mutation()
RETURNS TRIGGER AS $$
BEGIN
    IF NEW.account_id <> OLD.account_id
        OR NEW.kind <> OLD.kind
        OR NEW.code <> OLD.code
        OR NEW.quantity <> OLD.quantity
        OR NEW.unit <> OLD.unit
        OR NEW.rate <> OLD.rate
        OR NEW.rate_source <> OLD.rate_source
        OR NEW.priced_at <> OLD.priced_at
        OR NEW.value <> OLD.value
        OR NEW.idempotency_key IS DISTINCT FROM OLD.idempotency_key
        OR NEW.reverses IS DISTINCT FROM OLD.reverses
    THEN
        RAISE EXCEPTION 'Ledger entries are immutable. Create a reversal entry instead.';
    END IF;

    IF OLD.status <> 'recorded' AND NEW.status <> OLD.status THEN
        RAISE EXCEPTION 'Entry status % is terminal.', OLD.status;
    END IF;

    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_prevent_entry_mutation
BEFORE UPDATE ON ledger_entries
FOR EACH ROW
EXECUTE FUNCTION prevent_entry_mutation();
";

const SEED_WASTE_RATES_SQL: &str = r"
-- ============================================================
-- SEED: Waste-sale rate catalog (points per kg)
-- ============================================================
INSERT INTO waste_rates (code, label, unit, rate) VALUES
('pet_plastic', 'PET plastic bottles', 'kg', 10.000000),
('hdpe_plastic', 'HDPE plastic containers', 'kg', 8.000000),
('aluminum_can', 'Aluminum cans', 'kg', 15.000000),
('cardboard', 'Cardboard and carton', 'kg', 4.000000),
('paper', 'Mixed paper', 'kg', 3.000000),
('glass_bottle', 'Glass bottles', 'kg', 2.000000);
";

const DROP_ALL_SQL: &str = r"
-- ============================================================
-- DROP ALL: Rollback migration
-- Order matters due to foreign key constraints
-- ============================================================

-- Drop triggers
DROP TRIGGER IF EXISTS trg_prevent_entry_mutation ON ledger_entries;

-- Drop functions
DROP FUNCTION IF EXISTS prevent_entry_mutation();

-- Drop tables (reverse order of creation)
DROP TABLE IF EXISTS waste_rates CASCADE;
DROP TABLE IF EXISTS ledger_entries CASCADE;
DROP TABLE IF EXISTS accounts CASCADE;

-- Drop enums
DROP TYPE IF EXISTS rate_source;
DROP TYPE IF EXISTS entry_status;
DROP TYPE IF EXISTS activity_unit;
DROP TYPE IF EXISTS activity_kind;
";
