//! Core accounting pipeline for Daura.
//!
//! This crate contains the activity-to-ledger pipeline with ZERO web or
//! database dependencies. Persistence sits behind the [`ledger::LedgerStore`]
//! port and rate lookups behind [`pricing::RateLookup`], so the whole
//! pipeline is testable against in-memory fakes.
//!
//! # Modules
//!
//! - `activity` - Activity kinds, units, and submission validation
//! - `pricing` - Rate resolution via the local table or the scoring service
//! - `ledger` - Ledger entry domain types, value math, and the store port
//! - `accounting` - The orchestrator driving pricing, append, and apply

pub mod accounting;
pub mod activity;
pub mod ledger;
pub mod pricing;
