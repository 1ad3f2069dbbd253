//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application. The ledger and rate repositories also implement the
//! `daura-core` store and lookup ports.

pub mod account;
pub mod ledger;
pub mod rates;

pub use account::AccountRepository;
pub use ledger::LedgerRepository;
pub use rates::RateRepository;
