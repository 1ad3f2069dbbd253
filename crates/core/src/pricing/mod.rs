//! Rate resolution for activity pricing.
//!
//! Pricing always happens before any persistent record exists: a
//! submission that cannot be priced never reaches the ledger. Waste sales
//! resolve against the local rate table; emission reports are priced by
//! exactly one call to the external scoring service per resolution
//! attempt, with no caching and no internal retries.

pub mod error;
pub mod quote;
pub mod resolver;
pub mod scoring;

pub use error::PricingError;
pub use quote::{RateQuote, RateSource};
pub use resolver::{RateLookup, RateResolver};
pub use scoring::{EmissionScorer, ScoringClient, ScoringError, ScoringRequest};
