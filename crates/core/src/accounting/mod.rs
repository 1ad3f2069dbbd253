//! The accounting orchestrator: one submission in, one priced entry out.
//!
//! Everything observable about the pipeline is decided here: the
//! validate-price-append-apply ordering, what each failure class means
//! for the caller, and the reconciliation sweep that guarantees an
//! appended entry is eventually applied exactly once or parked for
//! review.

pub mod error;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;

#[cfg(test)]
mod service_props;

pub use error::{ReversalError, SubmitError};
pub use service::{AccountingService, SubmitOutcome, SweepReport};
