//! Activity domain types and submission validation.
//!
//! An activity is a user-reported real-world event: selling recyclable
//! waste at a collection point, or reporting consumption for emissions
//! accounting. Validation runs before pricing, so a rejected submission
//! has no side effects anywhere.

pub mod types;
pub mod validation;

#[cfg(test)]
mod validation_props;

pub use types::{ActivityKind, ActivityRequest, Unit};
pub use validation::{ValidationError, validate_request};
