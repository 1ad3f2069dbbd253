//! Submission validation rules.

use rust_decimal::Decimal;
use thiserror::Error;

use super::types::{ActivityKind, ActivityRequest, Unit};

/// Maximum decimal places accepted on a quantity.
pub const MAX_QUANTITY_SCALE: u32 = 3;

/// Maximum length of an activity category code.
pub const MAX_CODE_LEN: usize = 64;

/// Maximum length of a client idempotency key.
pub const MAX_IDEMPOTENCY_KEY_LEN: usize = 128;

/// Validation errors for activity submissions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Quantity must be strictly positive.
    #[error("Quantity must be positive")]
    NonPositiveQuantity,

    /// Quantity carries more precision than a physical measurement can.
    #[error("Quantity must have at most 3 decimal places")]
    QuantityTooPrecise,

    /// The unit is not accepted for the activity kind.
    #[error("Unit '{unit}' is not valid for activity kind '{kind}'")]
    UnitMismatch {
        /// Kind that was submitted.
        kind: ActivityKind,
        /// Unit that was submitted.
        unit: Unit,
    },

    /// Category code is empty.
    #[error("Activity code must not be empty")]
    EmptyCode,

    /// Category code exceeds the length limit.
    #[error("Activity code must be at most 64 characters")]
    CodeTooLong,

    /// Idempotency key exceeds the length limit.
    #[error("Idempotency key must be at most 128 characters")]
    IdempotencyKeyTooLong,
}

/// Validates an activity submission end to end.
///
/// # Errors
///
/// Returns the first rule the request violates.
pub fn validate_request(request: &ActivityRequest) -> Result<(), ValidationError> {
    validate_quantity(request.quantity)?;
    validate_unit(request.kind, request.unit)?;
    validate_code(&request.code)?;
    if let Some(key) = request.idempotency_key.as_deref() {
        validate_idempotency_key(key)?;
    }
    Ok(())
}

/// Validates that a quantity is positive and reasonably scaled.
///
/// Trailing zeros do not count against the scale limit: `1.5000` kg is
/// accepted, `0.0001` kg is not.
///
/// # Errors
///
/// Returns an error if the quantity is zero, negative, or too precise.
pub fn validate_quantity(quantity: Decimal) -> Result<(), ValidationError> {
    if quantity <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveQuantity);
    }
    if quantity.normalize().scale() > MAX_QUANTITY_SCALE {
        return Err(ValidationError::QuantityTooPrecise);
    }
    Ok(())
}

/// Validates that the unit is accepted for the activity kind.
///
/// # Errors
///
/// Returns an error if the unit is not in the kind's allowed set.
pub fn validate_unit(kind: ActivityKind, unit: Unit) -> Result<(), ValidationError> {
    if kind.allowed_units().contains(&unit) {
        Ok(())
    } else {
        Err(ValidationError::UnitMismatch { kind, unit })
    }
}

/// Validates an activity category code.
///
/// # Errors
///
/// Returns an error if the code is empty or too long.
pub fn validate_code(code: &str) -> Result<(), ValidationError> {
    if code.trim().is_empty() {
        return Err(ValidationError::EmptyCode);
    }
    if code.len() > MAX_CODE_LEN {
        return Err(ValidationError::CodeTooLong);
    }
    Ok(())
}

/// Validates a client idempotency key.
///
/// # Errors
///
/// Returns an error if the key is too long.
pub fn validate_idempotency_key(key: &str) -> Result<(), ValidationError> {
    if key.len() > MAX_IDEMPOTENCY_KEY_LEN {
        return Err(ValidationError::IdempotencyKeyTooLong);
    }
    Ok(())
}
