//! Input boundary checks
//!
//! Values outside their domain are rejected, never clamped.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} must not be negative, got {value}")]
    Negative { field: String, value: Decimal },
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: String, value: Decimal },
    #[error("{field} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        field: String,
        value: Decimal,
        min: Decimal,
        max: Decimal,
    },
    #[error("{field} is required")]
    Missing { field: String },
    #[error("{field} is too large to represent")]
    Overflow { field: String },
}

pub fn ensure_non_negative(field: &str, value: Decimal) -> Result<Decimal, ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::Negative {
            field: field.to_string(),
            value,
        });
    }
    Ok(value)
}

pub fn ensure_positive(field: &str, value: Decimal) -> Result<Decimal, ValidationError> {
    if value <= Decimal::ZERO {
        return Err(ValidationError::NotPositive {
            field: field.to_string(),
            value,
        });
    }
    Ok(value)
}

pub fn ensure_in_range(
    field: &str,
    value: Decimal,
    min: Decimal,
    max: Decimal,
) -> Result<Decimal, ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            value,
            min,
            max,
        });
    }
    Ok(value)
}

/// Percentages and rates live in [0, 100].
pub fn ensure_percent(field: &str, value: Decimal) -> Result<Decimal, ValidationError> {
    ensure_in_range(field, value, Decimal::ZERO, dec!(100))
}

/// Turn the result of a checked Decimal operation into a value or an error.
pub fn ensure_representable(field: &str, value: Option<Decimal>) -> Result<Decimal, ValidationError> {
    value.ok_or_else(|| ValidationError::Overflow {
        field: field.to_string(),
    })
}

pub fn ensure_present(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Missing {
            field: field.to_string(),
        });
    }
    Ok(())
}
