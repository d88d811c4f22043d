//! Domain records and DTOs.
//!
//! Each submodule contains:
//! - A `Serialize` record struct as stored and returned to callers
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod expense;
pub mod payment;
pub mod project;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use validator::ValidationError;

use crate::allocation::CURRENCY_SCALE;
use crate::types::{Money, MAX_AMOUNT};

/// Whole cents, no larger than a money column holds.
fn validate_storable(value: &Money) -> Result<(), ValidationError> {
    if value.round_dp(CURRENCY_SCALE) != *value {
        return Err(ValidationError::new("sub_cent_amount"));
    }
    if *value > MAX_AMOUNT {
        return Err(ValidationError::new("amount_too_large"));
    }
    Ok(())
}

/// Reject negative currency amounts (budgets may be zero).
pub(crate) fn validate_non_negative(value: &Money) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        return Err(ValidationError::new("negative_amount"));
    }
    validate_storable(value)
}

/// Reject zero or negative currency amounts.
pub(crate) fn validate_positive(value: &Money) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        return Err(ValidationError::new("non_positive_amount"));
    }
    validate_storable(value)
}

/// Deserialize a clearable update field: absent stays `None` (through
/// `#[serde(default)]`), an explicit `null` becomes `Some(None)`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Error returned when a stored enum label does not match any variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownLabel {
    pub kind: &'static str,
    pub value: String,
}
