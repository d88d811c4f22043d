//! Payment record and DTOs.
//!
//! Payments are never split: each belongs to exactly one project.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{nullable, validate_positive};
use crate::types::{Date, DbId, Money, Timestamp};

/// Money received for a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: DbId,
    pub project_id: DbId,
    pub amount: Money,
    pub date: Date,
    pub payer: String,
    pub method: String,
    pub note: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for recording a new payment.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePayment {
    /// Filled from the path on project-scoped routes.
    #[serde(default)]
    pub project_id: DbId,
    #[validate(custom(function = "validate_positive"))]
    pub amount: Money,
    pub date: Date,
    #[validate(length(min = 1, max = 200))]
    pub payer: String,
    #[validate(length(min = 1, max = 100))]
    pub method: String,
    pub note: Option<String>,
}

/// DTO for updating an existing payment. All fields are optional; `note` is
/// cleared by an explicit `null`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdatePayment {
    pub project_id: Option<DbId>,
    #[validate(custom(function = "validate_positive"))]
    pub amount: Option<Money>,
    pub date: Option<Date>,
    #[validate(length(min = 1, max = 200))]
    pub payer: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub method: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub note: Option<Option<String>>,
}
