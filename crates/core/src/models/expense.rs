//! Expense record, split value object, and DTOs.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{nullable, validate_positive, UnknownLabel};
use crate::types::{Date, DbId, Money, Timestamp};

/// Spending category of an expense.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseCategory {
    #[default]
    Materials,
    Labor,
    Equipment,
    Permits,
    Utilities,
    Other,
}

impl ExpenseCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Materials => "materials",
            Self::Labor => "labor",
            Self::Equipment => "equipment",
            Self::Permits => "permits",
            Self::Utilities => "utilities",
            Self::Other => "other",
        }
    }
}

impl FromStr for ExpenseCategory {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "materials" => Ok(Self::Materials),
            "labor" => Ok(Self::Labor),
            "equipment" => Ok(Self::Equipment),
            "permits" => Ok(Self::Permits),
            "utilities" => Ok(Self::Utilities),
            "other" => Ok(Self::Other),
            other => Err(UnknownLabel {
                kind: "expense category",
                value: other.to_string(),
            }),
        }
    }
}

/// Whether an expense is still expected or has already been incurred.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseStatus {
    #[default]
    Upcoming,
    Incurred,
}

impl ExpenseStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Incurred => "incurred",
        }
    }
}

impl FromStr for ExpenseStatus {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upcoming" => Ok(Self::Upcoming),
            "incurred" => Ok(Self::Incurred),
            other => Err(UnknownLabel {
                kind: "expense status",
                value: other.to_string(),
            }),
        }
    }
}

/// One project's share of a split expense.
///
/// Only exists nested inside [`Expense::splits`]. `amount` is always derived
/// from `percentage` and the expense total at normalization time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseSplit {
    pub project_id: DbId,
    pub amount: Money,
    pub percentage: Money,
}

/// A client-proposed allocation of an expense to a secondary project.
///
/// Any `amount` the client sends alongside is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitShare {
    pub project_id: DbId,
    pub percentage: Money,
}

impl From<&ExpenseSplit> for SplitShare {
    fn from(split: &ExpenseSplit) -> Self {
        Self {
            project_id: split.project_id,
            percentage: split.percentage,
        }
    }
}

/// An expense, attributed to its primary project or split across several.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: DbId,
    /// Primary project.
    pub project_id: DbId,
    /// Empty when the expense is wholly attributed to the primary project.
    #[serde(default)]
    pub splits: Vec<ExpenseSplit>,
    pub category: ExpenseCategory,
    pub description: String,
    /// Total amount before any split.
    pub amount: Money,
    pub date: Date,
    pub vendor: Option<String>,
    pub receipt_url: Option<String>,
    pub approved: bool,
    pub status: ExpenseStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Expense {
    pub fn is_split(&self) -> bool {
        !self.splits.is_empty()
    }
}

/// DTO for recording a new expense. `splits` lists secondary projects only.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateExpense {
    /// Filled from the path on project-scoped routes.
    #[serde(default)]
    pub project_id: DbId,
    #[serde(default)]
    pub splits: Vec<SplitShare>,
    #[serde(default)]
    pub category: ExpenseCategory,
    #[validate(length(min = 1, max = 500))]
    pub description: String,
    #[validate(custom(function = "validate_positive"))]
    pub amount: Money,
    pub date: Date,
    pub vendor: Option<String>,
    pub receipt_url: Option<String>,
    #[serde(default)]
    pub approved: bool,
    #[serde(default)]
    pub status: ExpenseStatus,
}

/// DTO for revising an expense. All fields are optional.
///
/// When `splits` is present it replaces the secondary allocations; an empty
/// list removes the split entirely. `vendor` and `receipt_url` are cleared by
/// an explicit `null`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateExpense {
    pub project_id: Option<DbId>,
    pub splits: Option<Vec<SplitShare>>,
    pub category: Option<ExpenseCategory>,
    #[validate(length(min = 1, max = 500))]
    pub description: Option<String>,
    #[validate(custom(function = "validate_positive"))]
    pub amount: Option<Money>,
    pub date: Option<Date>,
    #[serde(default, deserialize_with = "nullable")]
    pub vendor: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub receipt_url: Option<Option<String>>,
    pub approved: Option<bool>,
    pub status: Option<ExpenseStatus>,
}

impl UpdateExpense {
    /// Whether applying this update requires the split list to be re-derived.
    pub fn touches_allocation(&self) -> bool {
        self.project_id.is_some() || self.splits.is_some() || self.amount.is_some()
    }
}

/// A fully resolved expense ready to be written by a store.
///
/// Produced by the ledger after split normalization; stores persist it
/// verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub project_id: DbId,
    pub splits: Vec<ExpenseSplit>,
    pub category: ExpenseCategory,
    pub description: String,
    pub amount: Money,
    pub date: Date,
    pub vendor: Option<String>,
    pub receipt_url: Option<String>,
    pub approved: bool,
    pub status: ExpenseStatus,
}
