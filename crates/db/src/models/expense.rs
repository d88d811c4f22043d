use buildledger_core::models::expense::{Expense, ExpenseSplit};
use buildledger_core::types::{Date, DbId, Money, Timestamp};
use sqlx::types::Json;
use sqlx::FromRow;

use crate::decode_error;

/// A row from the `expenses` table. Splits live in a JSONB column.
#[derive(Debug, Clone, FromRow)]
pub struct ExpenseRow {
    pub id: DbId,
    pub project_id: DbId,
    pub splits: Json<Vec<ExpenseSplit>>,
    pub category: String,
    pub description: String,
    pub amount: Money,
    pub date: Date,
    pub vendor: Option<String>,
    pub receipt_url: Option<String>,
    pub approved: bool,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<ExpenseRow> for Expense {
    type Error = sqlx::Error;

    fn try_from(row: ExpenseRow) -> Result<Self, Self::Error> {
        Ok(Expense {
            id: row.id,
            project_id: row.project_id,
            splits: row.splits.0,
            category: row.category.parse().map_err(decode_error)?,
            description: row.description,
            amount: row.amount,
            date: row.date,
            vendor: row.vendor,
            receipt_url: row.receipt_url,
            approved: row.approved,
            status: row.status.parse().map_err(decode_error)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
