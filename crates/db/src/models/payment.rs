use buildledger_core::models::payment::Payment;
use buildledger_core::types::{Date, DbId, Money, Timestamp};
use sqlx::FromRow;

/// A row from the `payments` table.
#[derive(Debug, Clone, FromRow)]
pub struct PaymentRow {
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

impl From<PaymentRow> for Payment {
    fn from(row: PaymentRow) -> Self {
        Payment {
            id: row.id,
            project_id: row.project_id,
            amount: row.amount,
            date: row.date,
            payer: row.payer,
            method: row.method,
            note: row.note,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
