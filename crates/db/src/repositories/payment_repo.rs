//! Repository for the `payments` table.

use buildledger_core::models::payment::{CreatePayment, Payment, UpdatePayment};
use buildledger_core::types::DbId;
use sqlx::PgPool;

use crate::models::payment::PaymentRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, project_id, amount, date, payer, method, note, created_at, updated_at";

/// Provides CRUD operations for payments.
pub struct PaymentRepo;

impl PaymentRepo {
    /// Insert a new payment, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreatePayment) -> Result<Payment, sqlx::Error> {
        let query = format!(
            "INSERT INTO payments (project_id, amount, date, payer, method, note)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, PaymentRow>(&query)
            .bind(input.project_id)
            .bind(input.amount)
            .bind(input.date)
            .bind(&input.payer)
            .bind(&input.method)
            .bind(&input.note)
            .fetch_one(pool)
            .await?;
        Ok(row.into())
    }

    /// Find a payment by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Payment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM payments WHERE id = $1");
        let row = sqlx::query_as::<_, PaymentRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Payment::from))
    }

    /// List all payments, most recent date first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Payment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM payments ORDER BY date DESC, id DESC");
        let rows = sqlx::query_as::<_, PaymentRow>(&query)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(Payment::from).collect())
    }

    /// List payments belonging to `project_id`, most recent date first.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<Payment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM payments WHERE project_id = $1 ORDER BY date DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, PaymentRow>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(Payment::from).collect())
    }

    /// Update a payment. Only non-`None` fields in `input` are applied;
    /// `note` uses `Option<Option<String>>` so it can be cleared.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePayment,
    ) -> Result<Option<Payment>, sqlx::Error> {
        let query = format!(
            "UPDATE payments SET
                project_id = COALESCE($2, project_id),
                amount = COALESCE($3, amount),
                date = COALESCE($4, date),
                payer = COALESCE($5, payer),
                method = COALESCE($6, method),
                note = CASE WHEN $8 THEN $7 ELSE note END,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, PaymentRow>(&query)
            .bind(id)
            .bind(input.project_id)
            .bind(input.amount)
            .bind(input.date)
            .bind(&input.payer)
            .bind(&input.method)
            .bind(input.note.as_ref().and_then(|v| v.as_deref()))
            .bind(input.note.is_some())
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Payment::from))
    }

    /// Delete a payment by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM payments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every payment of `project_id`. Returns the number removed.
    pub async fn delete_by_project(pool: &PgPool, project_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM payments WHERE project_id = $1")
            .bind(project_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
