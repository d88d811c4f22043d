//! Repository for the `expenses` table.

use buildledger_core::models::expense::{Expense, NewExpense};
use buildledger_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::expense::ExpenseRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_id, splits, category, description, amount, date, \
                       vendor, receipt_url, approved, status, created_at, updated_at";

/// Provides CRUD operations for expenses.
///
/// Split lists are written exactly as given; normalization happens before
/// anything reaches this layer.
pub struct ExpenseRepo;

impl ExpenseRepo {
    /// Insert a new expense, returning the created row.
    pub async fn create(pool: &PgPool, input: &NewExpense) -> Result<Expense, sqlx::Error> {
        let query = format!(
            "INSERT INTO expenses
                (project_id, splits, category, description, amount, date,
                 vendor, receipt_url, approved, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ExpenseRow>(&query)
            .bind(input.project_id)
            .bind(Json(&input.splits))
            .bind(input.category.as_str())
            .bind(&input.description)
            .bind(input.amount)
            .bind(input.date)
            .bind(&input.vendor)
            .bind(&input.receipt_url)
            .bind(input.approved)
            .bind(input.status.as_str())
            .fetch_one(pool)
            .await?
            .try_into()
    }

    /// Find an expense by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Expense>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM expenses WHERE id = $1");
        sqlx::query_as::<_, ExpenseRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .map(Expense::try_from)
            .transpose()
    }

    /// List all expenses, most recent date first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Expense>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM expenses ORDER BY date DESC, id DESC");
        sqlx::query_as::<_, ExpenseRow>(&query)
            .fetch_all(pool)
            .await?
            .into_iter()
            .map(Expense::try_from)
            .collect()
    }

    /// List expenses whose primary project is `project_id`.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<Expense>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM expenses WHERE project_id = $1 ORDER BY date DESC, id DESC"
        );
        sqlx::query_as::<_, ExpenseRow>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await?
            .into_iter()
            .map(Expense::try_from)
            .collect()
    }

    /// Replace every mutable column of an expense.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &NewExpense,
    ) -> Result<Option<Expense>, sqlx::Error> {
        let query = format!(
            "UPDATE expenses SET
                project_id = $2,
                splits = $3,
                category = $4,
                description = $5,
                amount = $6,
                date = $7,
                vendor = $8,
                receipt_url = $9,
                approved = $10,
                status = $11,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ExpenseRow>(&query)
            .bind(id)
            .bind(input.project_id)
            .bind(Json(&input.splits))
            .bind(input.category.as_str())
            .bind(&input.description)
            .bind(input.amount)
            .bind(input.date)
            .bind(&input.vendor)
            .bind(&input.receipt_url)
            .bind(input.approved)
            .bind(input.status.as_str())
            .fetch_optional(pool)
            .await?
            .map(Expense::try_from)
            .transpose()
    }

    /// Delete an expense by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every expense whose primary project is `project_id`.
    ///
    /// Expenses that only reference the project inside `splits` are kept.
    pub async fn delete_by_project(pool: &PgPool, project_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM expenses WHERE project_id = $1")
            .bind(project_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
