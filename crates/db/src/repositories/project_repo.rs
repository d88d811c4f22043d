//! Repository for the `projects` table.

use buildledger_core::models::project::{CreateProject, Project, UpdateProject};
use buildledger_core::types::DbId;
use sqlx::PgPool;

use crate::models::project::ProjectRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description, start_date, end_date, budget, status, \
                       client_name, location, file_url, created_at, updated_at";

/// Provides CRUD operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateProject) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects
                (name, description, start_date, end_date, budget, status,
                 client_name, location, file_url)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProjectRow>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.budget)
            .bind(input.status.as_str())
            .bind(&input.client_name)
            .bind(&input.location)
            .bind(&input.file_url)
            .fetch_one(pool)
            .await?
            .try_into()
    }

    /// Find a project by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, ProjectRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .map(Project::try_from)
            .transpose()
    }

    /// List all projects ordered by most recently created first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, ProjectRow>(&query)
            .fetch_all(pool)
            .await?
            .into_iter()
            .map(Project::try_from)
            .collect()
    }

    /// Update a project. Only non-`None` fields in `input` are applied;
    /// `end_date` and `file_url` use `Option<Option<_>>` so they can be
    /// cleared.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProject,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                start_date = COALESCE($4, start_date),
                end_date = CASE WHEN $11 THEN $5 ELSE end_date END,
                budget = COALESCE($6, budget),
                status = COALESCE($7, status),
                client_name = COALESCE($8, client_name),
                location = COALESCE($9, location),
                file_url = CASE WHEN $12 THEN $10 ELSE file_url END,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProjectRow>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.budget)
            .bind(input.status.map(|s| s.as_str()))
            .bind(&input.client_name)
            .bind(&input.location)
            .bind(input.file_url.as_ref().and_then(|v| v.as_deref()))
            .bind(input.end_date.is_some())
            .bind(input.file_url.is_some())
            .fetch_optional(pool)
            .await?
            .map(Project::try_from)
            .transpose()
    }

    /// Delete a project by ID. Returns `true` if a row was removed.
    ///
    /// Rows in `expenses` and `payments` that reference it as their project
    /// are removed by `ON DELETE CASCADE`.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
