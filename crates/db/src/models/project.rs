use buildledger_core::models::project::Project;
use buildledger_core::types::{Date, DbId, Money, Timestamp};
use sqlx::FromRow;

use crate::decode_error;

/// A row from the `projects` table.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectRow {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub start_date: Date,
    pub end_date: Option<Date>,
    pub budget: Money,
    pub status: String,
    pub client_name: String,
    pub location: String,
    pub file_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<ProjectRow> for Project {
    type Error = sqlx::Error;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        Ok(Project {
            id: row.id,
            name: row.name,
            description: row.description,
            start_date: row.start_date,
            end_date: row.end_date,
            budget: row.budget,
            status: row.status.parse().map_err(decode_error)?,
            client_name: row.client_name,
            location: row.location,
            file_url: row.file_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
