//! Project record and DTOs.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::{nullable, validate_non_negative, UnknownLabel};
use crate::types::{Date, DbId, Money, Timestamp};

/// Lifecycle status of a project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    #[default]
    Active,
    Completed,
    OnHold,
}

impl ProjectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::OnHold => "on-hold",
        }
    }
}

impl FromStr for ProjectStatus {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "on-hold" => Ok(Self::OnHold),
            other => Err(UnknownLabel {
                kind: "project status",
                value: other.to_string(),
            }),
        }
    }
}

/// A construction project. Root entity for expenses and payments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub start_date: Date,
    pub end_date: Option<Date>,
    pub budget: Money,
    pub status: ProjectStatus,
    pub client_name: String,
    pub location: String,
    /// Opaque reference to an attached document.
    pub file_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new project.
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_date_range"))]
pub struct CreateProject {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub start_date: Date,
    pub end_date: Option<Date>,
    #[validate(custom(function = "validate_non_negative"))]
    pub budget: Money,
    /// Defaults to `active` if omitted.
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub location: String,
    pub file_url: Option<String>,
}

fn validate_date_range(input: &CreateProject) -> Result<(), ValidationError> {
    match input.end_date {
        Some(end) if end < input.start_date => Err(ValidationError::new("end_before_start")),
        _ => Ok(()),
    }
}

/// DTO for updating an existing project. All fields are optional.
///
/// `end_date` and `file_url` are cleared by an explicit `null`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProject {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<Date>,
    #[serde(default, deserialize_with = "nullable")]
    pub end_date: Option<Option<Date>>,
    #[validate(custom(function = "validate_non_negative"))]
    pub budget: Option<Money>,
    pub status: Option<ProjectStatus>,
    pub client_name: Option<String>,
    pub location: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub file_url: Option<Option<String>>,
}
