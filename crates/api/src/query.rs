//! Query parameter types for API handlers.

use buildledger_core::aggregation::PortfolioScope;
use buildledger_core::types::DbId;
use serde::Deserialize;

/// `?project_id=` narrowing a read to one project. Absent means all projects.
#[derive(Debug, Default, Deserialize)]
pub struct ProjectScopeParams {
    pub project_id: Option<DbId>,
}

impl ProjectScopeParams {
    pub fn scope(&self) -> PortfolioScope {
        self.project_id.into()
    }
}
