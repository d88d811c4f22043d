//! Handler for the portfolio dashboard.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use buildledger_core::ledger;

use crate::error::AppResult;
use crate::query::ProjectScopeParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/dashboard?project_id=
///
/// Split-aware totals across every project, or a single one when
/// `project_id` is given.
pub async fn summary(
    State(state): State<AppState>,
    Query(params): Query<ProjectScopeParams>,
) -> AppResult<impl IntoResponse> {
    let data = ledger::dashboard(state.store(), params.scope()).await?;
    Ok(Json(DataResponse { data }))
}
