//! Handlers for the `/projects` resource and its project-scoped
//! expense, payment, and summary reads.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use buildledger_core::error::CoreError;
use buildledger_core::ledger;
use buildledger_core::models::expense::CreateExpense;
use buildledger_core::models::payment::CreatePayment;
use buildledger_core::models::project::{CreateProject, UpdateProject};
use buildledger_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/projects
pub async fn create(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateProject>,
) -> AppResult<impl IntoResponse> {
    let project = ledger::create_project(state.store(), &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: project })))
}

/// GET /api/v1/projects
pub async fn list(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let projects = state.store().list_projects().await.map_err(CoreError::from)?;
    Ok(Json(DataResponse { data: projects }))
}

/// GET /api/v1/projects/overview
///
/// One split-aware summary per project, for list views.
pub async fn overview(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let summaries = ledger::project_overview(state.store()).await?;
    Ok(Json(DataResponse { data: summaries }))
}

/// GET /api/v1/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let project = state
        .store()
        .find_project(id)
        .await
        .map_err(CoreError::from)?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;
    Ok(Json(DataResponse { data: project }))
}

/// PUT /api/v1/projects/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<UpdateProject>,
) -> AppResult<impl IntoResponse> {
    let project = ledger::update_project(state.store(), id, &input).await?;
    Ok(Json(DataResponse { data: project }))
}

/// DELETE /api/v1/projects/{id}
///
/// Cascades to the project's own expenses and payments and reports expenses
/// of other projects still split into it.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let removal = ledger::remove_project(state.store(), id).await?;
    Ok(Json(DataResponse { data: removal }))
}

/// GET /api/v1/projects/{id}/summary
pub async fn summary(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let summary = ledger::project_summary(state.store(), id).await?;
    Ok(Json(DataResponse { data: summary }))
}

/// GET /api/v1/projects/{id}/expenses
///
/// Expenses owned by or split into the project, with the attributed share.
pub async fn list_expenses(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let expenses = ledger::project_expenses(state.store(), id).await?;
    Ok(Json(DataResponse { data: expenses }))
}

/// POST /api/v1/projects/{id}/expenses
pub async fn create_expense(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    AppJson(mut input): AppJson<CreateExpense>,
) -> AppResult<impl IntoResponse> {
    input.project_id = id;
    let expense = ledger::record_expense(state.store(), &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: expense })))
}

/// GET /api/v1/projects/{id}/payments
pub async fn list_payments(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let store = state.store();
    if store.find_project(id).await.map_err(CoreError::from)?.is_none() {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }));
    }
    let payments = store
        .list_payments_by_project(id)
        .await
        .map_err(CoreError::from)?;
    Ok(Json(DataResponse { data: payments }))
}

/// POST /api/v1/projects/{id}/payments
pub async fn create_payment(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    AppJson(mut input): AppJson<CreatePayment>,
) -> AppResult<impl IntoResponse> {
    input.project_id = id;
    let payment = ledger::record_payment(state.store(), &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: payment })))
}
