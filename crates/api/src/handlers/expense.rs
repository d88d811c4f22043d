//! Handlers for the `/expenses` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use buildledger_core::error::CoreError;
use buildledger_core::ledger;
use buildledger_core::models::expense::{CreateExpense, UpdateExpense};
use buildledger_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Expense",
        id,
    })
}

/// POST /api/v1/expenses
///
/// `splits` lists secondary projects only; the primary project's remainder
/// entry is derived.
pub async fn create(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateExpense>,
) -> AppResult<impl IntoResponse> {
    let expense = ledger::record_expense(state.store(), &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: expense })))
}

/// GET /api/v1/expenses
pub async fn list(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let expenses = state.store().list_expenses().await.map_err(CoreError::from)?;
    Ok(Json(DataResponse { data: expenses }))
}

/// GET /api/v1/expenses/integrity
pub async fn integrity(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let issues = ledger::split_integrity(state.store()).await?;
    Ok(Json(DataResponse { data: issues }))
}

/// GET /api/v1/expenses/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let expense = state
        .store()
        .find_expense(id)
        .await
        .map_err(CoreError::from)?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: expense }))
}

/// PUT /api/v1/expenses/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<UpdateExpense>,
) -> AppResult<impl IntoResponse> {
    let expense = ledger::revise_expense(state.store(), id, &input).await?;
    Ok(Json(DataResponse { data: expense }))
}

/// DELETE /api/v1/expenses/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deleted = state
        .store()
        .delete_expense(id)
        .await
        .map_err(CoreError::from)?;
    if deleted {
        tracing::info!(id, "Expense deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}
