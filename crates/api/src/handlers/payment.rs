//! Handlers for the `/payments` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use buildledger_core::error::CoreError;
use buildledger_core::ledger;
use buildledger_core::models::payment::{CreatePayment, UpdatePayment};
use buildledger_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Payment",
        id,
    })
}

/// POST /api/v1/payments
pub async fn create(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreatePayment>,
) -> AppResult<impl IntoResponse> {
    let payment = ledger::record_payment(state.store(), &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: payment })))
}

/// GET /api/v1/payments
pub async fn list(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let payments = state.store().list_payments().await.map_err(CoreError::from)?;
    Ok(Json(DataResponse { data: payments }))
}

/// GET /api/v1/payments/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let payment = state
        .store()
        .find_payment(id)
        .await
        .map_err(CoreError::from)?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: payment }))
}

/// PUT /api/v1/payments/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<UpdatePayment>,
) -> AppResult<impl IntoResponse> {
    let payment = ledger::update_payment(state.store(), id, &input).await?;
    Ok(Json(DataResponse { data: payment }))
}

/// DELETE /api/v1/payments/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deleted = state
        .store()
        .delete_payment(id)
        .await
        .map_err(CoreError::from)?;
    if deleted {
        tracing::info!(id, "Payment deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}
