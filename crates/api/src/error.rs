use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use buildledger_core::allocation::AllocationError;
use buildledger_core::error::CoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `buildledger_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A request body that could not be decoded.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<AllocationError> for AppError {
    fn from(err: AllocationError) -> Self {
        AppError::Core(CoreError::Allocation(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => classify_core_error(core),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

fn classify_core_error(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Allocation(alloc) => classify_allocation_error(alloc),
        CoreError::Store(store) => {
            tracing::error!(error = %store, "Store error");
            internal()
        }
    }
}

/// Allocation failures caused by the submitted expense are 400s; stored
/// records that no longer reconcile or overflow a total are reported as 422.
fn classify_allocation_error(err: &AllocationError) -> (StatusCode, &'static str, String) {
    let code = match err {
        AllocationError::UnknownProject { .. } => "UNKNOWN_PROJECT",
        AllocationError::DuplicateProjectInSplit { .. } => "DUPLICATE_PROJECT_IN_SPLIT",
        AllocationError::OverAllocated { .. } => "OVER_ALLOCATED",
        AllocationError::InvalidPercentage { .. } | AllocationError::InvalidAmount { .. } => {
            "VALIDATION_ERROR"
        }
        AllocationError::MalformedSplitRecord { .. } => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                "MALFORMED_SPLIT_RECORD",
                err.to_string(),
            )
        }
        AllocationError::AmountOverflow => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                "AMOUNT_OVERFLOW",
                err.to_string(),
            )
        }
    };
    (StatusCode::BAD_REQUEST, code, err.to_string())
}
