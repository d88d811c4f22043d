//! Tests for `AppError` → HTTP response mapping.
//!
//! These call `IntoResponse` directly on `AppError` values; no router is
//! involved.

use assert_matches::assert_matches;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use buildledger_api::error::AppError;
use buildledger_core::allocation::AllocationError;
use buildledger_core::error::CoreError;
use buildledger_core::store::StoreError;
use http_body_util::BodyExt;
use rust_decimal_macros::dec;

/// Helper: convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn not_found_error_returns_404() {
    let err = AppError::Core(CoreError::NotFound {
        entity: "Project",
        id: 42,
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Project with id 42 not found");
}

#[tokio::test]
async fn validation_error_returns_400() {
    let err = AppError::Core(CoreError::Validation("name: length".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "name: length");
}

#[tokio::test]
async fn allocation_errors_map_to_their_codes() {
    let cases = [
        (
            AllocationError::UnknownProject { project_id: 7 },
            StatusCode::BAD_REQUEST,
            "UNKNOWN_PROJECT",
        ),
        (
            AllocationError::DuplicateProjectInSplit { project_id: 7 },
            StatusCode::BAD_REQUEST,
            "DUPLICATE_PROJECT_IN_SPLIT",
        ),
        (
            AllocationError::OverAllocated {
                total_percentage: dec!(120),
            },
            StatusCode::BAD_REQUEST,
            "OVER_ALLOCATED",
        ),
        (
            AllocationError::InvalidPercentage {
                project_id: 7,
                percentage: dec!(-5),
            },
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
        ),
        (
            AllocationError::InvalidAmount { amount: dec!(0) },
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
        ),
        (
            AllocationError::MalformedSplitRecord {
                expense_id: 3,
                total_percentage: dec!(90),
            },
            StatusCode::UNPROCESSABLE_ENTITY,
            "MALFORMED_SPLIT_RECORD",
        ),
        (
            AllocationError::AmountOverflow,
            StatusCode::UNPROCESSABLE_ENTITY,
            "AMOUNT_OVERFLOW",
        ),
    ];

    for (err, expected_status, expected_code) in cases {
        let message = err.to_string();
        let (status, json) = error_to_response(AppError::from(err)).await;
        assert_eq!(status, expected_status, "{expected_code}");
        assert_eq!(json["code"], expected_code);
        assert_eq!(json["error"], message);
    }
}

#[tokio::test]
async fn store_error_is_sanitized() {
    let err = AppError::Core(CoreError::Store(StoreError::Backend(
        "connection refused at 10.0.0.5:5432".into(),
    )));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}

#[tokio::test]
async fn bad_request_error_returns_400() {
    let err = AppError::BadRequest("invalid field value".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["error"], "invalid field value");
}

#[test]
fn allocation_error_converts_through_core_error() {
    let err = AppError::from(AllocationError::UnknownProject { project_id: 1 });
    assert_matches!(
        err,
        AppError::Core(CoreError::Allocation(AllocationError::UnknownProject {
            project_id: 1
        }))
    );
}
