//! Route definitions for the `/projects` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::project;
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                  -> list
/// POST   /                  -> create
/// GET    /overview          -> overview
/// GET    /{id}              -> get_by_id
/// PUT    /{id}              -> update
/// DELETE /{id}              -> delete
/// GET    /{id}/summary      -> summary
/// GET    /{id}/expenses     -> list_expenses
/// POST   /{id}/expenses     -> create_expense
/// GET    /{id}/payments     -> list_payments
/// POST   /{id}/payments     -> create_payment
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(project::list).post(project::create))
        .route("/overview", get(project::overview))
        .route(
            "/{id}",
            get(project::get_by_id)
                .put(project::update)
                .delete(project::delete),
        )
        .route("/{id}/summary", get(project::summary))
        .route(
            "/{id}/expenses",
            get(project::list_expenses).post(project::create_expense),
        )
        .route(
            "/{id}/payments",
            get(project::list_payments).post(project::create_payment),
        )
}
