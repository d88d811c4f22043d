pub mod dashboard;
pub mod expense;
pub mod health;
pub mod payment;
pub mod project;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /projects                          list, create
/// /projects/overview                 per-project summaries
/// /projects/{id}                     get, update, delete (cascade)
/// /projects/{id}/summary             split-aware project summary
/// /projects/{id}/expenses            related expenses, record expense
/// /projects/{id}/payments            list, record payment
///
/// /expenses                          list, record
/// /expenses/integrity                malformed and dangling split report
/// /expenses/{id}                     get, revise, delete
///
/// /payments                          list, create
/// /payments/{id}                     get, update, delete
///
/// /dashboard                         portfolio totals (?project_id=)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/projects", project::router())
        .nest("/expenses", expense::router())
        .nest("/payments", payment::router())
        .nest("/dashboard", dashboard::router())
}
