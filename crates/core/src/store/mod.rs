//! Record storage abstraction.
//!
//! The core never holds records itself; callers hand it a [`FinanceStore`].
//! `buildledger-db` provides the PostgreSQL implementation and
//! [`memory::InMemoryStore`] backs tests and local demos.

pub mod memory;

use async_trait::async_trait;

use crate::models::expense::{Expense, NewExpense};
use crate::models::payment::{CreatePayment, Payment, UpdatePayment};
use crate::models::project::{CreateProject, Project, UpdateProject};
use crate::types::DbId;

/// Failure inside a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Stored record is corrupt: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Basic record CRUD per entity type.
///
/// Inserts stamp `created_at` and `updated_at`; updates refresh `updated_at`
/// only. Lookups and updates of missing ids return `None` / `false` rather
/// than an error.
#[async_trait]
pub trait FinanceStore: Send + Sync {
    /// Confirm the backend is reachable.
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    // -- projects --

    /// List all projects, most recently created first.
    async fn list_projects(&self) -> StoreResult<Vec<Project>>;

    async fn find_project(&self, id: DbId) -> StoreResult<Option<Project>>;

    async fn create_project(&self, input: &CreateProject) -> StoreResult<Project>;

    /// Apply the non-`None` fields of `input`.
    async fn update_project(&self, id: DbId, input: &UpdateProject)
        -> StoreResult<Option<Project>>;

    /// Delete the project row only. Returns `true` if a row was removed.
    async fn delete_project(&self, id: DbId) -> StoreResult<bool>;

    // -- expenses --

    /// List all expenses, most recent date first.
    async fn list_expenses(&self) -> StoreResult<Vec<Expense>>;

    /// Expenses whose primary project is `project_id`.
    async fn list_expenses_by_project(&self, project_id: DbId) -> StoreResult<Vec<Expense>>;

    async fn find_expense(&self, id: DbId) -> StoreResult<Option<Expense>>;

    async fn create_expense(&self, input: &NewExpense) -> StoreResult<Expense>;

    /// Replace every mutable field of the expense with `input`.
    async fn update_expense(&self, id: DbId, input: &NewExpense) -> StoreResult<Option<Expense>>;

    async fn delete_expense(&self, id: DbId) -> StoreResult<bool>;

    /// Delete all expenses whose primary project is `project_id`. Returns the
    /// number removed.
    async fn delete_expenses_by_project(&self, project_id: DbId) -> StoreResult<u64>;

    // -- payments --

    /// List all payments, most recent date first.
    async fn list_payments(&self) -> StoreResult<Vec<Payment>>;

    async fn list_payments_by_project(&self, project_id: DbId) -> StoreResult<Vec<Payment>>;

    async fn find_payment(&self, id: DbId) -> StoreResult<Option<Payment>>;

    async fn create_payment(&self, input: &CreatePayment) -> StoreResult<Payment>;

    async fn update_payment(&self, id: DbId, input: &UpdatePayment)
        -> StoreResult<Option<Payment>>;

    async fn delete_payment(&self, id: DbId) -> StoreResult<bool>;

    /// Delete all payments of `project_id`. Returns the number removed.
    async fn delete_payments_by_project(&self, project_id: DbId) -> StoreResult<u64>;
}
