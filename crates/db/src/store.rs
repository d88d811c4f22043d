//! [`FinanceStore`] implementation over PostgreSQL.

use async_trait::async_trait;
use buildledger_core::models::expense::{Expense, NewExpense};
use buildledger_core::models::payment::{CreatePayment, Payment, UpdatePayment};
use buildledger_core::models::project::{CreateProject, Project, UpdateProject};
use buildledger_core::store::{FinanceStore, StoreError, StoreResult};
use buildledger_core::types::DbId;

use crate::repositories::{ExpenseRepo, PaymentRepo, ProjectRepo};
use crate::DbPool;

/// Store backed by the repository layer.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

/// Log a sqlx error and convert it for the storage boundary.
fn backend(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Decode(source) => {
            tracing::error!(error = %source, "Failed to decode stored record");
            StoreError::Corrupt(source.to_string())
        }
        other => {
            tracing::error!(error = %other, "Database error");
            StoreError::Backend(other.to_string())
        }
    }
}

#[async_trait]
impl FinanceStore for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        crate::health_check(&self.pool).await.map_err(backend)
    }

    async fn list_projects(&self) -> StoreResult<Vec<Project>> {
        ProjectRepo::list(&self.pool).await.map_err(backend)
    }

    async fn find_project(&self, id: DbId) -> StoreResult<Option<Project>> {
        ProjectRepo::find_by_id(&self.pool, id).await.map_err(backend)
    }

    async fn create_project(&self, input: &CreateProject) -> StoreResult<Project> {
        ProjectRepo::create(&self.pool, input).await.map_err(backend)
    }

    async fn update_project(
        &self,
        id: DbId,
        input: &UpdateProject,
    ) -> StoreResult<Option<Project>> {
        ProjectRepo::update(&self.pool, id, input)
            .await
            .map_err(backend)
    }

    async fn delete_project(&self, id: DbId) -> StoreResult<bool> {
        ProjectRepo::delete(&self.pool, id).await.map_err(backend)
    }

    async fn list_expenses(&self) -> StoreResult<Vec<Expense>> {
        ExpenseRepo::list(&self.pool).await.map_err(backend)
    }

    async fn list_expenses_by_project(&self, project_id: DbId) -> StoreResult<Vec<Expense>> {
        ExpenseRepo::list_by_project(&self.pool, project_id)
            .await
            .map_err(backend)
    }

    async fn find_expense(&self, id: DbId) -> StoreResult<Option<Expense>> {
        ExpenseRepo::find_by_id(&self.pool, id).await.map_err(backend)
    }

    async fn create_expense(&self, input: &NewExpense) -> StoreResult<Expense> {
        ExpenseRepo::create(&self.pool, input).await.map_err(backend)
    }

    async fn update_expense(&self, id: DbId, input: &NewExpense) -> StoreResult<Option<Expense>> {
        ExpenseRepo::update(&self.pool, id, input)
            .await
            .map_err(backend)
    }

    async fn delete_expense(&self, id: DbId) -> StoreResult<bool> {
        ExpenseRepo::delete(&self.pool, id).await.map_err(backend)
    }

    async fn delete_expenses_by_project(&self, project_id: DbId) -> StoreResult<u64> {
        ExpenseRepo::delete_by_project(&self.pool, project_id)
            .await
            .map_err(backend)
    }

    async fn list_payments(&self) -> StoreResult<Vec<Payment>> {
        PaymentRepo::list(&self.pool).await.map_err(backend)
    }

    async fn list_payments_by_project(&self, project_id: DbId) -> StoreResult<Vec<Payment>> {
        PaymentRepo::list_by_project(&self.pool, project_id)
            .await
            .map_err(backend)
    }

    async fn find_payment(&self, id: DbId) -> StoreResult<Option<Payment>> {
        PaymentRepo::find_by_id(&self.pool, id).await.map_err(backend)
    }

    async fn create_payment(&self, input: &CreatePayment) -> StoreResult<Payment> {
        PaymentRepo::create(&self.pool, input).await.map_err(backend)
    }

    async fn update_payment(
        &self,
        id: DbId,
        input: &UpdatePayment,
    ) -> StoreResult<Option<Payment>> {
        PaymentRepo::update(&self.pool, id, input)
            .await
            .map_err(backend)
    }

    async fn delete_payment(&self, id: DbId) -> StoreResult<bool> {
        PaymentRepo::delete(&self.pool, id).await.map_err(backend)
    }

    async fn delete_payments_by_project(&self, project_id: DbId) -> StoreResult<u64> {
        PaymentRepo::delete_by_project(&self.pool, project_id)
            .await
            .map_err(backend)
    }
}
