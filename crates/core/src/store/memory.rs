//! In-process [`FinanceStore`] backed by ordered maps.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{FinanceStore, StoreResult};
use crate::models::expense::{Expense, NewExpense};
use crate::models::payment::{CreatePayment, Payment, UpdatePayment};
use crate::models::project::{CreateProject, Project, UpdateProject};
use crate::types::DbId;

#[derive(Debug, Default)]
struct Tables {
    last_project_id: DbId,
    last_expense_id: DbId,
    last_payment_id: DbId,
    projects: BTreeMap<DbId, Project>,
    expenses: BTreeMap<DbId, Expense>,
    payments: BTreeMap<DbId, Payment>,
}

/// Store that keeps every record in memory. Ids are sequential per entity
/// type, starting at 1.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_expenses_first(mut expenses: Vec<Expense>) -> Vec<Expense> {
    expenses.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
    expenses
}

fn newest_payments_first(mut payments: Vec<Payment>) -> Vec<Payment> {
    payments.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
    payments
}

#[async_trait]
impl FinanceStore for InMemoryStore {
    async fn list_projects(&self) -> StoreResult<Vec<Project>> {
        let tables = self.tables.read().await;
        Ok(tables.projects.values().rev().cloned().collect())
    }

    async fn find_project(&self, id: DbId) -> StoreResult<Option<Project>> {
        Ok(self.tables.read().await.projects.get(&id).cloned())
    }

    async fn create_project(&self, input: &CreateProject) -> StoreResult<Project> {
        let mut tables = self.tables.write().await;
        tables.last_project_id += 1;
        let now = Utc::now();
        let project = Project {
            id: tables.last_project_id,
            name: input.name.clone(),
            description: input.description.clone(),
            start_date: input.start_date,
            end_date: input.end_date,
            budget: input.budget,
            status: input.status,
            client_name: input.client_name.clone(),
            location: input.location.clone(),
            file_url: input.file_url.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.projects.insert(project.id, project.clone());
        Ok(project)
    }

    async fn update_project(
        &self,
        id: DbId,
        input: &UpdateProject,
    ) -> StoreResult<Option<Project>> {
        let mut tables = self.tables.write().await;
        let Some(project) = tables.projects.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = &input.name {
            project.name = name.clone();
        }
        if let Some(description) = &input.description {
            project.description = description.clone();
        }
        if let Some(start_date) = input.start_date {
            project.start_date = start_date;
        }
        if let Some(end_date) = input.end_date {
            project.end_date = end_date;
        }
        if let Some(budget) = input.budget {
            project.budget = budget;
        }
        if let Some(status) = input.status {
            project.status = status;
        }
        if let Some(client_name) = &input.client_name {
            project.client_name = client_name.clone();
        }
        if let Some(location) = &input.location {
            project.location = location.clone();
        }
        if let Some(file_url) = &input.file_url {
            project.file_url = file_url.clone();
        }
        project.updated_at = Utc::now();
        Ok(Some(project.clone()))
    }

    async fn delete_project(&self, id: DbId) -> StoreResult<bool> {
        Ok(self.tables.write().await.projects.remove(&id).is_some())
    }

    async fn list_expenses(&self) -> StoreResult<Vec<Expense>> {
        let tables = self.tables.read().await;
        Ok(newest_expenses_first(
            tables.expenses.values().cloned().collect(),
        ))
    }

    async fn list_expenses_by_project(&self, project_id: DbId) -> StoreResult<Vec<Expense>> {
        let tables = self.tables.read().await;
        Ok(newest_expenses_first(
            tables
                .expenses
                .values()
                .filter(|e| e.project_id == project_id)
                .cloned()
                .collect(),
        ))
    }

    async fn find_expense(&self, id: DbId) -> StoreResult<Option<Expense>> {
        Ok(self.tables.read().await.expenses.get(&id).cloned())
    }

    async fn create_expense(&self, input: &NewExpense) -> StoreResult<Expense> {
        let mut tables = self.tables.write().await;
        tables.last_expense_id += 1;
        let now = Utc::now();
        let expense = Expense {
            id: tables.last_expense_id,
            project_id: input.project_id,
            splits: input.splits.clone(),
            category: input.category,
            description: input.description.clone(),
            amount: input.amount,
            date: input.date,
            vendor: input.vendor.clone(),
            receipt_url: input.receipt_url.clone(),
            approved: input.approved,
            status: input.status,
            created_at: now,
            updated_at: now,
        };
        tables.expenses.insert(expense.id, expense.clone());
        Ok(expense)
    }

    async fn update_expense(&self, id: DbId, input: &NewExpense) -> StoreResult<Option<Expense>> {
        let mut tables = self.tables.write().await;
        let Some(expense) = tables.expenses.get_mut(&id) else {
            return Ok(None);
        };
        expense.project_id = input.project_id;
        expense.splits = input.splits.clone();
        expense.category = input.category;
        expense.description = input.description.clone();
        expense.amount = input.amount;
        expense.date = input.date;
        expense.vendor = input.vendor.clone();
        expense.receipt_url = input.receipt_url.clone();
        expense.approved = input.approved;
        expense.status = input.status;
        expense.updated_at = Utc::now();
        Ok(Some(expense.clone()))
    }

    async fn delete_expense(&self, id: DbId) -> StoreResult<bool> {
        Ok(self.tables.write().await.expenses.remove(&id).is_some())
    }

    async fn delete_expenses_by_project(&self, project_id: DbId) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        let before = tables.expenses.len();
        tables.expenses.retain(|_, e| e.project_id != project_id);
        Ok((before - tables.expenses.len()) as u64)
    }

    async fn list_payments(&self) -> StoreResult<Vec<Payment>> {
        let tables = self.tables.read().await;
        Ok(newest_payments_first(
            tables.payments.values().cloned().collect(),
        ))
    }

    async fn list_payments_by_project(&self, project_id: DbId) -> StoreResult<Vec<Payment>> {
        let tables = self.tables.read().await;
        Ok(newest_payments_first(
            tables
                .payments
                .values()
                .filter(|p| p.project_id == project_id)
                .cloned()
                .collect(),
        ))
    }

    async fn find_payment(&self, id: DbId) -> StoreResult<Option<Payment>> {
        Ok(self.tables.read().await.payments.get(&id).cloned())
    }

    async fn create_payment(&self, input: &CreatePayment) -> StoreResult<Payment> {
        let mut tables = self.tables.write().await;
        tables.last_payment_id += 1;
        let now = Utc::now();
        let payment = Payment {
            id: tables.last_payment_id,
            project_id: input.project_id,
            amount: input.amount,
            date: input.date,
            payer: input.payer.clone(),
            method: input.method.clone(),
            note: input.note.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.payments.insert(payment.id, payment.clone());
        Ok(payment)
    }

    async fn update_payment(
        &self,
        id: DbId,
        input: &UpdatePayment,
    ) -> StoreResult<Option<Payment>> {
        let mut tables = self.tables.write().await;
        let Some(payment) = tables.payments.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(project_id) = input.project_id {
            payment.project_id = project_id;
        }
        if let Some(amount) = input.amount {
            payment.amount = amount;
        }
        if let Some(date) = input.date {
            payment.date = date;
        }
        if let Some(payer) = &input.payer {
            payment.payer = payer.clone();
        }
        if let Some(method) = &input.method {
            payment.method = method.clone();
        }
        if let Some(note) = &input.note {
            payment.note = note.clone();
        }
        payment.updated_at = Utc::now();
        Ok(Some(payment.clone()))
    }

    async fn delete_payment(&self, id: DbId) -> StoreResult<bool> {
        Ok(self.tables.write().await.payments.remove(&id).is_some())
    }

    async fn delete_payments_by_project(&self, project_id: DbId) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        let before = tables.payments.len();
        tables.payments.retain(|_, p| p.project_id != project_id);
        Ok((before - tables.payments.len()) as u64)
    }
}
