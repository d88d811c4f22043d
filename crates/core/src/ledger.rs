//! Write and read paths over a [`FinanceStore`].
//!
//! Writes that touch an expense allocation go through the split normalizer
//! before anything is persisted; reads that need totals load a snapshot from
//! the store and hand it to the aggregator.

use std::collections::HashSet;

use serde::Serialize;
use validator::Validate;

use crate::aggregation::{
    self, amount_attributable, dangling_split_projects, is_related, DashboardData,
    PortfolioScope, ProjectSummary,
};
use crate::allocation::{
    check_split_record, normalize_splits, renormalize, secondary_shares, AllocationError,
};
use crate::error::CoreError;
use crate::models::expense::{CreateExpense, Expense, NewExpense, UpdateExpense};
use crate::models::payment::{CreatePayment, Payment, UpdatePayment};
use crate::models::project::{CreateProject, Project, UpdateProject};
use crate::store::FinanceStore;
use crate::types::{DbId, Money};

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Outcome of deleting a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectRemoval {
    pub project_id: DbId,
    /// Expenses deleted because the project was their primary project.
    pub deleted_expenses: u64,
    pub deleted_payments: u64,
    /// Surviving expenses whose splits still reference the deleted project.
    pub dangling_expense_ids: Vec<DbId>,
}

/// An expense together with the share attributed to one project.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributedExpense {
    #[serde(flatten)]
    pub expense: Expense,
    pub attributed_amount: Money,
    /// The project's split percentage; `None` for unsplit expenses.
    pub attributed_percentage: Option<Money>,
}

/// A stored expense whose allocation needs attention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SplitIssue {
    /// Split percentages do not reconcile to 100.
    Malformed {
        expense_id: DbId,
        total_percentage: Money,
    },
    /// Split entries reference projects that no longer exist.
    DanglingProjects {
        expense_id: DbId,
        project_ids: Vec<DbId>,
    },
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

/// Ids of every project currently in the store.
pub async fn known_project_ids(store: &dyn FinanceStore) -> Result<HashSet<DbId>, CoreError> {
    Ok(store
        .list_projects()
        .await?
        .into_iter()
        .map(|p| p.id)
        .collect())
}

async fn require_project(store: &dyn FinanceStore, id: DbId) -> Result<Project, CoreError> {
    store
        .find_project(id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Project",
            id,
        })
}

pub async fn create_project(
    store: &dyn FinanceStore,
    input: &CreateProject,
) -> Result<Project, CoreError> {
    input.validate()?;
    let project = store.create_project(input).await?;
    tracing::info!(id = project.id, name = %project.name, "Project created");
    Ok(project)
}

pub async fn update_project(
    store: &dyn FinanceStore,
    id: DbId,
    input: &UpdateProject,
) -> Result<Project, CoreError> {
    input.validate()?;
    let current = require_project(store, id).await?;
    let start = input.start_date.unwrap_or(current.start_date);
    if let Some(end) = input.end_date.unwrap_or(current.end_date) {
        if end < start {
            return Err(CoreError::Validation(format!(
                "end_date {end} is before start_date {start}"
            )));
        }
    }
    store
        .update_project(id, input)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Project",
            id,
        })
}

/// Delete a project and everything it owns.
///
/// Expenses whose primary project is `id` and the project's payments are
/// deleted with it. Expenses of other primary projects that carry a split for
/// `id` are kept untouched and reported in
/// [`ProjectRemoval::dangling_expense_ids`].
pub async fn remove_project(
    store: &dyn FinanceStore,
    id: DbId,
) -> Result<ProjectRemoval, CoreError> {
    require_project(store, id).await?;

    let deleted_expenses = store.delete_expenses_by_project(id).await?;
    let deleted_payments = store.delete_payments_by_project(id).await?;
    store.delete_project(id).await?;

    let dangling_expense_ids: Vec<DbId> = store
        .list_expenses()
        .await?
        .iter()
        .filter(|e| e.splits.iter().any(|s| s.project_id == id))
        .map(|e| e.id)
        .collect();

    if !dangling_expense_ids.is_empty() {
        tracing::warn!(
            project_id = id,
            expenses = ?dangling_expense_ids,
            "Expenses still split into deleted project"
        );
    }
    tracing::info!(
        project_id = id,
        deleted_expenses,
        deleted_payments,
        "Project deleted"
    );

    Ok(ProjectRemoval {
        project_id: id,
        deleted_expenses,
        deleted_payments,
        dangling_expense_ids,
    })
}

// ---------------------------------------------------------------------------
// Expenses
// ---------------------------------------------------------------------------

/// Validate a draft expense, normalize its splits, and persist it.
///
/// Nothing is written when validation fails.
pub async fn record_expense(
    store: &dyn FinanceStore,
    draft: &CreateExpense,
) -> Result<Expense, CoreError> {
    draft.validate()?;
    let known = known_project_ids(store).await?;
    let splits = normalize_splits(draft.amount, draft.project_id, &draft.splits, &known)?;

    let expense = store
        .create_expense(&NewExpense {
            project_id: draft.project_id,
            splits,
            category: draft.category,
            description: draft.description.clone(),
            amount: draft.amount,
            date: draft.date,
            vendor: draft.vendor.clone(),
            receipt_url: draft.receipt_url.clone(),
            approved: draft.approved,
            status: draft.status,
        })
        .await?;

    tracing::info!(
        id = expense.id,
        project_id = expense.project_id,
        split_entries = expense.splits.len(),
        "Expense recorded"
    );
    Ok(expense)
}

/// Apply a partial update to an expense.
///
/// When the amount, primary project, or splits change, the split list is
/// rebuilt: from `changes.splits` when given, otherwise from the stored
/// secondary splits against the new total and primary project.
pub async fn revise_expense(
    store: &dyn FinanceStore,
    id: DbId,
    changes: &UpdateExpense,
) -> Result<Expense, CoreError> {
    changes.validate()?;
    let current = store.find_expense(id).await?.ok_or(CoreError::NotFound {
        entity: "Expense",
        id,
    })?;

    let project_id = changes.project_id.unwrap_or(current.project_id);
    let amount = changes.amount.unwrap_or(current.amount);

    let splits = if changes.touches_allocation() {
        let known = known_project_ids(store).await?;
        match &changes.splits {
            Some(shares) => normalize_splits(amount, project_id, shares, &known)?,
            None if project_id == current.project_id => {
                renormalize(amount, project_id, &current.splits, &known)?
            }
            None => normalize_splits(amount, project_id, &secondary_shares(&current), &known)?,
        }
    } else {
        current.splits.clone()
    };

    let revised = NewExpense {
        project_id,
        splits,
        category: changes.category.unwrap_or(current.category),
        description: changes
            .description
            .clone()
            .unwrap_or_else(|| current.description.clone()),
        amount,
        date: changes.date.unwrap_or(current.date),
        vendor: changes.vendor.clone().unwrap_or_else(|| current.vendor.clone()),
        receipt_url: changes
            .receipt_url
            .clone()
            .unwrap_or_else(|| current.receipt_url.clone()),
        approved: changes.approved.unwrap_or(current.approved),
        status: changes.status.unwrap_or(current.status),
    };

    let expense = store
        .update_expense(id, &revised)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Expense",
            id,
        })?;
    tracing::info!(id, project_id, "Expense revised");
    Ok(expense)
}

/// Expenses with a direct or split relationship to a project, each with the
/// amount attributed to it.
pub async fn project_expenses(
    store: &dyn FinanceStore,
    project_id: DbId,
) -> Result<Vec<AttributedExpense>, CoreError> {
    require_project(store, project_id).await?;
    Ok(store
        .list_expenses()
        .await?
        .into_iter()
        .filter(|e| is_related(e, project_id))
        .map(|expense| AttributedExpense {
            attributed_amount: amount_attributable(&expense, project_id),
            attributed_percentage: expense
                .splits
                .iter()
                .find(|s| s.project_id == project_id)
                .map(|s| s.percentage),
            expense,
        })
        .collect())
}

/// Report stored expenses with malformed or dangling split entries.
pub async fn split_integrity(store: &dyn FinanceStore) -> Result<Vec<SplitIssue>, CoreError> {
    let known = known_project_ids(store).await?;
    let mut issues = Vec::new();

    for expense in store.list_expenses().await? {
        if let Err(AllocationError::MalformedSplitRecord {
            expense_id,
            total_percentage,
        }) = check_split_record(&expense)
        {
            issues.push(SplitIssue::Malformed {
                expense_id,
                total_percentage,
            });
        }
        let project_ids = dangling_split_projects(&expense, &known);
        if !project_ids.is_empty() {
            issues.push(SplitIssue::DanglingProjects {
                expense_id: expense.id,
                project_ids,
            });
        }
    }

    if !issues.is_empty() {
        tracing::warn!(count = issues.len(), "Expenses with split issues found");
    }
    Ok(issues)
}

// ---------------------------------------------------------------------------
// Payments
// ---------------------------------------------------------------------------

pub async fn record_payment(
    store: &dyn FinanceStore,
    input: &CreatePayment,
) -> Result<Payment, CoreError> {
    input.validate()?;
    require_project(store, input.project_id).await?;
    let payment = store.create_payment(input).await?;
    tracing::info!(id = payment.id, project_id = payment.project_id, "Payment recorded");
    Ok(payment)
}

pub async fn update_payment(
    store: &dyn FinanceStore,
    id: DbId,
    input: &UpdatePayment,
) -> Result<Payment, CoreError> {
    input.validate()?;
    if let Some(project_id) = input.project_id {
        require_project(store, project_id).await?;
    }
    store
        .update_payment(id, input)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Payment",
            id,
        })
}

// ---------------------------------------------------------------------------
// Summaries
// ---------------------------------------------------------------------------

fn flag_malformed(err: AllocationError) -> CoreError {
    if let AllocationError::MalformedSplitRecord {
        expense_id,
        total_percentage,
    } = &err
    {
        tracing::warn!(
            expense_id,
            %total_percentage,
            "Refusing to aggregate malformed split record"
        );
    }
    CoreError::Allocation(err)
}

pub async fn project_summary(
    store: &dyn FinanceStore,
    project_id: DbId,
) -> Result<ProjectSummary, CoreError> {
    let project = require_project(store, project_id).await?;
    let expenses = store.list_expenses().await?;
    let payments = store.list_payments_by_project(project_id).await?;
    aggregation::project_summary(&project, &expenses, &payments).map_err(flag_malformed)
}

/// One summary per project, in store listing order.
pub async fn project_overview(store: &dyn FinanceStore) -> Result<Vec<ProjectSummary>, CoreError> {
    let projects = store.list_projects().await?;
    let expenses = store.list_expenses().await?;
    let payments = store.list_payments().await?;
    projects
        .iter()
        .map(|p| aggregation::project_summary(p, &expenses, &payments).map_err(flag_malformed))
        .collect()
}

pub async fn dashboard(
    store: &dyn FinanceStore,
    scope: PortfolioScope,
) -> Result<DashboardData, CoreError> {
    let projects = store.list_projects().await?;
    if let PortfolioScope::Project(id) = scope {
        if !projects.iter().any(|p| p.id == id) {
            return Err(CoreError::NotFound {
                entity: "Project",
                id,
            });
        }
    }
    let expenses = store.list_expenses().await?;
    let payments = store.list_payments().await?;
    aggregation::portfolio_summary(&projects, &expenses, &payments, scope).map_err(flag_malformed)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::expense::{ExpenseCategory, ExpenseSplit, ExpenseStatus, SplitShare};
    use crate::models::project::ProjectStatus;
    use crate::store::memory::InMemoryStore;

    fn date(day: u32) -> chrono::NaiveDate {
        chrono::NaiveDate::from_ymd_opt(2024, 7, day).unwrap()
    }

    async fn seed_project(store: &InMemoryStore, name: &str, budget: Money) -> Project {
        create_project(
            store,
            &CreateProject {
                name: name.to_string(),
                description: String::new(),
                start_date: date(1),
                end_date: None,
                budget,
                status: ProjectStatus::Active,
                client_name: "Acme".into(),
                location: "Riverside".into(),
                file_url: None,
            },
        )
        .await
        .unwrap()
    }

    fn draft(project_id: DbId, amount: Money, splits: Vec<SplitShare>) -> CreateExpense {
        CreateExpense {
            project_id,
            splits,
            category: ExpenseCategory::Equipment,
            description: "Crane rental".into(),
            amount,
            date: date(3),
            vendor: Some("LiftCo".into()),
            receipt_url: None,
            approved: false,
            status: ExpenseStatus::Incurred,
        }
    }

    fn share(project_id: DbId, percentage: Money) -> SplitShare {
        SplitShare {
            project_id,
            percentage,
        }
    }

    #[tokio::test]
    async fn record_expense_stores_normalized_splits() {
        let store = InMemoryStore::new();
        let a = seed_project(&store, "A", dec!(100000)).await;
        let b = seed_project(&store, "B", dec!(50000)).await;

        let expense = record_expense(&store, &draft(a.id, dec!(1000), vec![share(b.id, dec!(30))]))
            .await
            .unwrap();

        assert_eq!(
            expense.splits,
            vec![
                ExpenseSplit {
                    project_id: b.id,
                    amount: dec!(300),
                    percentage: dec!(30)
                },
                ExpenseSplit {
                    project_id: a.id,
                    amount: dec!(700),
                    percentage: dec!(70)
                },
            ]
        );
        let stored = store.find_expense(expense.id).await.unwrap().unwrap();
        assert_eq!(stored, expense);
    }

    #[tokio::test]
    async fn rejected_expense_is_not_persisted() {
        let store = InMemoryStore::new();
        let a = seed_project(&store, "A", dec!(1000)).await;
        let b = seed_project(&store, "B", dec!(1000)).await;
        let c = seed_project(&store, "C", dec!(1000)).await;

        let result = record_expense(
            &store,
            &draft(
                a.id,
                dec!(1000),
                vec![share(b.id, dec!(60)), share(c.id, dec!(50))],
            ),
        )
        .await;

        assert_matches!(
            result,
            Err(CoreError::Allocation(AllocationError::OverAllocated { .. }))
        );
        assert!(store.list_expenses().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn record_expense_rejects_unknown_primary() {
        let store = InMemoryStore::new();
        let result = record_expense(&store, &draft(12, dec!(10), Vec::new())).await;
        assert_matches!(
            result,
            Err(CoreError::Allocation(AllocationError::UnknownProject { project_id: 12 }))
        );
    }

    #[tokio::test]
    async fn record_expense_runs_field_validation_first() {
        let store = InMemoryStore::new();
        let a = seed_project(&store, "A", dec!(1000)).await;
        let mut input = draft(a.id, dec!(10), Vec::new());
        input.description = String::new();
        assert_matches!(
            record_expense(&store, &input).await,
            Err(CoreError::Validation(_))
        );
    }

    #[tokio::test]
    async fn revising_the_amount_rederives_split_amounts() {
        let store = InMemoryStore::new();
        let a = seed_project(&store, "A", dec!(1000)).await;
        let b = seed_project(&store, "B", dec!(1000)).await;
        let expense = record_expense(&store, &draft(a.id, dec!(1000), vec![share(b.id, dec!(30))]))
            .await
            .unwrap();

        let revised = revise_expense(
            &store,
            expense.id,
            &UpdateExpense {
                amount: Some(dec!(2000)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(revised.amount, dec!(2000));
        assert_eq!(amount_attributable(&revised, b.id), dec!(600));
        assert_eq!(amount_attributable(&revised, a.id), dec!(1400));
        assert_eq!(revised.created_at, expense.created_at);
    }

    #[tokio::test]
    async fn revising_the_primary_moves_the_remainder() {
        let store = InMemoryStore::new();
        let a = seed_project(&store, "A", dec!(1000)).await;
        let b = seed_project(&store, "B", dec!(1000)).await;
        let c = seed_project(&store, "C", dec!(1000)).await;
        let expense = record_expense(&store, &draft(a.id, dec!(1000), vec![share(b.id, dec!(30))]))
            .await
            .unwrap();

        let revised = revise_expense(
            &store,
            expense.id,
            &UpdateExpense {
                project_id: Some(c.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(revised.project_id, c.id);
        assert_eq!(amount_attributable(&revised, a.id), dec!(0));
        assert_eq!(amount_attributable(&revised, b.id), dec!(300));
        assert_eq!(amount_attributable(&revised, c.id), dec!(700));
    }

    #[tokio::test]
    async fn clearing_splits_makes_expense_unsplit() {
        let store = InMemoryStore::new();
        let a = seed_project(&store, "A", dec!(1000)).await;
        let b = seed_project(&store, "B", dec!(1000)).await;
        let expense = record_expense(&store, &draft(a.id, dec!(1000), vec![share(b.id, dec!(30))]))
            .await
            .unwrap();

        let revised = revise_expense(
            &store,
            expense.id,
            &UpdateExpense {
                splits: Some(Vec::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert!(revised.splits.is_empty());
        assert_eq!(amount_attributable(&revised, a.id), dec!(1000));
    }

    #[tokio::test]
    async fn metadata_revision_keeps_splits_verbatim() {
        let store = InMemoryStore::new();
        let a = seed_project(&store, "A", dec!(1000)).await;
        let b = seed_project(&store, "B", dec!(1000)).await;
        let expense = record_expense(&store, &draft(a.id, dec!(1000), vec![share(b.id, dec!(30))]))
            .await
            .unwrap();

        let revised = revise_expense(
            &store,
            expense.id,
            &UpdateExpense {
                approved: Some(true),
                status: Some(ExpenseStatus::Upcoming),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert!(revised.approved);
        assert_eq!(revised.status, ExpenseStatus::Upcoming);
        assert_eq!(revised.splits, expense.splits);
    }

    #[tokio::test]
    async fn revision_can_clear_vendor_and_keep_receipt() {
        let store = InMemoryStore::new();
        let a = seed_project(&store, "A", dec!(1000)).await;
        let mut input = draft(a.id, dec!(250), Vec::new());
        input.receipt_url = Some("receipts/crane.pdf".into());
        let expense = record_expense(&store, &input).await.unwrap();

        let revised = revise_expense(
            &store,
            expense.id,
            &UpdateExpense {
                vendor: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(revised.vendor, None);
        assert_eq!(revised.receipt_url.as_deref(), Some("receipts/crane.pdf"));
    }

    #[tokio::test]
    async fn removing_a_project_cascades_and_flags_dangling_splits() {
        let store = InMemoryStore::new();
        let a = seed_project(&store, "A", dec!(1000)).await;
        let b = seed_project(&store, "B", dec!(1000)).await;

        record_expense(&store, &draft(a.id, dec!(100), Vec::new()))
            .await
            .unwrap();
        let owned_split = record_expense(&store, &draft(a.id, dec!(100), vec![share(b.id, dec!(50))]))
            .await
            .unwrap();
        let foreign = record_expense(&store, &draft(b.id, dec!(400), vec![share(a.id, dec!(25))]))
            .await
            .unwrap();
        record_payment(
            &store,
            &CreatePayment {
                project_id: a.id,
                amount: dec!(50),
                date: date(4),
                payer: "Acme".into(),
                method: "check".into(),
                note: None,
            },
        )
        .await
        .unwrap();

        let removal = remove_project(&store, a.id).await.unwrap();

        assert_eq!(removal.deleted_expenses, 2);
        assert_eq!(removal.deleted_payments, 1);
        assert_eq!(removal.dangling_expense_ids, vec![foreign.id]);
        assert!(store.find_expense(owned_split.id).await.unwrap().is_none());
        assert!(store.find_expense(foreign.id).await.unwrap().is_some());

        let issues = split_integrity(&store).await.unwrap();
        assert_eq!(
            issues,
            vec![SplitIssue::DanglingProjects {
                expense_id: foreign.id,
                project_ids: vec![a.id],
            }]
        );
    }

    #[tokio::test]
    async fn removing_a_missing_project_is_not_found() {
        let store = InMemoryStore::new();
        assert_matches!(
            remove_project(&store, 3).await,
            Err(CoreError::NotFound { entity: "Project", id: 3 })
        );
    }

    #[tokio::test]
    async fn project_expenses_include_split_relationships() {
        let store = InMemoryStore::new();
        let a = seed_project(&store, "A", dec!(1000)).await;
        let b = seed_project(&store, "B", dec!(1000)).await;
        record_expense(&store, &draft(a.id, dec!(100), Vec::new()))
            .await
            .unwrap();
        let split = record_expense(&store, &draft(a.id, dec!(5000), vec![share(b.id, dec!(20))]))
            .await
            .unwrap();

        let for_b = project_expenses(&store, b.id).await.unwrap();

        assert_eq!(for_b.len(), 1);
        assert_eq!(for_b[0].expense.id, split.id);
        assert_eq!(for_b[0].attributed_amount, dec!(1000));
        assert_eq!(for_b[0].attributed_percentage, Some(dec!(20)));
    }

    #[tokio::test]
    async fn dashboard_and_summaries_agree() {
        let store = InMemoryStore::new();
        let a = seed_project(&store, "A", dec!(100000)).await;
        let b = seed_project(&store, "B", dec!(50000)).await;
        record_expense(&store, &draft(a.id, dec!(40000), Vec::new()))
            .await
            .unwrap();
        record_expense(&store, &draft(b.id, dec!(10000), Vec::new()))
            .await
            .unwrap();
        record_expense(&store, &draft(a.id, dec!(5000), vec![share(b.id, dec!(20))]))
            .await
            .unwrap();

        let summary_a = project_summary(&store, a.id).await.unwrap();
        let summary_b = project_summary(&store, b.id).await.unwrap();
        assert_eq!(summary_a.total_expenses, dec!(44000));
        assert_eq!(summary_b.total_expenses, dec!(11000));

        let all = dashboard(&store, PortfolioScope::All).await.unwrap();
        assert_eq!(all.total_expenses, dec!(55000));
        assert_eq!(
            all.total_expenses,
            summary_a.total_expenses + summary_b.total_expenses
        );

        let overview = project_overview(&store).await.unwrap();
        assert_eq!(overview.len(), 2);
        let total: Money = overview.iter().map(|s| s.total_expenses).sum();
        assert_eq!(total, dec!(55000));
    }

    #[tokio::test]
    async fn dashboard_for_missing_project_is_not_found() {
        let store = InMemoryStore::new();
        assert_matches!(
            dashboard(&store, PortfolioScope::Project(8)).await,
            Err(CoreError::NotFound { id: 8, .. })
        );
    }

    #[tokio::test]
    async fn payment_for_unknown_project_is_rejected() {
        let store = InMemoryStore::new();
        let result = record_payment(
            &store,
            &CreatePayment {
                project_id: 4,
                amount: dec!(10),
                date: date(2),
                payer: "Acme".into(),
                method: "cash".into(),
                note: None,
            },
        )
        .await;
        assert_matches!(result, Err(CoreError::NotFound { entity: "Project", id: 4 }));
    }
}
