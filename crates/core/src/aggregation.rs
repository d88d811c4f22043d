//! Split-aware aggregation of expenses and payments.
//!
//! [`amount_attributable`] is the only place that decides how much of an
//! expense counts toward a project. Every total computed here (per-project,
//! per-status, portfolio) goes through it.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::allocation::{check_split_record, checked_sum, AllocationError, CURRENCY_SCALE};
use crate::models::expense::{Expense, ExpenseStatus};
use crate::models::payment::Payment;
use crate::models::project::{Project, ProjectStatus};
use crate::types::{DbId, Money};

// ---------------------------------------------------------------------------
// Attribution
// ---------------------------------------------------------------------------

/// Amount of `expense` that counts toward `project_id`.
///
/// Unsplit expenses count in full toward their primary project only. Split
/// expenses count the stored amount of the matching split entry. A project
/// with no stake gets zero, which is not an error.
pub fn amount_attributable(expense: &Expense, project_id: DbId) -> Money {
    if expense.splits.is_empty() {
        return if expense.project_id == project_id {
            expense.amount
        } else {
            Decimal::ZERO
        };
    }
    expense
        .splits
        .iter()
        .find(|s| s.project_id == project_id)
        .map_or(Decimal::ZERO, |s| s.amount)
}

/// Whether `project_id` is the primary project of `expense` or holds a split
/// entry in it.
pub fn is_related(expense: &Expense, project_id: DbId) -> bool {
    expense.project_id == project_id || expense.splits.iter().any(|s| s.project_id == project_id)
}

/// Split project ids of `expense` that are not in `known_projects`.
pub fn dangling_split_projects(expense: &Expense, known_projects: &HashSet<DbId>) -> Vec<DbId> {
    expense
        .splits
        .iter()
        .map(|s| s.project_id)
        .filter(|id| !known_projects.contains(id))
        .collect()
}

// ---------------------------------------------------------------------------
// Per-project totals
// ---------------------------------------------------------------------------

/// Attributed expense amounts partitioned by [`ExpenseStatus`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTotals {
    pub upcoming: Money,
    pub incurred: Money,
}

impl StatusTotals {
    fn add(&mut self, status: ExpenseStatus, amount: Money) -> Result<(), AllocationError> {
        let slot = match status {
            ExpenseStatus::Upcoming => &mut self.upcoming,
            ExpenseStatus::Incurred => &mut self.incurred,
        };
        *slot = add_money(*slot, amount)?;
        Ok(())
    }
}

fn add_money(a: Money, b: Money) -> Result<Money, AllocationError> {
    a.checked_add(b).ok_or(AllocationError::AmountOverflow)
}

fn sum_money(values: impl IntoIterator<Item = Money>) -> Result<Money, AllocationError> {
    checked_sum(values).ok_or(AllocationError::AmountOverflow)
}

/// Expense totals attributed to one project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectTotals {
    pub total: Money,
    pub by_status: StatusTotals,
}

/// Sum the amounts attributable to `project_id` over `expenses`.
///
/// The input may be the full expense set or any superset of the expenses
/// related to the project; the result is the same. Fails on the first
/// expense whose split percentages do not reconcile to 100.
pub fn project_totals<'a, I>(expenses: I, project_id: DbId) -> Result<ProjectTotals, AllocationError>
where
    I: IntoIterator<Item = &'a Expense>,
{
    let mut totals = ProjectTotals::default();
    for expense in expenses {
        check_split_record(expense)?;
        let amount = amount_attributable(expense, project_id);
        totals.total = add_money(totals.total, amount)?;
        totals.by_status.add(expense.status, amount)?;
    }
    Ok(totals)
}

// ---------------------------------------------------------------------------
// Project summary
// ---------------------------------------------------------------------------

/// Financial summary of a single project.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectSummary {
    pub project: Project,
    pub total_expenses: Money,
    pub upcoming_expenses: Money,
    pub incurred_expenses: Money,
    pub total_payments: Money,
    /// `budget - total_expenses + total_payments`.
    pub remaining_budget: Money,
    /// Expenses with a direct or split relationship to the project.
    pub expense_count: usize,
    pub payment_count: usize,
}

/// Summarize `project` over the given expense and payment sets.
pub fn project_summary(
    project: &Project,
    expenses: &[Expense],
    payments: &[Payment],
) -> Result<ProjectSummary, AllocationError> {
    let totals = project_totals(expenses, project.id)?;
    let expense_count = expenses.iter().filter(|e| is_related(e, project.id)).count();

    let own_payments = payments.iter().filter(|p| p.project_id == project.id);
    let payment_count = own_payments.clone().count();
    let total_payments = sum_money(own_payments.map(|p| p.amount))?;
    let remaining_budget = project
        .budget
        .checked_sub(totals.total)
        .and_then(|left| left.checked_add(total_payments))
        .ok_or(AllocationError::AmountOverflow)?;

    Ok(ProjectSummary {
        project: project.clone(),
        total_expenses: totals.total,
        upcoming_expenses: totals.by_status.upcoming,
        incurred_expenses: totals.by_status.incurred,
        total_payments,
        remaining_budget,
        expense_count,
        payment_count,
    })
}

// ---------------------------------------------------------------------------
// Portfolio
// ---------------------------------------------------------------------------

/// Which projects a dashboard covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortfolioScope {
    All,
    Project(DbId),
}

impl From<Option<DbId>> for PortfolioScope {
    fn from(project_id: Option<DbId>) -> Self {
        project_id.map_or(Self::All, Self::Project)
    }
}

/// Aggregated figures shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardData {
    pub total_projects: usize,
    pub active_projects: usize,
    pub total_budget: Money,
    pub total_expenses: Money,
    pub total_payments: Money,
    /// `total_payments - total_expenses`.
    pub net_cash_flow: Money,
    pub upcoming_expenses: Money,
    pub incurred_expenses: Money,
    /// Percentage of the budget consumed by expenses, 2 dp. Zero without a
    /// budget.
    pub budget_utilization: Money,
}

/// Compute dashboard figures for `scope`.
///
/// Expense figures are the sum of [`project_totals`] over every project in
/// scope, so a split expense contributes each share exactly once. Payments
/// are never split and are summed by project membership.
pub fn portfolio_summary(
    projects: &[Project],
    expenses: &[Expense],
    payments: &[Payment],
    scope: PortfolioScope,
) -> Result<DashboardData, AllocationError> {
    let in_scope: Vec<&Project> = match scope {
        PortfolioScope::All => projects.iter().collect(),
        PortfolioScope::Project(project_id) => {
            let project = projects
                .iter()
                .find(|p| p.id == project_id)
                .ok_or(AllocationError::UnknownProject { project_id })?;
            vec![project]
        }
    };

    let mut expense_totals = ProjectTotals::default();
    for project in &in_scope {
        let totals = project_totals(expenses, project.id)?;
        expense_totals.total = add_money(expense_totals.total, totals.total)?;
        expense_totals.by_status.upcoming =
            add_money(expense_totals.by_status.upcoming, totals.by_status.upcoming)?;
        expense_totals.by_status.incurred =
            add_money(expense_totals.by_status.incurred, totals.by_status.incurred)?;
    }

    let scope_ids: HashSet<DbId> = in_scope.iter().map(|p| p.id).collect();
    let total_payments = sum_money(
        payments
            .iter()
            .filter(|p| scope_ids.contains(&p.project_id))
            .map(|p| p.amount),
    )?;

    let total_budget = sum_money(in_scope.iter().map(|p| p.budget))?;
    let net_cash_flow = total_payments
        .checked_sub(expense_totals.total)
        .ok_or(AllocationError::AmountOverflow)?;

    Ok(DashboardData {
        total_projects: in_scope.len(),
        active_projects: in_scope
            .iter()
            .filter(|p| p.status == ProjectStatus::Active)
            .count(),
        total_budget,
        total_expenses: expense_totals.total,
        total_payments,
        net_cash_flow,
        upcoming_expenses: expense_totals.by_status.upcoming,
        incurred_expenses: expense_totals.by_status.incurred,
        budget_utilization: budget_utilization(expense_totals.total, total_budget)?,
    })
}

/// `spent / budget * 100`, rounded to 2 dp. Zero when `budget` is zero.
pub fn budget_utilization(spent: Money, budget: Money) -> Result<Money, AllocationError> {
    if budget.is_zero() {
        return Ok(Decimal::ZERO);
    }
    spent
        .checked_div(budget)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(|pct| pct.round_dp(CURRENCY_SCALE))
        .ok_or(AllocationError::AmountOverflow)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::allocation::normalize_splits;
    use crate::models::expense::{ExpenseCategory, ExpenseSplit, SplitShare};

    const A: DbId = 1;
    const B: DbId = 2;

    fn date() -> chrono::NaiveDate {
        chrono::NaiveDate::from_ymd_opt(2024, 4, 10).unwrap()
    }

    fn project(id: DbId, budget: Money, status: ProjectStatus) -> Project {
        let now = chrono::Utc::now();
        Project {
            id,
            name: format!("Project {id}"),
            description: String::new(),
            start_date: date(),
            end_date: None,
            budget,
            status,
            client_name: "Client".into(),
            location: "Site".into(),
            file_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn expense(id: DbId, project_id: DbId, amount: Money, status: ExpenseStatus) -> Expense {
        let now = chrono::Utc::now();
        Expense {
            id,
            project_id,
            splits: Vec::new(),
            category: ExpenseCategory::Materials,
            description: format!("Expense {id}"),
            amount,
            date: date(),
            vendor: None,
            receipt_url: None,
            approved: true,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    fn split_expense(
        id: DbId,
        project_id: DbId,
        amount: Money,
        status: ExpenseStatus,
        secondary: &[(DbId, Money)],
    ) -> Expense {
        let known: HashSet<DbId> = [A, B].into_iter().collect();
        let shares: Vec<SplitShare> = secondary
            .iter()
            .map(|&(project_id, percentage)| SplitShare {
                project_id,
                percentage,
            })
            .collect();
        let mut e = expense(id, project_id, amount, status);
        e.splits = normalize_splits(amount, project_id, &shares, &known).unwrap();
        e
    }

    fn payment(id: DbId, project_id: DbId, amount: Money) -> Payment {
        let now = chrono::Utc::now();
        Payment {
            id,
            project_id,
            amount,
            date: date(),
            payer: "Owner".into(),
            method: "bank-transfer".into(),
            note: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// A: budget 100k, 40k of own expenses. B: budget 50k, 10k of own
    /// expenses. Plus one 5000 expense with primary A, 20% split to B.
    fn portfolio() -> (Vec<Project>, Vec<Expense>, Vec<Payment>) {
        let projects = vec![
            project(A, dec!(100000), ProjectStatus::Active),
            project(B, dec!(50000), ProjectStatus::OnHold),
        ];
        let expenses = vec![
            expense(1, A, dec!(25000), ExpenseStatus::Incurred),
            expense(2, A, dec!(15000), ExpenseStatus::Upcoming),
            expense(3, B, dec!(10000), ExpenseStatus::Incurred),
            split_expense(4, A, dec!(5000), ExpenseStatus::Upcoming, &[(B, dec!(20))]),
        ];
        let payments = vec![
            payment(1, A, dec!(30000)),
            payment(2, B, dec!(5000)),
            payment(3, 99, dec!(700)),
        ];
        (projects, expenses, payments)
    }

    // -- amount_attributable --

    #[test]
    fn unsplit_expense_counts_only_for_its_primary() {
        let e = expense(1, A, dec!(800), ExpenseStatus::Incurred);
        assert_eq!(amount_attributable(&e, A), dec!(800));
        assert_eq!(amount_attributable(&e, B), dec!(0));
    }

    #[test]
    fn split_expense_counts_each_share() {
        let e = split_expense(1, A, dec!(1000), ExpenseStatus::Incurred, &[(B, dec!(30))]);
        assert_eq!(amount_attributable(&e, A), dec!(700));
        assert_eq!(amount_attributable(&e, B), dec!(300));
        assert_eq!(amount_attributable(&e, 99), dec!(0));
    }

    #[test]
    fn primary_with_zero_share_gets_nothing() {
        let mut e = expense(1, A, dec!(1000), ExpenseStatus::Incurred);
        e.splits = vec![
            ExpenseSplit {
                project_id: B,
                amount: dec!(1000),
                percentage: dec!(100),
            },
            ExpenseSplit {
                project_id: A,
                amount: dec!(0),
                percentage: dec!(0),
            },
        ];
        assert_eq!(amount_attributable(&e, A), dec!(0));
        assert!(is_related(&e, A));
    }

    // -- project_totals --

    #[test]
    fn cross_split_shares_land_in_both_projects() {
        let (_, expenses, _) = portfolio();
        let a = project_totals(&expenses, A).unwrap();
        let b = project_totals(&expenses, B).unwrap();

        assert_eq!(a.total, dec!(44000));
        assert_eq!(a.by_status.incurred, dec!(25000));
        assert_eq!(a.by_status.upcoming, dec!(19000));
        assert_eq!(b.total, dec!(11000));
        assert_eq!(b.by_status.upcoming, dec!(1000));
    }

    #[test]
    fn filtering_by_relation_matches_full_scan() {
        let (_, expenses, _) = portfolio();
        for project_id in [A, B, 99] {
            let full = project_totals(&expenses, project_id).unwrap();
            let related = project_totals(
                expenses.iter().filter(|e| is_related(e, project_id)),
                project_id,
            )
            .unwrap();
            assert_eq!(full, related);
        }
    }

    #[test]
    fn malformed_record_fails_aggregation() {
        let (_, mut expenses, _) = portfolio();
        expenses[3].splits[0].percentage = dec!(25);
        assert_matches!(
            project_totals(&expenses, A),
            Err(AllocationError::MalformedSplitRecord { expense_id: 4, .. })
        );
    }

    #[test]
    fn overflowing_totals_are_an_error() {
        let expenses = vec![
            expense(1, A, Decimal::MAX, ExpenseStatus::Incurred),
            expense(2, A, Decimal::MAX, ExpenseStatus::Incurred),
        ];
        assert_matches!(
            project_totals(&expenses, A),
            Err(AllocationError::AmountOverflow)
        );
        assert_matches!(
            budget_utilization(Decimal::MAX, dec!(0.01)),
            Err(AllocationError::AmountOverflow)
        );
    }

    // -- portfolio_summary --

    #[test]
    fn portfolio_does_not_double_count_split_expenses() {
        let (projects, expenses, payments) = portfolio();
        let data = portfolio_summary(&projects, &expenses, &payments, PortfolioScope::All).unwrap();

        let raw_total: Money = expenses.iter().map(|e| e.amount).sum();
        assert_eq!(data.total_expenses, raw_total);
        assert_eq!(data.total_expenses, dec!(55000));
        assert_eq!(data.total_projects, 2);
        assert_eq!(data.active_projects, 1);
        assert_eq!(data.total_budget, dec!(150000));
        // The payment of the unknown project 99 is out of scope.
        assert_eq!(data.total_payments, dec!(35000));
        assert_eq!(data.net_cash_flow, dec!(-20000));
        assert_eq!(data.upcoming_expenses, dec!(20000));
        assert_eq!(data.incurred_expenses, dec!(35000));
        assert_eq!(data.budget_utilization, dec!(36.67));
    }

    #[test]
    fn single_project_scope_uses_that_project_only() {
        let (projects, expenses, payments) = portfolio();
        let data =
            portfolio_summary(&projects, &expenses, &payments, PortfolioScope::Project(B)).unwrap();

        assert_eq!(data.total_projects, 1);
        assert_eq!(data.active_projects, 0);
        assert_eq!(data.total_budget, dec!(50000));
        assert_eq!(data.total_expenses, dec!(11000));
        assert_eq!(data.total_payments, dec!(5000));
        assert_eq!(data.net_cash_flow, dec!(-6000));
        assert_eq!(data.budget_utilization, dec!(22));
    }

    #[test]
    fn unknown_scope_project_is_rejected() {
        let (projects, expenses, payments) = portfolio();
        assert_eq!(
            portfolio_summary(&projects, &expenses, &payments, PortfolioScope::Project(99)),
            Err(AllocationError::UnknownProject { project_id: 99 })
        );
    }

    #[test]
    fn empty_portfolio_is_all_zero() {
        let data = portfolio_summary(&[], &[], &[], PortfolioScope::All).unwrap();
        assert_eq!(data.total_projects, 0);
        assert_eq!(data.total_expenses, dec!(0));
        assert_eq!(data.budget_utilization, dec!(0));
    }

    // -- project_summary --

    #[test]
    fn project_summary_counts_split_relationships() {
        let (projects, expenses, payments) = portfolio();
        let summary = project_summary(&projects[1], &expenses, &payments).unwrap();

        assert_eq!(summary.expense_count, 2);
        assert_eq!(summary.payment_count, 1);
        assert_eq!(summary.total_expenses, dec!(11000));
        assert_eq!(summary.remaining_budget, dec!(44000));
    }

    #[test]
    fn dangling_split_projects_are_reported() {
        let e = split_expense(1, A, dec!(1000), ExpenseStatus::Incurred, &[(B, dec!(30))]);
        let known: HashSet<DbId> = [A].into_iter().collect();
        assert_eq!(dangling_split_projects(&e, &known), vec![B]);
    }
}
