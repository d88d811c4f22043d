//! Expense split validation and normalization.
//!
//! A split expense stores one [`ExpenseSplit`] per participating project,
//! including a derived entry for the primary project that carries the
//! remainder. Percentages across the list always sum to 100 and every
//! `amount` is derived from its `percentage` and the expense total here, at
//! write time, never at read time.

use std::collections::HashSet;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::expense::{Expense, ExpenseSplit, SplitShare};
use crate::types::{DbId, Money, MAX_AMOUNT};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Percentage that a complete allocation sums to.
pub const FULL_ALLOCATION: Decimal = Decimal::ONE_HUNDRED;

/// Decimal places of the currency (cents).
pub const CURRENCY_SCALE: u32 = 2;

/// Largest deviation from 100% a stored split list may show before it is
/// reported as malformed.
pub fn percentage_tolerance() -> Decimal {
    Decimal::new(1, 6)
}

fn cent() -> Decimal {
    Decimal::new(1, CURRENCY_SCALE)
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Validation failures of an expense allocation.
///
/// All variants are recoverable and meant to be reported back to whoever
/// submitted the expense.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AllocationError {
    #[error("Project {project_id} does not exist")]
    UnknownProject { project_id: DbId },

    #[error("Project {project_id} appears more than once in the expense allocation")]
    DuplicateProjectInSplit { project_id: DbId },

    #[error("Secondary splits allocate {total_percentage}%, which exceeds 100%")]
    OverAllocated { total_percentage: Money },

    #[error("Split percentage for project {project_id} must be between 0 and 100, got {percentage}")]
    InvalidPercentage { project_id: DbId, percentage: Money },

    #[error("Expense amount must be a positive value in whole cents no greater than 999999999999.99, got {amount}")]
    InvalidAmount { amount: Money },

    #[error("Amount total exceeds the representable range")]
    AmountOverflow,

    #[error("Expense {expense_id} has split percentages summing to {total_percentage}%, expected 100%")]
    MalformedSplitRecord {
        expense_id: DbId,
        total_percentage: Money,
    },
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Validate proposed secondary splits and resolve them into a complete split
/// list.
///
/// Rules, in order:
/// 1. every referenced project (primary and secondary) is in `known_projects`
/// 2. no secondary split names the primary project
/// 3. no project appears twice among the secondary splits
/// 4. each secondary percentage lies in `[0, 100]` and their sum does not
///    exceed 100
///
/// The primary project receives `100 - sum(secondary)` as a trailing entry.
/// Without secondary splits the result is empty: the expense is wholly
/// attributed to the primary project.
pub fn normalize_splits(
    total_amount: Money,
    primary_project_id: DbId,
    secondary: &[SplitShare],
    known_projects: &HashSet<DbId>,
) -> Result<Vec<ExpenseSplit>, AllocationError> {
    validate_total(total_amount)?;

    if !known_projects.contains(&primary_project_id) {
        return Err(AllocationError::UnknownProject {
            project_id: primary_project_id,
        });
    }
    if let Some(unknown) = secondary
        .iter()
        .find(|s| !known_projects.contains(&s.project_id))
    {
        return Err(AllocationError::UnknownProject {
            project_id: unknown.project_id,
        });
    }

    if secondary.iter().any(|s| s.project_id == primary_project_id) {
        return Err(AllocationError::DuplicateProjectInSplit {
            project_id: primary_project_id,
        });
    }

    let mut seen = HashSet::with_capacity(secondary.len());
    for share in secondary {
        if !seen.insert(share.project_id) {
            return Err(AllocationError::DuplicateProjectInSplit {
                project_id: share.project_id,
            });
        }
    }

    for share in secondary {
        if share.percentage < Decimal::ZERO || share.percentage > FULL_ALLOCATION {
            return Err(AllocationError::InvalidPercentage {
                project_id: share.project_id,
                percentage: share.percentage,
            });
        }
    }

    let allocated: Decimal = secondary.iter().map(|s| s.percentage).sum();
    if allocated > FULL_ALLOCATION {
        return Err(AllocationError::OverAllocated {
            total_percentage: allocated,
        });
    }

    if secondary.is_empty() {
        return Ok(Vec::new());
    }

    let mut entries: Vec<(DbId, Decimal)> = secondary
        .iter()
        .map(|s| (s.project_id, s.percentage))
        .collect();
    entries.push((primary_project_id, FULL_ALLOCATION - allocated));

    let amounts = apportion(total_amount, entries.iter().map(|(_, pct)| *pct))?;

    Ok(entries
        .into_iter()
        .zip(amounts)
        .map(|((project_id, percentage), amount)| ExpenseSplit {
            project_id,
            amount,
            percentage,
        })
        .collect())
}

/// Re-derive a stored split list, for example after the expense total
/// changed.
///
/// Accepts the full list including the primary project's derived entry. That
/// entry is dropped only if it is the sole entry for the primary project and
/// its percentage matches the remainder of the secondary splits; anything
/// else is a duplicate allocation of the primary project.
pub fn renormalize(
    total_amount: Money,
    primary_project_id: DbId,
    stored: &[ExpenseSplit],
    known_projects: &HashSet<DbId>,
) -> Result<Vec<ExpenseSplit>, AllocationError> {
    let (primary_entries, secondary): (Vec<&ExpenseSplit>, Vec<&ExpenseSplit>) = stored
        .iter()
        .partition(|s| s.project_id == primary_project_id);

    let secondary: Vec<SplitShare> = secondary.into_iter().map(SplitShare::from).collect();

    match primary_entries.as_slice() {
        [] => {}
        [entry] => {
            let remainder = checked_sum(secondary.iter().map(|s| s.percentage))
                .and_then(|allocated| FULL_ALLOCATION.checked_sub(allocated));
            let matches_remainder = remainder
                .and_then(|remainder| entry.percentage.checked_sub(remainder))
                .is_some_and(|diff| diff.abs() <= percentage_tolerance());
            if !matches_remainder {
                return Err(AllocationError::DuplicateProjectInSplit {
                    project_id: primary_project_id,
                });
            }
        }
        _ => {
            return Err(AllocationError::DuplicateProjectInSplit {
                project_id: primary_project_id,
            })
        }
    }

    normalize_splits(total_amount, primary_project_id, &secondary, known_projects)
}

/// The secondary allocations of a stored expense, without the primary's
/// derived entry.
pub fn secondary_shares(expense: &Expense) -> Vec<SplitShare> {
    expense
        .splits
        .iter()
        .filter(|s| s.project_id != expense.project_id)
        .map(SplitShare::from)
        .collect()
}

/// Verify that a stored expense's split percentages reconcile to 100.
///
/// Unsplit expenses always pass.
pub fn check_split_record(expense: &Expense) -> Result<(), AllocationError> {
    if expense.splits.is_empty() {
        return Ok(());
    }
    // An overflowing sum counts as malformed.
    let total_percentage =
        checked_sum(expense.splits.iter().map(|s| s.percentage)).unwrap_or(Decimal::MAX);
    let reconciles = total_percentage
        .checked_sub(FULL_ALLOCATION)
        .is_some_and(|diff| diff.abs() <= percentage_tolerance());
    if !reconciles {
        return Err(AllocationError::MalformedSplitRecord {
            expense_id: expense.id,
            total_percentage,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Sum of `values`, or `None` if it leaves the `Decimal` range.
pub(crate) fn checked_sum(values: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, value| acc.checked_add(value))
}

fn validate_total(total_amount: Money) -> Result<(), AllocationError> {
    if total_amount <= Decimal::ZERO
        || total_amount > MAX_AMOUNT
        || total_amount.round_dp(CURRENCY_SCALE) != total_amount
    {
        return Err(AllocationError::InvalidAmount {
            amount: total_amount,
        });
    }
    Ok(())
}

/// Split `total` into cent amounts proportional to `percentages`.
///
/// Each amount is the exact share truncated to cents; the cents lost to
/// truncation go, one each, to the entries with the largest truncated
/// fractions (earlier entries win ties). The result sums to `total` exactly
/// and every amount lies within one cent of its exact share.
fn apportion(
    total: Money,
    percentages: impl Iterator<Item = Decimal>,
) -> Result<Vec<Money>, AllocationError> {
    let exact = percentages
        .map(|pct| {
            total
                .checked_mul(pct)
                .map(|scaled| scaled / FULL_ALLOCATION)
                .ok_or(AllocationError::AmountOverflow)
        })
        .collect::<Result<Vec<Decimal>, _>>()?;

    let mut amounts: Vec<Decimal> = exact
        .iter()
        .map(|share| share.round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::ToZero))
        .collect();

    let distributed: Decimal = amounts.iter().sum();
    let leftover_cents = ((total - distributed) / cent())
        .round()
        .to_usize()
        .unwrap_or(0);

    let mut order: Vec<usize> = (0..amounts.len()).collect();
    order.sort_by(|&a, &b| (exact[b] - amounts[b]).cmp(&(exact[a] - amounts[a])));

    for &idx in order.iter().take(leftover_cents) {
        amounts[idx] += cent();
    }
    Ok(amounts)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
