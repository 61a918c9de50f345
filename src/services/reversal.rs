//! Balance reversal and reapplication
//!
//! Pure planners that turn an expense into the ledger mutations undoing or
//! redoing its effect on the paying account and on the salary accumulator.
//! The only store access is [`reversal_amount`], which resolves what a
//! company labor expense actually paid.

use crate::error::LedgerResult;
use crate::models::{Expense, Money};
use crate::storage::{LedgerMutation, Storage};

/// The amount that was taken from the paying account for `expense`
///
/// A company labor expense with an employee paid whatever the employee's most
/// recent company labor record says; everything else paid its own amount.
pub fn reversal_amount(storage: &Storage, expense: &Expense) -> LedgerResult<Money> {
    let amount = expense.amount.abs();

    match expense.employee_id {
        Some(employee_id) if expense.is_company_labor() => Ok(storage
            .company_labor
            .latest_for_employee(expense.company_id, employee_id)?
            .map(|record| record.paid_amount.abs())
            .unwrap_or(amount)),
        _ => Ok(amount),
    }
}

/// Mutations that undo `expense`, crediting `amount` back to its account
pub fn plan_reversal(expense: &Expense, amount: Money) -> Vec<LedgerMutation> {
    let mut mutations = Vec::new();

    if let Some(account_id) = expense.paid_from {
        if !amount.is_zero() {
            mutations.push(LedgerMutation::IncrementBalance {
                account_id,
                delta: amount,
            });
        }
    }

    if let (true, Some(employee_id)) = (expense.is_salary(), expense.employee_id) {
        mutations.push(LedgerMutation::AdjustSalaryPaid {
            employee_id,
            delta: -expense.amount.abs(),
            last_payment_date: None,
        });
    }

    mutations
}

/// Mutations that apply `expense` to its account and salary accumulator
pub fn plan_reapplication(expense: &Expense) -> Vec<LedgerMutation> {
    let amount = expense.amount.abs();
    let mut mutations = Vec::new();

    if let Some(account_id) = expense.paid_from {
        if !amount.is_zero() {
            mutations.push(LedgerMutation::IncrementBalance {
                account_id,
                delta: -amount,
            });
        }
    }

    if let (true, Some(employee_id)) = (expense.is_salary(), expense.employee_id) {
        mutations.push(LedgerMutation::AdjustSalaryPaid {
            employee_id,
            delta: amount,
            last_payment_date: Some(expense.expense_date),
        });
    }

    mutations
}
