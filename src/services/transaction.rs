//! Transaction service
//!
//! Records ledger entries such as debts taken or repaid. An entry may be
//! linked to the expense that caused it and is removed when that expense is
//! deleted. Recording an entry does not move account balances.

use chrono::NaiveDate;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{AccountId, CompanyId, ExpenseId, Money, Transaction, TransactionKind};
use crate::storage::{LedgerMutation, Storage};

/// Input for recording a transaction
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub kind: TransactionKind,
    pub amount: Money,
    pub date: NaiveDate,
    pub account_id: Option<AccountId>,
    pub expense_id: Option<ExpenseId>,
    pub note: String,
}

pub struct TransactionService<'a> {
    storage: &'a Storage,
}

impl<'a> TransactionService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn record(&self, company_id: CompanyId, input: NewTransaction) -> LedgerResult<Transaction> {
        if !input.amount.is_positive() {
            return Err(LedgerError::Validation(format!(
                "Transaction amount must be positive (got {})",
                input.amount
            )));
        }

        if let Some(expense_id) = input.expense_id {
            self.storage
                .expenses
                .get_scoped(company_id, expense_id)?
                .ok_or_else(|| LedgerError::expense_not_found(expense_id.to_string()))?;
        }

        let mut txn = Transaction::new(company_id, input.kind, input.amount, input.date);
        txn.account_id = input.account_id;
        txn.expense_id = input.expense_id;
        txn.note = input.note;

        self.storage
            .apply_batch(company_id, vec![LedgerMutation::UpsertTransaction(txn.clone())])?;

        Ok(txn)
    }

    /// Transactions for a company, optionally only those linked to one expense
    pub fn list(
        &self,
        company_id: CompanyId,
        expense_id: Option<ExpenseId>,
    ) -> LedgerResult<Vec<Transaction>> {
        let mut transactions = match expense_id {
            Some(expense_id) => self.storage.transactions.get_by_expense(expense_id)?,
            None => self.storage.transactions.all()?,
        };
        transactions.retain(|t| t.company_id == company_id);
        transactions.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));
        Ok(transactions)
    }
}
