//! Transaction collection
//!
//! Stored in `transactions.json`.

use chrono::{DateTime, Utc};

use crate::error::LedgerError;
use crate::models::{CompanyId, ExpenseId, Transaction, TransactionId};

use super::collection::{JsonCollection, Record};

impl Record for Transaction {
    type Id = TransactionId;

    fn id(&self) -> TransactionId {
        self.id
    }

    fn company_id(&self) -> CompanyId {
        self.company_id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

pub type TransactionRepository = JsonCollection<Transaction>;

impl JsonCollection<Transaction> {
    /// Transactions generated by an expense
    pub fn get_by_expense(&self, expense_id: ExpenseId) -> Result<Vec<Transaction>, LedgerError> {
        self.filter(|t| t.expense_id == Some(expense_id))
    }

    /// Remove every transaction linked to an expense
    pub fn remove_for_expense(&self, expense_id: ExpenseId) -> Result<Vec<Transaction>, LedgerError> {
        self.remove_where(|t| t.expense_id == Some(expense_id))
    }
}
