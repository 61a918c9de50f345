//! Transaction model
//!
//! Ledger entries such as debts taken and repaid or transfers between
//! accounts. A transaction may point back to the expense that produced it;
//! those rows are removed together with their expense.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{AccountId, CompanyId, ExpenseId, TransactionId};
use super::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    DebtTaken,
    DebtRepaid,
    Transfer,
    Deposit,
    Withdrawal,
}

impl TransactionKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "debt_taken" => Some(Self::DebtTaken),
            "debt_repaid" => Some(Self::DebtRepaid),
            "transfer" => Some(Self::Transfer),
            "deposit" => Some(Self::Deposit),
            "withdrawal" => Some(Self::Withdrawal),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DebtTaken => write!(f, "DEBT_TAKEN"),
            Self::DebtRepaid => write!(f, "DEBT_REPAID"),
            Self::Transfer => write!(f, "TRANSFER"),
            Self::Deposit => write!(f, "DEPOSIT"),
            Self::Withdrawal => write!(f, "WITHDRAWAL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,

    pub company_id: CompanyId,

    pub kind: TransactionKind,

    pub amount: Money,

    #[serde(default)]
    pub account_id: Option<AccountId>,

    /// Expense this entry was generated from
    #[serde(default)]
    pub expense_id: Option<ExpenseId>,

    pub date: NaiveDate,

    #[serde(default)]
    pub note: String,

    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(company_id: CompanyId, kind: TransactionKind, amount: Money, date: NaiveDate) -> Self {
        Self {
            id: TransactionId::new(),
            company_id,
            kind,
            amount,
            account_id: None,
            expense_id: None,
            date,
            note: String::new(),
            created_at: Utc::now(),
        }
    }

    /// Link this entry to the expense that produced it
    pub fn linked_to(mut self, expense_id: ExpenseId) -> Self {
        self.expense_id = Some(expense_id);
        self
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.date, self.kind, self.amount)
    }
}
