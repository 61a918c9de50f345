//! Core data models for the expense ledger
//!
//! This module contains the entities the ledger keeps consistent: accounts,
//! expenses, employees, labor records and transactions, plus the money type
//! and the amount normalizer shared by all of them.

pub mod account;
pub mod amount;
pub mod employee;
pub mod expense;
pub mod ids;
pub mod labor;
pub mod money;
pub mod transaction;

pub use account::Account;
pub use amount::{to_money, to_number, AmountLike};
pub use employee::Employee;
pub use expense::{Expense, ExpenseKind};
pub use ids::{
    AccountId, CompanyId, CustomerId, EmployeeId, ExpenseId, LaborId, ProjectId, TransactionId,
};
pub use labor::{LaborRecord, LaborScope};
pub use money::{Money, MoneyOverflow};
pub use transaction::{Transaction, TransactionKind};
