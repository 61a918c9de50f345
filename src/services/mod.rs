//! Service layer for the expense ledger
//!
//! Business logic on top of the storage layer: validation, tenant scoping and
//! the planning of ledger batches.

pub mod account;
pub mod employee;
pub mod expense;
pub mod labor;
pub mod reversal;
pub mod transaction;

pub use account::AccountService;
pub use employee::EmployeeService;
pub use expense::{
    ExpenseDeletion, ExpenseDraft, ExpenseFilter, ExpenseService, ExpenseUpdate, ExpenseView,
};
pub use labor::{LaborMatchCriteria, LaborOutcome, LaborReconciler, MatchStrategy};
pub use transaction::{NewTransaction, TransactionService};
