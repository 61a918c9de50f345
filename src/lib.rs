//! Expense Ledger - multi-tenant expense ledger consistency engine
//!
//! Records company expenses and keeps the figures they drive consistent:
//! account balances, employee salary accumulators, project and company
//! labor records, and the ledger entries linked to each expense.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (accounts, expenses, labor records, etc.)
//! - `storage`: JSON file storage layer and the transactional batch
//! - `services`: Business logic layer (expense flows, labor reconciliation)
//! - `audit`: Audit logging system
//! - `api`: HTTP API over the expense flows
//! - `cli` / `display`: Command handlers and terminal formatting
//!
//! # Example
//!
//! ```rust,ignore
//! use expense_ledger::config::paths::LedgerPaths;
//! use expense_ledger::services::{ExpenseDraft, ExpenseService};
//! use expense_ledger::storage::Storage;
//!
//! let storage = Storage::open(LedgerPaths::new()?)?;
//! let expense = ExpenseService::new(&storage).create(company_id, draft)?;
//! ```

pub mod api;
pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{LedgerError, LedgerResult};
