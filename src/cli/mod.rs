//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod account;
pub mod employee;
pub mod expense;
pub mod labor;
pub mod transaction;

pub use account::{handle_account_command, AccountCommands};
pub use employee::{handle_employee_command, EmployeeCommands};
pub use expense::{handle_expense_command, ExpenseCommands};
pub use labor::{handle_labor_command, LaborCommands};
pub use transaction::{handle_transaction_command, TransactionCommands};

use chrono::NaiveDate;

use crate::error::{LedgerError, LedgerResult};

/// Parse a `YYYY-MM-DD` date argument
pub(crate) fn parse_date(value: &str) -> LedgerResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        LedgerError::Validation(format!(
            "Invalid date: '{}'. Use the format YYYY-MM-DD",
            value
        ))
    })
}

/// Parse an entity id argument (full UUID or prefixed form)
pub(crate) fn parse_id<T: std::str::FromStr>(what: &str, value: &str) -> LedgerResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| LedgerError::Validation(format!("Invalid {} ID: '{}'", what, value)))
}
