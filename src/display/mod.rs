//! Display formatting for terminal output
//!
//! Plain-text tables and detail views for the CLI. Formatters return
//! `String`s; the command handlers decide where to print them.

pub mod account;
pub mod audit;
pub mod employee;
pub mod expense;
pub mod labor;
pub mod transaction;

pub use account::format_account_list;
pub use audit::format_audit_log;
pub use employee::format_employee_list;
pub use expense::{format_expense_details, format_expense_list};
pub use labor::format_labor_list;
pub use transaction::format_transaction_list;

/// Pad `s` to `max_len` characters, cutting it with an ellipsis if longer
pub(crate) fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        format!("{:width$}", s, width = max_len)
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

/// Width of the widest value, never narrower than the header
pub(crate) fn column_width<'a, I>(header: &str, values: I) -> usize
where
    I: IntoIterator<Item = &'a str>,
{
    values
        .into_iter()
        .map(|v| v.chars().count())
        .max()
        .unwrap_or(0)
        .max(header.len())
}
