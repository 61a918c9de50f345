//! Account display formatting

use crate::models::{Account, Money};

use super::column_width;

/// Format accounts with balances as a table, with a total row
pub fn format_account_list(accounts: &[Account]) -> String {
    if accounts.is_empty() {
        return "No accounts found.\n".to_string();
    }

    let name_width = column_width("Name", accounts.iter().map(|a| a.name.as_str()));

    let mut output = String::new();
    output.push_str(&format!(
        "{:<name_width$}  {:<8}  {:>12}  {}\n",
        "Name", "Currency", "Balance", "ID",
    ));
    output.push_str(&format!(
        "{:-<name_width$}  {:-<8}  {:->12}  {:-<12}\n",
        "", "", "", "",
    ));

    for account in accounts {
        output.push_str(&format!(
            "{:<name_width$}  {:<8}  {:>12}  {}\n",
            account.name,
            account.currency,
            account.balance.to_string(),
            account.id,
        ));
    }

    let total: Money = accounts.iter().map(|a| a.balance).sum();
    output.push_str(&format!(
        "{:-<name_width$}  {:-<8}  {:->12}\n",
        "", "", "",
    ));
    output.push_str(&format!(
        "{:<name_width$}  {:<8}  {:>12}\n",
        "TOTAL",
        "",
        total.to_string(),
    ));

    output
}
