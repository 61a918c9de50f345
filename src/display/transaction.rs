//! Transaction display formatting

use crate::models::Transaction;

use super::truncate;

pub fn format_transaction_list(transactions: &[Transaction]) -> String {
    if transactions.is_empty() {
        return "No transactions found.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:10} {:12} {:>12}  {:12} {}\n",
        "Date", "Kind", "Amount", "Expense", "Note"
    ));
    output.push_str(&"-".repeat(70));
    output.push('\n');

    for txn in transactions {
        let expense = txn.expense_id.map(|e| e.to_string()).unwrap_or_default();
        output.push_str(&format!(
            "{} {:12} {:>12}  {:12} {}\n",
            txn.date.format("%Y-%m-%d"),
            txn.kind.to_string(),
            txn.amount.to_string(),
            expense,
            truncate(&txn.note, 30).trim_end(),
        ));
    }

    output
}
