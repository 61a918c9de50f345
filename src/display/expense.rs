//! Expense display formatting
//!
//! A register-style list and a detail view that includes the paying account
//! and the employee when they are known.

use crate::services::ExpenseView;

use super::truncate;

/// Format a single expense row
fn format_expense_row(view: &ExpenseView) -> String {
    let expense = &view.expense;
    let account = view
        .paid_from_account
        .as_ref()
        .map(|a| a.name.as_str())
        .unwrap_or("-");

    format!(
        "{} {} {} {} {:>12}  {}",
        expense.expense_date.format("%Y-%m-%d"),
        truncate(&expense.category, 16),
        truncate(expense.description.as_deref().unwrap_or(""), 24),
        truncate(account, 14),
        expense.amount.to_string(),
        expense.id,
    )
}

pub fn format_expense_list(views: &[ExpenseView]) -> String {
    if views.is_empty() {
        return "No expenses found.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:10} {:16} {:24} {:14} {:>12}  {}\n",
        "Date", "Category", "Description", "Paid from", "Amount", "ID"
    ));
    output.push_str(&"-".repeat(96));
    output.push('\n');

    for view in views {
        output.push_str(&format_expense_row(view));
        output.push('\n');
    }

    output
}

pub fn format_expense_details(view: &ExpenseView) -> String {
    let expense = &view.expense;
    let mut output = String::new();

    output.push_str(&format!("Expense: {}\n", expense.id));
    output.push_str(&format!("  Date:        {}\n", expense.expense_date.format("%Y-%m-%d")));
    output.push_str(&format!("  Amount:      {}\n", expense.amount));
    output.push_str(&format!("  Kind:        {}\n", expense.kind()));

    match &expense.sub_category {
        Some(sub) => output.push_str(&format!("  Category:    {} / {}\n", expense.category, sub)),
        None => output.push_str(&format!("  Category:    {}\n", expense.category)),
    }

    if let Some(description) = &expense.description {
        output.push_str(&format!("  Description: {}\n", description));
    }

    match (&view.paid_from_account, expense.paid_from) {
        (Some(account), _) => output.push_str(&format!(
            "  Paid from:   {} (balance {})\n",
            account.name, account.balance
        )),
        // Account has since been removed
        (None, Some(id)) => output.push_str(&format!("  Paid from:   {} (missing)\n", id)),
        (None, None) => output.push_str("  Paid from:   (none)\n"),
    }

    if let Some(employee) = &view.employee {
        output.push_str(&format!("  Employee:    {}\n", employee.name));
    }
    if let Some(project_id) = expense.project_id {
        output.push_str(&format!("  Project:     {}\n", project_id));
    }
    output.push_str(&format!(
        "  Approved:    {}\n",
        if expense.approved { "Yes" } else { "No" }
    ));

    output
}
