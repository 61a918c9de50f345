//! Expense CLI commands
//!
//! Every command goes through [`ExpenseService`], so balances, salary
//! accumulators and labor records move exactly as they do over HTTP.

use clap::Subcommand;
use serde_json::Value;

use crate::display::{format_expense_details, format_expense_list};
use crate::error::LedgerResult;
use crate::models::{CompanyId, EmployeeId, ProjectId};
use crate::services::{
    AccountService, EmployeeService, ExpenseDraft, ExpenseFilter, ExpenseService, ExpenseUpdate,
};
use crate::storage::Storage;

use super::{parse_date, parse_id};

/// Expense subcommands
#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// Record an expense and deduct it from its account
    Create {
        /// Amount (e.g., "120.50")
        amount: String,
        /// Category ("Material", "Labor", "Company Expense", ...)
        #[arg(short, long)]
        category: String,
        /// Sub-category ("Salary", "Company Labor", ...)
        #[arg(short = 's', long)]
        sub_category: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        /// Account name or ID the expense is paid from
        #[arg(short, long)]
        account: Option<String>,
        /// Employee name or ID
        #[arg(short, long)]
        employee: Option<String>,
        /// Project ID
        #[arg(short, long)]
        project: Option<String>,
        /// Expense date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
        /// Agreed wage for the labor record a labor expense creates
        #[arg(long)]
        agreed_wage: Option<String>,
        #[arg(long)]
        approved: bool,
    },
    /// Show one expense
    Show {
        /// Expense ID (full or short form)
        expense: String,
    },
    /// List expenses, oldest first
    List {
        #[arg(short, long)]
        category: Option<String>,
        /// Project ID
        #[arg(short, long)]
        project: Option<String>,
        /// Employee name or ID
        #[arg(short, long)]
        employee: Option<String>,
    },
    /// Edit an expense, moving its effect on balances
    Update {
        /// Expense ID (full or short form)
        expense: String,
        #[arg(long)]
        amount: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short = 's', long)]
        sub_category: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        /// Account name or ID to pay from
        #[arg(short, long, conflicts_with = "no_account")]
        account: Option<String>,
        /// Detach the expense from its account
        #[arg(long)]
        no_account: bool,
        /// Employee name or ID
        #[arg(short, long)]
        employee: Option<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        agreed_wage: Option<String>,
        #[arg(long)]
        approved: Option<bool>,
    },
    /// Delete an expense and undo its effect on balances
    Delete {
        /// Expense ID (full or short form)
        expense: String,
    },
}

fn employee_id(storage: &Storage, company_id: CompanyId, employee: &str) -> LedgerResult<EmployeeId> {
    Ok(EmployeeService::new(storage).require(company_id, employee)?.id)
}

/// Handle an expense command
pub fn handle_expense_command(
    storage: &Storage,
    company_id: CompanyId,
    cmd: ExpenseCommands,
) -> LedgerResult<()> {
    let service = ExpenseService::new(storage);
    let accounts = AccountService::new(storage);

    match cmd {
        ExpenseCommands::Create {
            amount,
            category,
            sub_category,
            description,
            account,
            employee,
            project,
            date,
            agreed_wage,
            approved,
        } => {
            let draft = ExpenseDraft {
                amount: Some(Value::String(amount)),
                category,
                sub_category,
                description,
                paid_from: match account {
                    Some(a) => Some(accounts.require(company_id, &a)?.id),
                    None => None,
                },
                employee_id: match employee {
                    Some(e) => Some(employee_id(storage, company_id, &e)?),
                    None => None,
                },
                project_id: project.map(|p| parse_id("project", &p)).transpose()?,
                expense_date: date.map(|d| parse_date(&d)).transpose()?,
                approved,
                agreed_wage: agreed_wage.map(Value::String),
                ..ExpenseDraft::default()
            };

            let expense = service.create(company_id, draft)?;
            println!("Recorded expense: {}", expense);
            println!("  ID: {}", expense.id);
        }

        ExpenseCommands::Show { expense } => {
            let found = service.find(company_id, &expense)?;
            print!("{}", format_expense_details(&service.expand(found)?));
        }

        ExpenseCommands::List {
            category,
            project,
            employee,
        } => {
            let filter = ExpenseFilter {
                category,
                project_id: project
                    .map(|p| parse_id::<ProjectId>("project", &p))
                    .transpose()?,
                employee_id: match employee {
                    Some(e) => Some(employee_id(storage, company_id, &e)?),
                    None => None,
                },
            };

            let views = service
                .list(company_id, &filter)?
                .into_iter()
                .map(|e| service.expand(e))
                .collect::<LedgerResult<Vec<_>>>()?;
            print!("{}", format_expense_list(&views));
        }

        ExpenseCommands::Update {
            expense,
            amount,
            category,
            sub_category,
            description,
            account,
            no_account,
            employee,
            date,
            agreed_wage,
            approved,
        } => {
            let found = service.find(company_id, &expense)?;

            let paid_from = if no_account {
                Some(None)
            } else {
                match account {
                    Some(a) => Some(Some(accounts.require(company_id, &a)?.id)),
                    None => None,
                }
            };

            let update = ExpenseUpdate {
                amount: amount.map(Value::String),
                category,
                sub_category: sub_category.map(Some),
                description: description.map(Some),
                paid_from,
                employee_id: match employee {
                    Some(e) => Some(Some(employee_id(storage, company_id, &e)?)),
                    None => None,
                },
                expense_date: date.map(|d| parse_date(&d)).transpose()?,
                approved,
                agreed_wage: agreed_wage.map(Value::String),
                ..ExpenseUpdate::default()
            };

            let updated = service.update(company_id, found.id, update)?;
            println!("Updated expense: {}", updated);
        }

        ExpenseCommands::Delete { expense } => {
            let found = service.find(company_id, &expense)?;
            let deletion = service.delete(company_id, found.id)?;

            println!("Deleted expense: {}", deletion.expense);
            if deletion.transactions_removed > 0 {
                println!(
                    "  Removed {} linked transaction(s)",
                    deletion.transactions_removed
                );
            }
            if let Some(warning) = deletion.labor.warning() {
                eprintln!("Warning: {}", warning);
            }
        }
    }

    Ok(())
}
