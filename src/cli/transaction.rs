//! Transaction CLI commands

use chrono::Utc;
use clap::Subcommand;

use crate::display::format_transaction_list;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{CompanyId, ExpenseId, Money, TransactionKind};
use crate::services::{AccountService, ExpenseService, NewTransaction, TransactionService};
use crate::storage::Storage;

use super::parse_date;

#[derive(Subcommand)]
pub enum TransactionCommands {
    /// Record a ledger entry
    Add {
        /// Kind (debt_taken, debt_repaid, transfer, deposit, withdrawal)
        kind: String,
        /// Amount (e.g., "75.00")
        amount: String,
        /// Expense the entry belongs to (removed together with it)
        #[arg(short, long)]
        expense: Option<String>,
        /// Account name or ID
        #[arg(short, long)]
        account: Option<String>,
        /// Entry date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
        #[arg(short, long, default_value = "")]
        note: String,
    },
    /// List ledger entries
    List {
        /// Only entries linked to this expense
        #[arg(short, long)]
        expense: Option<String>,
    },
}

fn expense_id(storage: &Storage, company_id: CompanyId, expense: &str) -> LedgerResult<ExpenseId> {
    Ok(ExpenseService::new(storage).find(company_id, expense)?.id)
}

pub fn handle_transaction_command(
    storage: &Storage,
    company_id: CompanyId,
    cmd: TransactionCommands,
) -> LedgerResult<()> {
    let service = TransactionService::new(storage);

    match cmd {
        TransactionCommands::Add {
            kind,
            amount,
            expense,
            account,
            date,
            note,
        } => {
            let kind = TransactionKind::parse(&kind).ok_or_else(|| {
                LedgerError::Validation(format!(
                    "Invalid transaction kind: '{}'. Valid kinds: debt_taken, debt_repaid, transfer, deposit, withdrawal",
                    kind
                ))
            })?;
            let amount = Money::parse(&amount)
                .map_err(|e| LedgerError::Validation(e.to_string()))?;

            let input = NewTransaction {
                kind,
                amount,
                date: match date {
                    Some(d) => parse_date(&d)?,
                    None => Utc::now().date_naive(),
                },
                account_id: match account {
                    Some(a) => Some(AccountService::new(storage).require(company_id, &a)?.id),
                    None => None,
                },
                expense_id: match expense {
                    Some(e) => Some(expense_id(storage, company_id, &e)?),
                    None => None,
                },
                note,
            };

            let txn = service.record(company_id, input)?;
            println!("Recorded transaction: {}", txn);
            println!("  ID: {}", txn.id);
        }

        TransactionCommands::List { expense } => {
            let expense_id = match expense {
                Some(e) => Some(expense_id(storage, company_id, &e)?),
                None => None,
            };
            print!(
                "{}",
                format_transaction_list(&service.list(company_id, expense_id)?)
            );
        }
    }

    Ok(())
}
