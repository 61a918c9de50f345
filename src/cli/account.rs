//! Account CLI commands

use clap::Subcommand;

use crate::config::Settings;
use crate::display::format_account_list;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{CompanyId, Money};
use crate::services::AccountService;
use crate::storage::Storage;

/// Account subcommands
#[derive(Subcommand)]
pub enum AccountCommands {
    /// Create a new account
    Create {
        /// Account name
        name: String,
        /// Currency code (defaults to the configured currency)
        #[arg(short, long)]
        currency: Option<String>,
        /// Opening balance (e.g., "1000.00" or "1000")
        #[arg(short, long, default_value = "0")]
        balance: String,
    },
    /// List accounts with their balances
    List,
    /// Rename an account
    Rename {
        /// Account name or ID
        account: String,
        /// New name
        name: String,
    },
}

/// Handle an account command
pub fn handle_account_command(
    storage: &Storage,
    settings: &Settings,
    company_id: CompanyId,
    cmd: AccountCommands,
) -> LedgerResult<()> {
    let service = AccountService::new(storage);

    match cmd {
        AccountCommands::Create {
            name,
            currency,
            balance,
        } => {
            let opening = Money::parse(&balance).map_err(|e| {
                LedgerError::Validation(format!(
                    "Invalid balance format: '{}'. Use format like '1000.00' or '1000'. Error: {}",
                    balance, e
                ))
            })?;
            let currency = currency.unwrap_or_else(|| settings.currency.clone());

            let account = service.create(company_id, &name, &currency, opening)?;

            println!("Created account: {}", account.name);
            println!("  Currency: {}", account.currency);
            println!("  Balance:  {}", account.balance);
            println!("  ID:       {}", account.id);
        }

        AccountCommands::List => {
            let accounts = service.list(company_id)?;
            print!("{}", format_account_list(&accounts));
        }

        AccountCommands::Rename { account, name } => {
            let found = service.require(company_id, &account)?;
            let renamed = service.rename(company_id, found.id, &name)?;
            println!("Renamed account: {} -> {}", found.name, renamed.name);
        }
    }

    Ok(())
}
