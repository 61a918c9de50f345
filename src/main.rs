use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use expense_ledger::cli::{
    handle_account_command, handle_employee_command, handle_expense_command, handle_labor_command,
    handle_transaction_command,
};
use expense_ledger::config::{paths::LedgerPaths, settings::Settings};
use expense_ledger::display::format_audit_log;
use expense_ledger::logging::init_tracing;
use expense_ledger::models::CompanyId;
use expense_ledger::storage::Storage;

#[derive(Parser)]
#[command(
    name = "ledger",
    author = "Kaylee Beyene",
    version,
    about = "Multi-tenant expense ledger",
    long_about = "Records company expenses and keeps account balances, employee \
                  salary totals and labor records consistent as expenses are \
                  created, edited and deleted."
)]
struct Cli {
    /// Company (tenant) ID
    #[arg(long, global = true, env = "LEDGER_COMPANY_ID")]
    company: Option<CompanyId>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Account management commands
    #[command(subcommand)]
    Account(expense_ledger::cli::AccountCommands),

    /// Employee management commands
    #[command(subcommand)]
    Employee(expense_ledger::cli::EmployeeCommands),

    /// Expense commands
    #[command(subcommand, alias = "exp")]
    Expense(expense_ledger::cli::ExpenseCommands),

    /// Labor record commands
    #[command(subcommand)]
    Labor(expense_ledger::cli::LaborCommands),

    /// Ledger entry commands
    #[command(subcommand, alias = "txn")]
    Transaction(expense_ledger::cli::TransactionCommands),

    /// Show recent audit log entries
    Audit {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Serve the HTTP API
    Serve {
        /// Listen address (defaults to the configured one)
        #[arg(long)]
        addr: Option<String>,
    },

    /// Initialize the data directory
    Init,

    /// Show current configuration and paths
    Config,
}

fn require_company(company: Option<CompanyId>) -> Result<CompanyId> {
    company.context("No company selected. Pass --company <uuid> or set LEDGER_COMPANY_ID")
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize paths and settings
    let paths = LedgerPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;
    init_tracing(&settings.log_filter);

    let command = match cli.command {
        Some(command) => command,
        None => {
            println!("ledger - multi-tenant expense ledger");
            println!();
            println!("Run 'ledger --help' for usage information.");
            return Ok(());
        }
    };

    match command {
        Commands::Init => {
            println!("Initializing expense ledger at: {}", paths.base_dir().display());
            expense_ledger::storage::initialize_storage(&paths)?;
            println!("Initialization complete!");
            return Ok(());
        }
        Commands::Config => {
            println!("Expense Ledger Configuration");
            println!("============================");
            println!("Base directory: {}", paths.base_dir().display());
            println!("Data directory: {}", paths.data_dir().display());
            println!("Audit log:      {}", paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  Currency:      {}", settings.currency);
            println!("  Listen addr:   {}", settings.listen_addr);
            println!("  Log filter:    {}", settings.log_filter);
            return Ok(());
        }
        _ => {}
    }

    let storage = Storage::open(paths)?;

    match command {
        Commands::Account(cmd) => {
            handle_account_command(&storage, &settings, require_company(cli.company)?, cmd)?;
        }
        Commands::Employee(cmd) => {
            handle_employee_command(&storage, require_company(cli.company)?, cmd)?;
        }
        Commands::Expense(cmd) => {
            handle_expense_command(&storage, require_company(cli.company)?, cmd)?;
        }
        Commands::Labor(cmd) => {
            handle_labor_command(&storage, require_company(cli.company)?, cmd)?;
        }
        Commands::Transaction(cmd) => {
            handle_transaction_command(&storage, require_company(cli.company)?, cmd)?;
        }
        Commands::Audit { limit } => {
            print!("{}", format_audit_log(&storage.audit().read_recent(limit)?));
        }
        Commands::Serve { addr } => {
            let addr = addr.unwrap_or_else(|| settings.listen_addr.clone());
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .context("Failed to start the async runtime")?;
            runtime.block_on(expense_ledger::api::serve(Arc::new(storage), &addr))?;
        }
        Commands::Init | Commands::Config => {}
    }

    Ok(())
}
