//! Employee CLI commands

use clap::Subcommand;

use crate::display::format_employee_list;
use crate::error::LedgerResult;
use crate::models::CompanyId;
use crate::services::EmployeeService;
use crate::storage::Storage;

#[derive(Subcommand)]
pub enum EmployeeCommands {
    /// Add an employee
    Create {
        /// Employee name
        name: String,
    },
    /// List employees with their salary paid this month
    List,
}

pub fn handle_employee_command(
    storage: &Storage,
    company_id: CompanyId,
    cmd: EmployeeCommands,
) -> LedgerResult<()> {
    let service = EmployeeService::new(storage);

    match cmd {
        EmployeeCommands::Create { name } => {
            let employee = service.create(company_id, &name)?;
            println!("Created employee: {}", employee.name);
            println!("  ID: {}", employee.id);
        }
        EmployeeCommands::List => {
            print!("{}", format_employee_list(&service.list(company_id)?));
        }
    }

    Ok(())
}
