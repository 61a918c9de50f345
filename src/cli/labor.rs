//! Labor CLI commands

use clap::Subcommand;

use crate::display::format_labor_list;
use crate::error::LedgerResult;
use crate::models::{CompanyId, LaborScope, ProjectId};
use crate::services::EmployeeService;
use crate::storage::Storage;

use super::parse_id;

#[derive(Subcommand)]
pub enum LaborCommands {
    /// List labor records
    ///
    /// With --project only that project's records are shown; otherwise
    /// project labor and company labor are listed together.
    List {
        /// Project ID
        #[arg(short, long)]
        project: Option<String>,
        /// Employee name or ID
        #[arg(short, long)]
        employee: Option<String>,
    },
}

pub fn handle_labor_command(
    storage: &Storage,
    company_id: CompanyId,
    cmd: LaborCommands,
) -> LedgerResult<()> {
    match cmd {
        LaborCommands::List { project, employee } => {
            let employee_id = match employee {
                Some(e) => Some(EmployeeService::new(storage).require(company_id, &e)?.id),
                None => None,
            };

            let records = match project {
                Some(p) => {
                    let project_id: ProjectId = parse_id("project", &p)?;
                    storage
                        .project_labor
                        .get_by_project(company_id, project_id, employee_id)?
                }
                None => {
                    let mut records = Vec::new();
                    for scope in [LaborScope::Project, LaborScope::Company] {
                        records.extend(storage.labor(scope).filter(|r| {
                            r.company_id == company_id
                                && employee_id.map_or(true, |e| r.employee_id == e)
                        })?);
                    }
                    records
                }
            };

            print!("{}", format_labor_list(&records));
        }
    }

    Ok(())
}
