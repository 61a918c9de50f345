//! Employee collection
//!
//! Stored in `employees.json`.

use chrono::{DateTime, Utc};

use crate::error::LedgerError;
use crate::models::{CompanyId, Employee, EmployeeId};

use super::collection::{JsonCollection, Record};

impl Record for Employee {
    type Id = EmployeeId;

    fn id(&self) -> EmployeeId {
        self.id
    }

    fn company_id(&self) -> CompanyId {
        self.company_id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

pub type EmployeeRepository = JsonCollection<Employee>;

impl JsonCollection<Employee> {
    /// Get a company's employee by name (case-insensitive)
    pub fn get_by_name(
        &self,
        company_id: CompanyId,
        name: &str,
    ) -> Result<Option<Employee>, LedgerError> {
        let name_lower = name.trim().to_lowercase();
        Ok(self
            .for_company(company_id)?
            .into_iter()
            .find(|e| e.name.to_lowercase() == name_lower))
    }
}
