//! Employee service

use crate::audit::EntityType;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{CompanyId, Employee, EmployeeId};
use crate::storage::Storage;

pub struct EmployeeService<'a> {
    storage: &'a Storage,
}

impl<'a> EmployeeService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn create(&self, company_id: CompanyId, name: &str) -> LedgerResult<Employee> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::Validation(
                "Employee name cannot be empty".into(),
            ));
        }

        let employee = Employee::new(company_id, name);
        self.storage.employees.upsert(employee.clone())?;
        self.storage.employees.save()?;

        self.storage.log_create(
            EntityType::Employee,
            employee.id.to_string(),
            Some(employee.name.clone()),
            &employee,
        )?;

        Ok(employee)
    }

    /// Find an employee by name or ID string
    pub fn find(&self, company_id: CompanyId, identifier: &str) -> LedgerResult<Option<Employee>> {
        if let Some(employee) = self.storage.employees.get_by_name(company_id, identifier)? {
            return Ok(Some(employee));
        }

        match identifier.trim().parse::<EmployeeId>() {
            Ok(id) => self.storage.employees.get_scoped(company_id, id),
            Err(_) => Ok(None),
        }
    }

    pub fn require(&self, company_id: CompanyId, identifier: &str) -> LedgerResult<Employee> {
        self.find(company_id, identifier)?
            .ok_or_else(|| LedgerError::employee_not_found(identifier))
    }

    pub fn list(&self, company_id: CompanyId) -> LedgerResult<Vec<Employee>> {
        self.storage.employees.for_company(company_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::LedgerPaths;
    use crate::models::Money;
    use tempfile::TempDir;

    #[test]
    fn test_create_and_find() {
        let temp_dir = TempDir::new().unwrap();
        let storage = Storage::new(LedgerPaths::with_base_dir(temp_dir.path().to_path_buf())).unwrap();
        let service = EmployeeService::new(&storage);
        let company = CompanyId::new();

        let employee = service.create(company, "Dana Reyes").unwrap();
        assert_eq!(employee.salary_paid_this_month, Money::zero());

        assert_eq!(service.require(company, "dana reyes").unwrap().id, employee.id);
        assert!(service.find(CompanyId::new(), "Dana Reyes").unwrap().is_none());
        assert!(service.create(company, "   ").unwrap_err().is_validation());
        assert_eq!(service.list(company).unwrap().len(), 1);
    }
}
