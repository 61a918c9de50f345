//! Expense collection
//!
//! Stored in `expenses.json`.

use chrono::{DateTime, Utc};

use crate::error::LedgerError;
use crate::models::{CompanyId, EmployeeId, Expense, ExpenseId, ProjectId};

use super::collection::{JsonCollection, Record};

impl Record for Expense {
    type Id = ExpenseId;

    fn id(&self) -> ExpenseId {
        self.id
    }

    fn company_id(&self) -> CompanyId {
        self.company_id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

pub type ExpenseRepository = JsonCollection<Expense>;

impl JsonCollection<Expense> {
    pub fn get_by_project(
        &self,
        company_id: CompanyId,
        project_id: ProjectId,
    ) -> Result<Vec<Expense>, LedgerError> {
        self.filter(|e| e.company_id == company_id && e.project_id == Some(project_id))
    }

    pub fn get_by_employee(
        &self,
        company_id: CompanyId,
        employee_id: EmployeeId,
    ) -> Result<Vec<Expense>, LedgerError> {
        self.filter(|e| e.company_id == company_id && e.employee_id == Some(employee_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    #[test]
    fn test_get_by_project() {
        let temp_dir = TempDir::new().unwrap();
        let repo = ExpenseRepository::new(temp_dir.path().join("expenses.json"));
        let company = CompanyId::new();
        let project = ProjectId::new();
        let date = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();

        let mut on_project = Expense::new(company, Money::from_units(10), "Material", date);
        on_project.project_id = Some(project);
        repo.upsert(on_project).unwrap();
        repo.upsert(Expense::new(company, Money::from_units(20), "Material", date))
            .unwrap();

        assert_eq!(repo.get_by_project(company, project).unwrap().len(), 1);
        assert!(repo.get_by_project(CompanyId::new(), project).unwrap().is_empty());
    }
}
