//! Labor collections
//!
//! Project labor lives in `project_labor.json` and company labor in
//! `company_labor.json`; both hold [`LaborRecord`]s.

use chrono::{DateTime, Utc};

use crate::error::LedgerError;
use crate::models::{CompanyId, EmployeeId, LaborId, LaborRecord, ProjectId};

use super::collection::{JsonCollection, Record};

impl Record for LaborRecord {
    type Id = LaborId;

    fn id(&self) -> LaborId {
        self.id
    }

    fn company_id(&self) -> CompanyId {
        self.company_id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

pub type LaborRepository = JsonCollection<LaborRecord>;

impl JsonCollection<LaborRecord> {
    /// Labor on a project, optionally narrowed to one employee
    pub fn get_by_project(
        &self,
        company_id: CompanyId,
        project_id: ProjectId,
        employee_id: Option<EmployeeId>,
    ) -> Result<Vec<LaborRecord>, LedgerError> {
        self.filter(|r| {
            r.company_id == company_id
                && r.project_id == Some(project_id)
                && employee_id.map_or(true, |e| r.employee_id == e)
        })
    }

    /// The most recent record for an employee (by date worked, then creation)
    pub fn latest_for_employee(
        &self,
        company_id: CompanyId,
        employee_id: EmployeeId,
    ) -> Result<Option<LaborRecord>, LedgerError> {
        Ok(self
            .filter(|r| r.company_id == company_id && r.employee_id == employee_id)?
            .into_iter()
            .max_by_key(LaborRecord::recency_key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    #[test]
    fn test_get_by_project_filters_employee() {
        let temp_dir = TempDir::new().unwrap();
        let repo = LaborRepository::new(temp_dir.path().join("project_labor.json"));
        let company = CompanyId::new();
        let project = ProjectId::new();
        let worker = EmployeeId::new();

        repo.upsert(LaborRecord::for_project(company, project, worker, Money::from_units(100)))
            .unwrap();
        repo.upsert(LaborRecord::for_project(
            company,
            project,
            EmployeeId::new(),
            Money::from_units(50),
        ))
        .unwrap();

        assert_eq!(repo.get_by_project(company, project, None).unwrap().len(), 2);
        assert_eq!(
            repo.get_by_project(company, project, Some(worker)).unwrap().len(),
            1
        );
    }

    #[test]
    fn test_latest_for_employee_prefers_date_worked() {
        let temp_dir = TempDir::new().unwrap();
        let repo = LaborRepository::new(temp_dir.path().join("company_labor.json"));
        let company = CompanyId::new();
        let worker = EmployeeId::new();

        let mut newer = LaborRecord::new(company, worker, Money::from_units(80));
        newer.date_worked = NaiveDate::from_ymd_opt(2025, 5, 2);
        let newer_id = newer.id;
        repo.upsert(newer).unwrap();

        let mut older = LaborRecord::new(company, worker, Money::from_units(60));
        older.date_worked = NaiveDate::from_ymd_opt(2025, 5, 1);
        repo.upsert(older).unwrap();

        let latest = repo.latest_for_employee(company, worker).unwrap().unwrap();
        assert_eq!(latest.id, newer_id);
        assert!(repo
            .latest_for_employee(company, EmployeeId::new())
            .unwrap()
            .is_none());
    }
}
