//! Labor records
//!
//! Project labor and company labor share one shape and live in separate
//! collections. A record tracks what was agreed with a worker and how much of
//! it has been paid.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{CompanyId, EmployeeId, LaborId, ProjectId};
use super::money::Money;

/// Which labor collection a record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaborScope {
    Project,
    Company,
}

impl fmt::Display for LaborScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Project => write!(f, "ProjectLabor"),
            Self::Company => write!(f, "CompanyLabor"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaborRecord {
    pub id: LaborId,

    pub company_id: CompanyId,

    /// Set for project labor, absent for company labor
    #[serde(default)]
    pub project_id: Option<ProjectId>,

    pub employee_id: EmployeeId,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub date_worked: Option<NaiveDate>,

    pub paid_amount: Money,

    #[serde(default)]
    pub agreed_wage: Option<Money>,

    #[serde(default)]
    pub remaining_wage: Option<Money>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl LaborRecord {
    pub fn new(company_id: CompanyId, employee_id: EmployeeId, paid_amount: Money) -> Self {
        let now = Utc::now();
        Self {
            id: LaborId::new(),
            company_id,
            project_id: None,
            employee_id,
            description: None,
            date_worked: None,
            paid_amount,
            agreed_wage: None,
            remaining_wage: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a project labor record
    pub fn for_project(
        company_id: CompanyId,
        project_id: ProjectId,
        employee_id: EmployeeId,
        paid_amount: Money,
    ) -> Self {
        let mut record = Self::new(company_id, employee_id, paid_amount);
        record.project_id = Some(project_id);
        record
    }

    pub fn scope(&self) -> LaborScope {
        if self.project_id.is_some() {
            LaborScope::Project
        } else {
            LaborScope::Company
        }
    }

    /// Set the paid amount and recompute the remaining wage
    pub fn set_paid(&mut self, paid: Money) {
        self.paid_amount = paid.non_negative();
        self.recompute_remaining();
        self.updated_at = Utc::now();
    }

    pub fn set_agreed_wage(&mut self, agreed: Option<Money>) {
        self.agreed_wage = agreed;
        self.recompute_remaining();
        self.updated_at = Utc::now();
    }

    /// `remaining = max(0, agreed - paid)` whenever an agreed wage exists
    pub fn recompute_remaining(&mut self) {
        self.remaining_wage = self
            .agreed_wage
            .map(|agreed| (agreed - self.paid_amount).non_negative());
    }

    /// Ordering key for "most recent" lookups
    pub fn recency_key(&self) -> (Option<NaiveDate>, DateTime<Utc>) {
        (self.date_worked, self.created_at)
    }
}

impl fmt::Display for LaborRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} paid {}", self.scope(), self.paid_amount)?;
        if let Some(agreed) = self.agreed_wage {
            write!(f, " of {}", agreed)?;
        }
        Ok(())
    }
}
