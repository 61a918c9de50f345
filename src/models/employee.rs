//! Employee model
//!
//! Only the salary accumulator matters to the ledger; it moves exclusively
//! through salary-payment expenses.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{CompanyId, EmployeeId};
use super::money::{Money, MoneyOverflow};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: EmployeeId,

    pub company_id: CompanyId,

    pub name: String,

    /// Salary paid out in the current month
    #[serde(default)]
    pub salary_paid_this_month: Money,

    #[serde(default)]
    pub last_payment_date: Option<NaiveDate>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Employee {
    pub fn new(company_id: CompanyId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: EmployeeId::new(),
            company_id,
            name: name.into(),
            salary_paid_this_month: Money::zero(),
            last_payment_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Move the salary accumulator by `delta`, stamping the payment date when given
    pub fn adjust_salary_paid(
        &mut self,
        delta: Money,
        payment_date: Option<NaiveDate>,
    ) -> Result<(), MoneyOverflow> {
        self.salary_paid_this_month = self.salary_paid_this_month.checked_add(delta)?;
        if let Some(date) = payment_date {
            self.last_payment_date = Some(date);
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjust_salary_paid() {
        let mut employee = Employee::new(CompanyId::new(), "Dana");
        employee.adjust_salary_paid(Money::from_units(500), None).unwrap();
        assert_eq!(employee.salary_paid_this_month, Money::from_units(500));
        assert!(employee.last_payment_date.is_none());

        let paid_on = NaiveDate::from_ymd_opt(2025, 4, 30).unwrap();
        employee
            .adjust_salary_paid(Money::from_units(-300), Some(paid_on))
            .unwrap();
        assert_eq!(employee.salary_paid_this_month, Money::from_units(200));
        assert_eq!(employee.last_payment_date, Some(paid_on));
    }

    #[test]
    fn test_salary_overflow_is_rejected() {
        let mut employee = Employee::new(CompanyId::new(), "Dana");
        employee.salary_paid_this_month = Money::from_cents(i64::MAX);

        let paid_on = NaiveDate::from_ymd_opt(2025, 4, 30);
        assert_eq!(
            employee.adjust_salary_paid(Money::from_cents(1), paid_on),
            Err(MoneyOverflow)
        );
        assert!(employee.last_payment_date.is_none());
    }
}
