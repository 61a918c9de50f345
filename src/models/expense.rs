//! Expense model
//!
//! An expense deducts its amount from the account it was paid from. Some
//! categories carry extra bookkeeping: salary payments feed the employee's
//! monthly accumulator and labor expenses mirror a labor record.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{AccountId, CompanyId, CustomerId, EmployeeId, ExpenseId, ProjectId};
use super::money::Money;

pub const COMPANY_EXPENSE: &str = "Company Expense";
pub const SALARY: &str = "Salary";
pub const LABOR: &str = "Labor";
pub const COMPANY_LABOR: &str = "Company Labor";

/// How an expense's category affects secondary records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpenseKind {
    /// "Company Expense" / "Salary" paid to an employee
    Salary,
    /// "Labor" booked against a project
    ProjectLabor,
    /// "Company Labor" booked against the company
    CompanyLabor,
    /// Everything else: only the account balance is affected
    General,
}

impl fmt::Display for ExpenseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Salary => write!(f, "salary"),
            Self::ProjectLabor => write!(f, "project labor"),
            Self::CompanyLabor => write!(f, "company labor"),
            Self::General => write!(f, "general"),
        }
    }
}

fn same_label(value: &str, label: &str) -> bool {
    value.trim().eq_ignore_ascii_case(label)
}

/// A recorded expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: ExpenseId,

    pub company_id: CompanyId,

    pub amount: Money,

    pub category: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Account the expense was paid from
    #[serde(default)]
    pub paid_from: Option<AccountId>,

    #[serde(default)]
    pub employee_id: Option<EmployeeId>,

    #[serde(default)]
    pub project_id: Option<ProjectId>,

    #[serde(default)]
    pub customer_id: Option<CustomerId>,

    pub expense_date: NaiveDate,

    #[serde(default)]
    pub approved: bool,

    /// Material lines attached by the purchasing UI, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub materials: Option<serde_json::Value>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Expense {
    /// Create a new expense with no account or secondary references
    pub fn new(
        company_id: CompanyId,
        amount: Money,
        category: impl Into<String>,
        expense_date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ExpenseId::new(),
            company_id,
            amount,
            category: category.into(),
            sub_category: None,
            description: None,
            paid_from: None,
            employee_id: None,
            project_id: None,
            customer_id: None,
            expense_date,
            approved: false,
            materials: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_salary(&self) -> bool {
        same_label(&self.category, COMPANY_EXPENSE)
            && self
                .sub_category
                .as_deref()
                .map(|s| same_label(s, SALARY))
                .unwrap_or(false)
            && self.employee_id.is_some()
    }

    pub fn is_project_labor(&self) -> bool {
        same_label(&self.category, LABOR)
    }

    pub fn is_company_labor(&self) -> bool {
        same_label(&self.category, COMPANY_LABOR)
    }

    pub fn kind(&self) -> ExpenseKind {
        if self.is_salary() {
            ExpenseKind::Salary
        } else if self.is_project_labor() {
            ExpenseKind::ProjectLabor
        } else if self.is_company_labor() {
            ExpenseKind::CompanyLabor
        } else {
            ExpenseKind::General
        }
    }

    /// Validate the expense
    pub fn validate(&self) -> Result<(), ExpenseValidationError> {
        if self.category.trim().is_empty() {
            return Err(ExpenseValidationError::MissingCategory);
        }

        if !self.amount.is_positive() {
            return Err(ExpenseValidationError::NonPositiveAmount(self.amount));
        }

        if !self.amount.is_within_limit() {
            return Err(ExpenseValidationError::AmountTooLarge(self.amount));
        }

        Ok(())
    }
}

impl fmt::Display for Expense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.expense_date, self.category, self.amount)
    }
}

/// Validation errors for expenses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpenseValidationError {
    MissingCategory,
    NonPositiveAmount(Money),
    AmountTooLarge(Money),
}

impl fmt::Display for ExpenseValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCategory => write!(f, "Expense category cannot be empty"),
            Self::NonPositiveAmount(amount) => {
                write!(f, "Expense amount must be positive (got {})", amount)
            }
            Self::AmountTooLarge(amount) => write!(
                f,
                "Expense amount {} exceeds the maximum of {}",
                amount,
                Money::LIMIT
            ),
        }
    }
}

impl std::error::Error for ExpenseValidationError {}
