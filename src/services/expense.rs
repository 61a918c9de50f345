//! Expense service
//!
//! Keeps an expense, the account it was paid from and its secondary records
//! consistent. Every financial change of a create, update or delete is
//! planned as a list of ledger mutations and committed in one batch; labor
//! reconciliation after a delete is best-effort and reported separately.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{error, info};

use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    to_money, Account, AccountId, AmountLike, CompanyId, CustomerId, Employee, EmployeeId,
    Expense, ExpenseId, LaborRecord, LaborScope, Money, ProjectId,
};
use crate::storage::{BatchReceipt, LedgerMutation, Storage};

use super::labor::{LaborMatchCriteria, LaborOutcome, LaborReconciler};
use super::reversal::{plan_reapplication, plan_reversal, reversal_amount};

/// Distinguish an absent field from an explicit `null`
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Input for a new expense
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseDraft {
    /// Number, numeric string or null
    #[serde(default)]
    pub amount: Option<Value>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub sub_category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub paid_from: Option<AccountId>,
    #[serde(default)]
    pub employee_id: Option<EmployeeId>,
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
    /// Defaults to today
    #[serde(default)]
    pub expense_date: Option<NaiveDate>,
    #[serde(default)]
    pub approved: bool,
    #[serde(default)]
    pub materials: Option<Value>,
    /// Agreed wage for the labor record a labor expense creates
    #[serde(default)]
    pub agreed_wage: Option<Value>,
}

/// A partial update; absent fields keep their current value
///
/// Reference fields distinguish "absent" (`None`) from "cleared"
/// (`Some(None)`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseUpdate {
    #[serde(default)]
    pub amount: Option<Value>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub sub_category: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub paid_from: Option<Option<AccountId>>,
    #[serde(default, deserialize_with = "double_option")]
    pub employee_id: Option<Option<EmployeeId>>,
    #[serde(default, deserialize_with = "double_option")]
    pub project_id: Option<Option<ProjectId>>,
    #[serde(default, deserialize_with = "double_option")]
    pub customer_id: Option<Option<CustomerId>>,
    #[serde(default)]
    pub expense_date: Option<NaiveDate>,
    #[serde(default)]
    pub approved: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub materials: Option<Option<Value>>,
    #[serde(default)]
    pub agreed_wage: Option<Value>,
}

impl ExpenseUpdate {
    /// Apply the patch to `expense`
    ///
    /// An unreadable or null amount keeps the current one. Returns the new
    /// amount only when the patch carried a readable one.
    fn apply_to(&self, expense: &mut Expense) -> Option<Money> {
        let supplied = self.amount.as_ref().filter(|v| v.as_amount().is_some());
        expense.amount = to_money(self.amount.as_ref(), expense.amount);

        if let Some(category) = &self.category {
            expense.category = category.trim().to_string();
        }
        if let Some(sub_category) = &self.sub_category {
            expense.sub_category = sub_category.clone();
        }
        if let Some(description) = &self.description {
            expense.description = description.clone();
        }
        if let Some(paid_from) = self.paid_from {
            expense.paid_from = paid_from;
        }
        if let Some(employee_id) = self.employee_id {
            expense.employee_id = employee_id;
        }
        if let Some(project_id) = self.project_id {
            expense.project_id = project_id;
        }
        if let Some(customer_id) = self.customer_id {
            expense.customer_id = customer_id;
        }
        if let Some(date) = self.expense_date {
            expense.expense_date = date;
        }
        if let Some(approved) = self.approved {
            expense.approved = approved;
        }
        if let Some(materials) = &self.materials {
            expense.materials = materials.clone();
        }

        supplied.map(|_| expense.amount)
    }
}

/// Filters for listing expenses
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    pub category: Option<String>,
    pub project_id: Option<ProjectId>,
    pub employee_id: Option<EmployeeId>,
}

impl ExpenseFilter {
    fn matches(&self, expense: &Expense) -> bool {
        self.category
            .as_deref()
            .map_or(true, |c| expense.category.trim().eq_ignore_ascii_case(c.trim()))
            && self.project_id.map_or(true, |p| expense.project_id == Some(p))
            && self.employee_id.map_or(true, |e| expense.employee_id == Some(e))
    }
}

/// An expense with its account and employee embedded
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseView {
    #[serde(flatten)]
    pub expense: Expense,
    pub paid_from_account: Option<Account>,
    pub employee: Option<Employee>,
}

/// Result of deleting an expense
#[derive(Debug, Clone)]
pub struct ExpenseDeletion {
    /// The expense as it was before deletion
    pub expense: Expense,
    pub transactions_removed: usize,
    pub labor: LaborOutcome,
}

/// Service for the expense ledger flows
pub struct ExpenseService<'a> {
    storage: &'a Storage,
}

impl<'a> ExpenseService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Get an expense owned by `company_id`
    pub fn get(&self, company_id: CompanyId, id: ExpenseId) -> LedgerResult<Expense> {
        self.storage
            .expenses
            .get_scoped(company_id, id)?
            .ok_or_else(|| LedgerError::expense_not_found(id.to_string()))
    }

    /// Find an expense by full ID or by its short display form (`exp-1a2b3c4d`)
    pub fn find(&self, company_id: CompanyId, identifier: &str) -> LedgerResult<Expense> {
        let identifier = identifier.trim();

        if let Ok(id) = identifier.parse::<ExpenseId>() {
            return self.get(company_id, id);
        }

        let matches = self
            .storage
            .expenses
            .filter(|e| e.company_id == company_id && e.id.matches_short(identifier))?;
        match matches.as_slice() {
            [expense] => Ok(expense.clone()),
            [] => Err(LedgerError::expense_not_found(identifier)),
            _ => Err(LedgerError::Validation(format!(
                "'{}' matches more than one expense; use the full ID",
                identifier
            ))),
        }
    }

    pub fn list(&self, company_id: CompanyId, filter: &ExpenseFilter) -> LedgerResult<Vec<Expense>> {
        let mut expenses = self
            .storage
            .expenses
            .filter(|e| e.company_id == company_id && filter.matches(e))?;
        expenses.sort_by(|a, b| {
            a.expense_date
                .cmp(&b.expense_date)
                .then(a.created_at.cmp(&b.created_at))
        });
        Ok(expenses)
    }

    /// Embed the paying account and employee
    pub fn expand(&self, expense: Expense) -> LedgerResult<ExpenseView> {
        let paid_from_account = match expense.paid_from {
            Some(id) => self.storage.accounts.get_scoped(expense.company_id, id)?,
            None => None,
        };
        let employee = match expense.employee_id {
            Some(id) => self.storage.employees.get_scoped(expense.company_id, id)?,
            None => None,
        };

        Ok(ExpenseView {
            expense,
            paid_from_account,
            employee,
        })
    }

    /// Record a new expense and deduct it from its account
    pub fn create(&self, company_id: CompanyId, draft: ExpenseDraft) -> LedgerResult<Expense> {
        let amount = to_money(draft.amount.as_ref(), Money::zero());
        let date = draft.expense_date.unwrap_or_else(|| Utc::now().date_naive());

        let mut expense = Expense::new(company_id, amount, draft.category.trim(), date);
        expense.sub_category = draft.sub_category;
        expense.description = draft.description;
        expense.paid_from = draft.paid_from;
        expense.employee_id = draft.employee_id;
        expense.project_id = draft.project_id;
        expense.customer_id = draft.customer_id;
        expense.approved = draft.approved;
        expense.materials = draft.materials;

        self.validate(company_id, &expense)?;

        let agreed_wage = agreed_wage_from(draft.agreed_wage.as_ref())?;
        let mut mutations = Vec::new();

        if let (true, Some(employee_id)) = (expense.is_company_labor(), expense.employee_id) {
            let mut record = LaborRecord::new(company_id, employee_id, expense.amount);
            record.description = expense.description.clone();
            record.date_worked = Some(expense.expense_date);
            record.set_agreed_wage(agreed_wage);
            expense.amount = record.paid_amount;
            mutations.push(LedgerMutation::UpsertLabor {
                scope: LaborScope::Company,
                record,
            });
        } else if let (true, Some(project_id), Some(employee_id)) = (
            expense.is_project_labor(),
            expense.project_id,
            expense.employee_id,
        ) {
            let mut record =
                LaborRecord::for_project(company_id, project_id, employee_id, expense.amount);
            record.description = expense.description.clone();
            record.date_worked = Some(expense.expense_date);
            record.set_agreed_wage(agreed_wage);
            mutations.push(LedgerMutation::UpsertLabor {
                scope: LaborScope::Project,
                record,
            });
        }

        mutations.push(LedgerMutation::UpsertExpense(Box::new(expense.clone())));
        mutations.extend(plan_reapplication(&expense));

        self.commit(company_id, expense.id, "create", mutations)?;
        info!(expense_id = %expense.id, amount = %expense.amount, kind = %expense.kind(), "expense created");

        self.get(company_id, expense.id)
    }

    /// Apply `update` to an expense, moving its financial effect atomically
    ///
    /// The old effect is reversed, the record is saved with its new values and
    /// the new effect is applied, all in one batch.
    pub fn update(
        &self,
        company_id: CompanyId,
        id: ExpenseId,
        update: ExpenseUpdate,
    ) -> LedgerResult<Expense> {
        let existing = self.get(company_id, id)?;

        let reversed = reversal_amount(self.storage, &existing)?;
        let mut mutations = plan_reversal(&existing, reversed);

        let mut expense = existing.clone();
        let new_amount = update.apply_to(&mut expense);

        if let (true, Some(employee_id)) = (expense.is_company_labor(), expense.employee_id) {
            let agreed_wage = agreed_wage_from(update.agreed_wage.as_ref())?;
            let record = self.company_labor_for(&expense, employee_id, new_amount, agreed_wage)?;
            expense.amount = record.paid_amount;
            mutations.push(LedgerMutation::UpsertLabor {
                scope: LaborScope::Company,
                record,
            });
        }

        self.validate(company_id, &expense)?;

        mutations.push(LedgerMutation::UpsertExpense(Box::new(expense.clone())));
        mutations.extend(plan_reapplication(&expense));

        self.commit(company_id, id, "update", mutations)?;
        info!(
            expense_id = %id,
            old_amount = %existing.amount,
            new_amount = %expense.amount,
            "expense updated"
        );

        self.get(company_id, id)
    }

    /// Delete an expense, undoing its financial effect
    ///
    /// Balance and salary reversal, removal of linked transactions and of the
    /// expense row commit together. Shrinking the project labor record runs
    /// afterwards and never fails the delete.
    pub fn delete(&self, company_id: CompanyId, id: ExpenseId) -> LedgerResult<ExpenseDeletion> {
        let existing = self.get(company_id, id)?;
        let amount = existing.amount.abs();
        let date = existing.expense_date;

        let reversed = reversal_amount(self.storage, &existing)?;
        let mut mutations = plan_reversal(&existing, reversed);
        mutations.push(LedgerMutation::DeleteTransactionsForExpense(id));
        mutations.push(LedgerMutation::DeleteExpense(id));

        let receipt = self.commit(company_id, id, "delete", mutations)?;

        let labor = match (existing.is_project_labor(), existing.project_id) {
            (true, Some(project_id)) => LaborReconciler::new(self.storage).reconcile(
                company_id,
                &LaborMatchCriteria {
                    project_id,
                    employee_id: existing.employee_id,
                    amount: amount.to_f64(),
                    description: existing.description.clone(),
                    date: Some(date),
                },
            ),
            _ => LaborOutcome::NotApplicable,
        };

        info!(
            expense_id = %id,
            transactions_removed = receipt.transactions_removed,
            "expense deleted"
        );

        Ok(ExpenseDeletion {
            expense: existing,
            transactions_removed: receipt.transactions_removed,
            labor,
        })
    }

    fn commit(
        &self,
        company_id: CompanyId,
        expense_id: ExpenseId,
        action: &str,
        mutations: Vec<LedgerMutation>,
    ) -> LedgerResult<BatchReceipt> {
        self.storage
            .apply_batch(company_id, mutations)
            .map_err(|e| {
                error!(expense_id = %expense_id, action, error = %e, "expense batch failed");
                e
            })
    }

    /// The company labor record an edited company labor expense pays into
    ///
    /// The employee's most recent record is reused, otherwise a new one is
    /// started. A supplied amount becomes its paid amount.
    fn company_labor_for(
        &self,
        expense: &Expense,
        employee_id: EmployeeId,
        amount: Option<Money>,
        agreed_wage: Option<Money>,
    ) -> LedgerResult<LaborRecord> {
        let mut record = match self
            .storage
            .company_labor
            .latest_for_employee(expense.company_id, employee_id)?
        {
            Some(record) => record,
            None => LaborRecord::new(expense.company_id, employee_id, expense.amount),
        };

        if let Some(amount) = amount {
            record.set_paid(amount);
        }
        if agreed_wage.is_some() {
            record.set_agreed_wage(agreed_wage);
        }
        if expense.description.is_some() {
            record.description = expense.description.clone();
        }
        record.date_worked = Some(expense.expense_date);

        Ok(record)
    }

    fn validate(&self, company_id: CompanyId, expense: &Expense) -> LedgerResult<()> {
        expense
            .validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        if let Some(account_id) = expense.paid_from {
            if self.storage.accounts.get_scoped(company_id, account_id)?.is_none() {
                return Err(LedgerError::Validation(format!(
                    "Account {} does not exist",
                    account_id
                )));
            }
        }

        if let Some(employee_id) = expense.employee_id {
            if self.storage.employees.get_scoped(company_id, employee_id)?.is_none() {
                return Err(LedgerError::Validation(format!(
                    "Employee {} does not exist",
                    employee_id
                )));
            }
        }

        Ok(())
    }
}

fn agreed_wage_from(value: Option<&Value>) -> LedgerResult<Option<Money>> {
    let Some(value) = value else {
        return Ok(None);
    };
    let wage = to_money(Some(value), Money::zero());
    if wage.is_negative() || !wage.is_within_limit() {
        return Err(LedgerError::Validation(format!(
            "Agreed wage {} is out of range",
            wage
        )));
    }
    Ok(Some(wage))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::LedgerPaths;
    use crate::models::{Transaction, TransactionKind};
    use serde_json::json;
    use tempfile::TempDir;

    struct Fixture {
        _temp: TempDir,
        storage: Storage,
        company: CompanyId,
    }

    impl Fixture {
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            let storage = Storage::new(LedgerPaths::with_base_dir(temp.path().to_path_buf())).unwrap();
            Self {
                _temp: temp,
                storage,
                company: CompanyId::new(),
            }
        }

        fn service(&self) -> ExpenseService<'_> {
            ExpenseService::new(&self.storage)
        }

        fn account(&self, balance: i64) -> AccountId {
            let account =
                Account::with_balance(self.company, "Bank", "USD", Money::from_units(balance));
            let id = account.id;
            self.storage.accounts.upsert(account).unwrap();
            id
        }

        fn employee(&self, salary_paid: i64) -> EmployeeId {
            let mut employee = Employee::new(self.company, "Dana");
            employee.salary_paid_this_month = Money::from_units(salary_paid);
            let id = employee.id;
            self.storage.employees.upsert(employee).unwrap();
            id
        }

        fn balance(&self, id: AccountId) -> Money {
            self.storage.accounts.get(id).unwrap().unwrap().balance
        }

        fn salary_paid(&self, id: EmployeeId) -> Money {
            self.storage
                .employees
                .get(id)
                .unwrap()
                .unwrap()
                .salary_paid_this_month
        }

        /// Store an expense as if it had been recorded earlier
        fn existing(&self, expense: Expense) -> ExpenseId {
            let id = expense.id;
            self.storage.expenses.upsert(expense).unwrap();
            id
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 20).unwrap()
    }

    fn draft(amount: Value, category: &str) -> ExpenseDraft {
        ExpenseDraft {
            amount: Some(amount),
            category: category.to_string(),
            expense_date: Some(date()),
            ..ExpenseDraft::default()
        }
    }

    #[test]
    fn test_create_then_delete_restores_balance() {
        let fx = Fixture::new();
        let bank = fx.account(1000);

        let expense = fx
            .service()
            .create(
                fx.company,
                ExpenseDraft {
                    paid_from: Some(bank),
                    ..draft(json!(200), "Material")
                },
            )
            .unwrap();
        assert_eq!(fx.balance(bank), Money::from_units(800));

        let deletion = fx.service().delete(fx.company, expense.id).unwrap();
        assert_eq!(fx.balance(bank), Money::from_units(1000));
        assert_eq!(deletion.labor, LaborOutcome::NotApplicable);
        assert!(fx.storage.expenses.get(expense.id).unwrap().is_none());
    }

    #[test]
    fn test_delete_credits_exact_amount() {
        let fx = Fixture::new();
        let bank = fx.account(73);
        let mut expense = Expense::new(fx.company, Money::from_cents(12_345), "Fuel", date());
        expense.paid_from = Some(bank);
        let id = fx.existing(expense);

        fx.service().delete(fx.company, id).unwrap();

        assert_eq!(fx.balance(bank), Money::from_cents(7_300 + 12_345));
    }

    #[test]
    fn test_salary_create_and_delete_cancel_out() {
        let fx = Fixture::new();
        let worker = fx.employee(500);

        let expense = fx
            .service()
            .create(
                fx.company,
                ExpenseDraft {
                    sub_category: Some("Salary".into()),
                    employee_id: Some(worker),
                    ..draft(json!("250.50"), "Company Expense")
                },
            )
            .unwrap();
        assert_eq!(fx.salary_paid(worker), Money::from_cents(75_050));
        assert_eq!(
            fx.storage.employees.get(worker).unwrap().unwrap().last_payment_date,
            Some(date())
        );

        fx.service().delete(fx.company, expense.id).unwrap();
        assert_eq!(fx.salary_paid(worker), Money::from_units(500));
    }

    #[test]
    fn test_salary_update_moves_accumulator() {
        let fx = Fixture::new();
        let worker = fx.employee(500);
        let mut expense = Expense::new(fx.company, Money::from_units(300), "Company Expense", date());
        expense.sub_category = Some("Salary".into());
        expense.employee_id = Some(worker);
        let id = fx.existing(expense);

        let updated = fx
            .service()
            .update(
                fx.company,
                id,
                ExpenseUpdate {
                    amount: Some(json!(450)),
                    ..ExpenseUpdate::default()
                },
            )
            .unwrap();

        assert_eq!(updated.amount, Money::from_units(450));
        assert_eq!(fx.salary_paid(worker), Money::from_units(650));
    }

    #[test]
    fn test_update_moves_deduction_between_accounts() {
        let fx = Fixture::new();
        let old_bank = fx.account(800);
        let new_bank = fx.account(500);
        let mut expense = Expense::new(fx.company, Money::from_units(200), "Material", date());
        expense.paid_from = Some(old_bank);
        let id = fx.existing(expense);

        let update: ExpenseUpdate =
            serde_json::from_value(json!({"amount": "$150", "paidFrom": new_bank})).unwrap();
        fx.service().update(fx.company, id, update).unwrap();

        assert_eq!(fx.balance(old_bank), Money::from_units(1000));
        assert_eq!(fx.balance(new_bank), Money::from_units(350));
    }

    #[test]
    fn test_update_clearing_account_only_reverses() {
        let fx = Fixture::new();
        let bank = fx.account(800);
        let mut expense = Expense::new(fx.company, Money::from_units(200), "Material", date());
        expense.paid_from = Some(bank);
        let id = fx.existing(expense);

        let update: ExpenseUpdate = serde_json::from_value(json!({"paidFrom": null})).unwrap();
        let updated = fx.service().update(fx.company, id, update).unwrap();

        assert!(updated.paid_from.is_none());
        assert_eq!(updated.amount, Money::from_units(200));
        assert_eq!(fx.balance(bank), Money::from_units(1000));
    }

    #[test]
    fn test_update_with_unreadable_amount_keeps_amount() {
        let fx = Fixture::new();
        let bank = fx.account(800);
        let mut expense = Expense::new(fx.company, Money::from_units(200), "Material", date());
        expense.paid_from = Some(bank);
        let id = fx.existing(expense);

        let update: ExpenseUpdate =
            serde_json::from_value(json!({"amount": "n/a", "description": "bricks"})).unwrap();
        let updated = fx.service().update(fx.company, id, update).unwrap();

        assert_eq!(updated.amount, Money::from_units(200));
        assert_eq!(updated.description.as_deref(), Some("bricks"));
        assert_eq!(fx.balance(bank), Money::from_units(800));
    }

    #[test]
    fn test_update_company_labor_follows_labor_record() {
        let fx = Fixture::new();
        let bank = fx.account(1000);
        let worker = fx.employee(0);

        let expense = fx
            .service()
            .create(
                fx.company,
                ExpenseDraft {
                    paid_from: Some(bank),
                    employee_id: Some(worker),
                    agreed_wage: Some(json!(500)),
                    ..draft(json!(120), "Company Labor")
                },
            )
            .unwrap();
        assert_eq!(fx.balance(bank), Money::from_units(880));

        let update: ExpenseUpdate = serde_json::from_value(json!({"amount": 200})).unwrap();
        let updated = fx.service().update(fx.company, expense.id, update).unwrap();

        assert_eq!(updated.amount, Money::from_units(200));
        assert_eq!(fx.balance(bank), Money::from_units(800));

        let records = fx.storage.company_labor.for_company(fx.company).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].paid_amount, Money::from_units(200));
        assert_eq!(records[0].remaining_wage, Some(Money::from_units(300)));
    }

    #[test]
    fn test_company_labor_update_without_amount_uses_latest_record() {
        let fx = Fixture::new();
        let bank = fx.account(910);
        let worker = fx.employee(0);

        let mut older = LaborRecord::new(fx.company, worker, Money::from_units(40));
        older.date_worked = NaiveDate::from_ymd_opt(2025, 4, 1);
        fx.storage.company_labor.upsert(older).unwrap();
        let mut latest = LaborRecord::new(fx.company, worker, Money::from_units(90));
        latest.date_worked = Some(date());
        let latest_id = latest.id;
        fx.storage.company_labor.upsert(latest).unwrap();

        let mut expense = Expense::new(fx.company, Money::from_units(100), "Company Labor", date());
        expense.paid_from = Some(bank);
        expense.employee_id = Some(worker);
        let id = fx.existing(expense);

        let update: ExpenseUpdate =
            serde_json::from_value(json!({"description": "week 21"})).unwrap();
        let updated = fx.service().update(fx.company, id, update).unwrap();

        assert_eq!(updated.amount, Money::from_units(90));
        assert_eq!(fx.balance(bank), Money::from_units(910));

        let record = fx.storage.company_labor.get(latest_id).unwrap().unwrap();
        assert_eq!(record.paid_amount, Money::from_units(90));
        assert_eq!(record.description.as_deref(), Some("week 21"));
        assert_eq!(fx.storage.company_labor.count().unwrap(), 2);
    }

    #[test]
    fn test_company_labor_delete_reverses_labor_paid_amount() {
        let fx = Fixture::new();
        let bank = fx.account(1000);
        let worker = fx.employee(0);

        let mut record = LaborRecord::new(fx.company, worker, Money::from_units(90));
        record.date_worked = Some(date());
        fx.storage.company_labor.upsert(record).unwrap();

        let mut expense = Expense::new(fx.company, Money::from_units(100), "Company Labor", date());
        expense.paid_from = Some(bank);
        expense.employee_id = Some(worker);
        let id = fx.existing(expense);

        fx.service().delete(fx.company, id).unwrap();

        assert_eq!(fx.balance(bank), Money::from_units(1090));
    }

    #[test]
    fn test_delete_shrinks_matching_project_labor() {
        let fx = Fixture::new();
        let worker = fx.employee(0);
        let project = ProjectId::new();

        let mut record = LaborRecord::for_project(fx.company, project, worker, Money::from_units(100));
        record.description = Some("Tiling".into());
        record.date_worked = Some(date());
        record.set_agreed_wage(Some(Money::from_units(400)));
        let record_id = record.id;
        fx.storage.project_labor.upsert(record).unwrap();

        let mut expense = Expense::new(fx.company, Money::from_units(100), "labor", date());
        expense.employee_id = Some(worker);
        expense.project_id = Some(project);
        expense.description = Some("tiling ".into());
        let id = fx.existing(expense);

        let deletion = fx.service().delete(fx.company, id).unwrap();

        assert!(matches!(deletion.labor, LaborOutcome::Removed { .. }));
        assert!(fx.storage.project_labor.get(record_id).unwrap().is_none());
    }

    #[test]
    fn test_labor_create_and_delete_round_trip() {
        let fx = Fixture::new();
        let bank = fx.account(1000);
        let worker = fx.employee(0);
        let project = ProjectId::new();

        let expense = fx
            .service()
            .create(
                fx.company,
                ExpenseDraft {
                    paid_from: Some(bank),
                    employee_id: Some(worker),
                    project_id: Some(project),
                    description: Some("Drywall".into()),
                    ..draft(json!(75), "Labor")
                },
            )
            .unwrap();
        assert_eq!(fx.storage.project_labor.count().unwrap(), 1);

        let deletion = fx.service().delete(fx.company, expense.id).unwrap();

        assert!(matches!(
            deletion.labor,
            LaborOutcome::Removed {
                strategy: crate::services::labor::MatchStrategy::Strict,
                ..
            }
        ));
        assert_eq!(fx.storage.project_labor.count().unwrap(), 0);
        assert_eq!(fx.balance(bank), Money::from_units(1000));
    }

    #[test]
    fn test_delete_without_account_touches_nothing() {
        let fx = Fixture::new();
        let bank = fx.account(1000);
        let id = fx.existing(Expense::new(fx.company, Money::from_units(40), "Misc", date()));

        let deletion = fx.service().delete(fx.company, id).unwrap();

        assert_eq!(deletion.transactions_removed, 0);
        assert_eq!(fx.balance(bank), Money::from_units(1000));
    }

    #[test]
    fn test_delete_removes_linked_transactions() {
        let fx = Fixture::new();
        let id = fx.existing(Expense::new(fx.company, Money::from_units(40), "Misc", date()));
        for kind in [TransactionKind::DebtTaken, TransactionKind::DebtRepaid] {
            let txn = Transaction::new(fx.company, kind, Money::from_units(20), date()).linked_to(id);
            fx.storage.transactions.upsert(txn).unwrap();
        }
        fx.storage
            .transactions
            .upsert(Transaction::new(fx.company, TransactionKind::Deposit, Money::from_units(5), date()))
            .unwrap();

        let deletion = fx.service().delete(fx.company, id).unwrap();

        assert_eq!(deletion.transactions_removed, 2);
        assert_eq!(fx.storage.transactions.count().unwrap(), 1);
    }

    #[test]
    fn test_failed_delete_leaves_ledger_unchanged() {
        let fx = Fixture::new();
        let bank = fx.account(1000);
        let worker = fx.employee(500);
        let mut expense = Expense::new(fx.company, Money::from_units(300), "Company Expense", date());
        expense.sub_category = Some("Salary".into());
        expense.employee_id = Some(worker);
        expense.paid_from = Some(bank);
        let id = fx.existing(expense);
        let txn = Transaction::new(fx.company, TransactionKind::DebtTaken, Money::from_units(1), date())
            .linked_to(id);
        fx.storage.transactions.upsert(txn).unwrap();

        // Writing the transactions file fails mid-commit
        std::fs::create_dir_all(fx.storage.paths().transactions_file()).unwrap();

        assert!(fx.service().delete(fx.company, id).is_err());
        assert_eq!(fx.balance(bank), Money::from_units(1000));
        assert_eq!(fx.salary_paid(worker), Money::from_units(500));
        assert!(fx.storage.expenses.get(id).unwrap().is_some());
        assert_eq!(fx.storage.transactions.count().unwrap(), 1);
    }

    #[test]
    fn test_other_company_cannot_see_expense() {
        let fx = Fixture::new();
        let id = fx.existing(Expense::new(fx.company, Money::from_units(40), "Misc", date()));
        let stranger = CompanyId::new();

        assert!(fx.service().get(stranger, id).unwrap_err().is_not_found());
        assert!(fx.service().delete(stranger, id).unwrap_err().is_not_found());
        assert!(fx
            .service()
            .update(stranger, id, ExpenseUpdate::default())
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_create_validation() {
        let fx = Fixture::new();

        let err = fx.service().create(fx.company, draft(json!(null), "Material")).unwrap_err();
        assert!(err.is_validation());

        let err = fx.service().create(fx.company, draft(json!(10), "  ")).unwrap_err();
        assert!(err.is_validation());

        let err = fx
            .service()
            .create(
                fx.company,
                ExpenseDraft {
                    paid_from: Some(AccountId::new()),
                    ..draft(json!(10), "Material")
                },
            )
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(fx.storage.expenses.count().unwrap(), 0);
    }

    #[test]
    fn test_huge_amount_is_rejected_and_ledger_stays_usable() {
        let fx = Fixture::new();
        let bank = fx.account(1000);

        let err = fx
            .service()
            .create(
                fx.company,
                ExpenseDraft {
                    paid_from: Some(bank),
                    ..draft(json!(1e300), "Material")
                },
            )
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(fx.balance(bank), Money::from_units(1000));

        let err = fx
            .service()
            .create(
                fx.company,
                ExpenseDraft {
                    paid_from: Some(bank),
                    employee_id: Some(fx.employee(0)),
                    agreed_wage: Some(json!(1e300)),
                    ..draft(json!(10), "Company Labor")
                },
            )
            .unwrap_err();
        assert!(err.is_validation());

        fx.service()
            .create(
                fx.company,
                ExpenseDraft {
                    paid_from: Some(bank),
                    ..draft(json!("5.00"), "Material")
                },
            )
            .unwrap();
        assert_eq!(fx.balance(bank), Money::from_units(995));
        assert_eq!(fx.storage.expenses.count().unwrap(), 1);
    }

    #[test]
    fn test_update_to_huge_amount_keeps_balance() {
        let fx = Fixture::new();
        let bank = fx.account(1000);
        let expense = fx
            .service()
            .create(
                fx.company,
                ExpenseDraft {
                    paid_from: Some(bank),
                    ..draft(json!(200), "Material")
                },
            )
            .unwrap();

        let update: ExpenseUpdate = serde_json::from_value(json!({"amount": 1e300})).unwrap();
        let err = fx.service().update(fx.company, expense.id, update).unwrap_err();

        assert!(err.is_validation());
        assert_eq!(fx.balance(bank), Money::from_units(800));
        let stored = fx.storage.expenses.get(expense.id).unwrap().unwrap();
        assert_eq!(stored.amount, Money::from_units(200));
    }

    #[test]
    fn test_find_by_short_id() {
        let fx = Fixture::new();
        let id = fx.existing(Expense::new(fx.company, Money::from_units(40), "Misc", date()));

        assert_eq!(fx.service().find(fx.company, &id.to_string()).unwrap().id, id);
        assert_eq!(
            fx.service()
                .find(fx.company, &id.as_uuid().to_string())
                .unwrap()
                .id,
            id
        );
        assert!(fx.service().find(fx.company, "exp-00000000").is_err());
    }

    #[test]
    fn test_list_filters_and_expand() {
        let fx = Fixture::new();
        let bank = fx.account(100);
        let mut material = Expense::new(fx.company, Money::from_units(10), "Material", date());
        material.paid_from = Some(bank);
        fx.existing(material);
        fx.existing(Expense::new(fx.company, Money::from_units(20), "Fuel", date()));
        fx.existing(Expense::new(CompanyId::new(), Money::from_units(30), "Material", date()));

        let filter = ExpenseFilter {
            category: Some("material".into()),
            ..ExpenseFilter::default()
        };
        let found = fx.service().list(fx.company, &filter).unwrap();
        assert_eq!(found.len(), 1);

        let view = fx.service().expand(found[0].clone()).unwrap();
        assert_eq!(view.paid_from_account.map(|a| a.id), Some(bank));

        let json = serde_json::to_value(
            fx.service()
                .expand(found[0].clone())
                .unwrap(),
        )
        .unwrap();
        assert_eq!(json["category"], "Material");
        assert_eq!(json["paidFromAccount"]["name"], "Bank");
        assert!(json["employee"].is_null());
    }
}
