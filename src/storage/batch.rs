//! Transactional batch apply
//!
//! A batch is an ordered list of [`LedgerMutation`]s applied all-or-nothing.
//! Every collection is snapshotted before the first mutation; if a mutation
//! fails, or a touched collection cannot be written, the snapshots are put
//! back in memory and any file already written is rewritten from them.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{NaiveDate, Utc};
use tracing::{debug, error, warn};

use crate::audit::{AuditEntry, EntityType};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    AccountId, CompanyId, EmployeeId, Expense, ExpenseId, LaborId, LaborRecord, LaborScope, Money,
    Transaction,
};

use super::collection::CollectionSnapshot;
use super::Storage;

/// A single change to the ledger
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerMutation {
    /// Add `delta` to an account balance (negative deducts)
    IncrementBalance { account_id: AccountId, delta: Money },
    /// Move an employee's salary accumulator, optionally stamping the payment date
    AdjustSalaryPaid {
        employee_id: EmployeeId,
        delta: Money,
        last_payment_date: Option<NaiveDate>,
    },
    UpsertExpense(Box<Expense>),
    DeleteExpense(ExpenseId),
    /// Remove every transaction linked to an expense
    DeleteTransactionsForExpense(ExpenseId),
    UpsertTransaction(Transaction),
    UpsertLabor { scope: LaborScope, record: LaborRecord },
    DeleteLabor { scope: LaborScope, id: LaborId },
}

impl fmt::Display for LedgerMutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IncrementBalance { account_id, delta } => {
                write!(f, "increment {} by {}", account_id, delta)
            }
            Self::AdjustSalaryPaid {
                employee_id, delta, ..
            } => write!(f, "adjust salary of {} by {}", employee_id, delta),
            Self::UpsertExpense(expense) => write!(f, "save expense {}", expense.id),
            Self::DeleteExpense(id) => write!(f, "delete expense {}", id),
            Self::DeleteTransactionsForExpense(id) => {
                write!(f, "delete transactions of {}", id)
            }
            Self::UpsertTransaction(txn) => write!(f, "save transaction {}", txn.id),
            Self::UpsertLabor { scope, record } => write!(f, "save {} {}", scope, record.id),
            Self::DeleteLabor { scope, id } => write!(f, "delete {} {}", scope, id),
        }
    }
}

/// The collections a batch can touch, in the order they are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Collection {
    Accounts,
    Employees,
    ProjectLabor,
    CompanyLabor,
    Transactions,
    Expenses,
}

impl From<LaborScope> for Collection {
    fn from(scope: LaborScope) -> Self {
        match scope {
            LaborScope::Project => Self::ProjectLabor,
            LaborScope::Company => Self::CompanyLabor,
        }
    }
}

/// What a committed batch did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReceipt {
    pub mutations: usize,
    pub transactions_removed: usize,
    pub touched: BTreeSet<Collection>,
}

/// Contents of every collection at the start of a batch
struct StoreSnapshot {
    accounts: CollectionSnapshot<crate::models::Account>,
    expenses: CollectionSnapshot<Expense>,
    employees: CollectionSnapshot<crate::models::Employee>,
    project_labor: CollectionSnapshot<LaborRecord>,
    company_labor: CollectionSnapshot<LaborRecord>,
    transactions: CollectionSnapshot<Transaction>,
}

impl Storage {
    /// Apply `mutations` atomically on behalf of `company_id`
    ///
    /// Every entity a mutation reads must belong to the company; otherwise the
    /// batch fails with a not-found error. Audit entries are appended only
    /// after the batch is durable, and an audit failure does not undo it.
    pub fn apply_batch(
        &self,
        company_id: CompanyId,
        mutations: Vec<LedgerMutation>,
    ) -> LedgerResult<BatchReceipt> {
        let _guard = self
            .batch_lock
            .lock()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire batch lock: {}", e)))?;

        let snapshot = self.capture()?;
        let mut receipt = BatchReceipt::default();
        let mut audit = Vec::new();

        for mutation in &mutations {
            if let Err(e) = self.apply_one(company_id, mutation, &mut receipt, &mut audit) {
                error!(%mutation, error = %e, "ledger batch failed, rolling back");
                self.roll_back(snapshot, &[]);
                return Err(e);
            }
            receipt.mutations += 1;
        }

        let mut written = Vec::with_capacity(receipt.touched.len());
        for collection in receipt.touched.iter().copied() {
            if let Err(e) = self.save_collection(collection) {
                error!(?collection, error = %e, "failed to persist ledger batch, rolling back");
                self.roll_back(snapshot, &written);
                return Err(e);
            }
            written.push(collection);
        }

        debug!(
            mutations = receipt.mutations,
            touched = receipt.touched.len(),
            "ledger batch committed"
        );

        if let Err(e) = self.audit.log_batch(&audit) {
            warn!(error = %e, "failed to write audit entries for committed batch");
        }

        Ok(receipt)
    }

    fn capture(&self) -> LedgerResult<StoreSnapshot> {
        Ok(StoreSnapshot {
            accounts: self.accounts.snapshot()?,
            expenses: self.expenses.snapshot()?,
            employees: self.employees.snapshot()?,
            project_labor: self.project_labor.snapshot()?,
            company_labor: self.company_labor.snapshot()?,
            transactions: self.transactions.snapshot()?,
        })
    }

    /// Restore every collection and rewrite the files listed in `written`
    fn roll_back(&self, snapshot: StoreSnapshot, written: &[Collection]) {
        let restored = self
            .accounts
            .restore(snapshot.accounts)
            .and_then(|_| self.expenses.restore(snapshot.expenses))
            .and_then(|_| self.employees.restore(snapshot.employees))
            .and_then(|_| self.project_labor.restore(snapshot.project_labor))
            .and_then(|_| self.company_labor.restore(snapshot.company_labor))
            .and_then(|_| self.transactions.restore(snapshot.transactions));

        if let Err(e) = restored {
            error!(error = %e, "failed to restore ledger snapshot");
            return;
        }

        for collection in written {
            if let Err(e) = self.save_collection(*collection) {
                error!(?collection, error = %e, "failed to rewrite collection during rollback");
            }
        }
    }

    pub(crate) fn save_collection(&self, collection: Collection) -> LedgerResult<()> {
        match collection {
            Collection::Accounts => self.accounts.save(),
            Collection::Employees => self.employees.save(),
            Collection::ProjectLabor => self.project_labor.save(),
            Collection::CompanyLabor => self.company_labor.save(),
            Collection::Transactions => self.transactions.save(),
            Collection::Expenses => self.expenses.save(),
        }
    }

    fn apply_one(
        &self,
        company_id: CompanyId,
        mutation: &LedgerMutation,
        receipt: &mut BatchReceipt,
        audit: &mut Vec<AuditEntry>,
    ) -> LedgerResult<()> {
        match mutation {
            LedgerMutation::IncrementBalance { account_id, delta } => {
                let before = self
                    .accounts
                    .get_scoped(company_id, *account_id)?
                    .ok_or_else(|| LedgerError::account_not_found(account_id.to_string()))?;

                let mut account = before.clone();
                account.increment_balance(*delta).map_err(|_| {
                    LedgerError::Validation(format!(
                        "Balance of account {} would overflow",
                        account_id
                    ))
                })?;
                self.accounts.upsert(account.clone())?;

                audit.push(AuditEntry::update(
                    EntityType::Account,
                    account.id.to_string(),
                    Some(account.name.clone()),
                    &before,
                    &account,
                ));
                receipt.touched.insert(Collection::Accounts);
            }

            LedgerMutation::AdjustSalaryPaid {
                employee_id,
                delta,
                last_payment_date,
            } => {
                let before = self
                    .employees
                    .get_scoped(company_id, *employee_id)?
                    .ok_or_else(|| LedgerError::employee_not_found(employee_id.to_string()))?;

                let mut employee = before.clone();
                employee
                    .adjust_salary_paid(*delta, *last_payment_date)
                    .map_err(|_| {
                        LedgerError::Validation(format!(
                            "Salary paid of employee {} would overflow",
                            employee_id
                        ))
                    })?;
                self.employees.upsert(employee.clone())?;

                audit.push(AuditEntry::update(
                    EntityType::Employee,
                    employee.id.to_string(),
                    Some(employee.name.clone()),
                    &before,
                    &employee,
                ));
                receipt.touched.insert(Collection::Employees);
            }

            LedgerMutation::UpsertExpense(expense) => {
                check_company(company_id, expense.company_id, "Expense")?;
                let before = self.expenses.get_scoped(company_id, expense.id)?;
                let mut expense = (**expense).clone();
                expense.updated_at = Utc::now();
                self.expenses.upsert(expense.clone())?;

                audit.extend(AuditEntry::change(
                    EntityType::Expense,
                    expense.id.to_string(),
                    Some(expense.category.clone()),
                    before.as_ref(),
                    Some(&expense),
                ));
                receipt.touched.insert(Collection::Expenses);
            }

            LedgerMutation::DeleteExpense(id) => {
                self.expenses
                    .get_scoped(company_id, *id)?
                    .ok_or_else(|| LedgerError::expense_not_found(id.to_string()))?;
                if let Some(removed) = self.expenses.remove(*id)? {
                    audit.push(AuditEntry::delete(
                        EntityType::Expense,
                        id.to_string(),
                        Some(removed.category.clone()),
                        &removed,
                    ));
                }
                receipt.touched.insert(Collection::Expenses);
            }

            LedgerMutation::DeleteTransactionsForExpense(expense_id) => {
                let removed = self
                    .transactions
                    .remove_where(|t| t.company_id == company_id && t.expense_id == Some(*expense_id))?;

                for txn in &removed {
                    audit.push(AuditEntry::delete(
                        EntityType::Transaction,
                        txn.id.to_string(),
                        Some(txn.kind.to_string()),
                        txn,
                    ));
                }
                if !removed.is_empty() {
                    receipt.touched.insert(Collection::Transactions);
                }
                receipt.transactions_removed += removed.len();
            }

            LedgerMutation::UpsertTransaction(txn) => {
                check_company(company_id, txn.company_id, "Transaction")?;
                if let Some(account_id) = txn.account_id {
                    self.accounts
                        .get_scoped(company_id, account_id)?
                        .ok_or_else(|| LedgerError::account_not_found(account_id.to_string()))?;
                }
                let before = self.transactions.get_scoped(company_id, txn.id)?;
                self.transactions.upsert(txn.clone())?;

                audit.extend(AuditEntry::change(
                    EntityType::Transaction,
                    txn.id.to_string(),
                    Some(txn.kind.to_string()),
                    before.as_ref(),
                    Some(txn),
                ));
                receipt.touched.insert(Collection::Transactions);
            }

            LedgerMutation::UpsertLabor { scope, record } => {
                check_company(company_id, record.company_id, "Labor record")?;
                if record.scope() != *scope {
                    return Err(LedgerError::Validation(format!(
                        "Labor record {} does not belong to {}",
                        record.id, scope
                    )));
                }

                let labor = self.labor(*scope);
                let before = labor.get_scoped(company_id, record.id)?;
                let mut record = record.clone();
                record.recompute_remaining();
                labor.upsert(record.clone())?;

                audit.extend(AuditEntry::change(
                    labor_entity(*scope),
                    record.id.to_string(),
                    record.description.clone(),
                    before.as_ref(),
                    Some(&record),
                ));
                receipt.touched.insert(Collection::from(*scope));
            }

            LedgerMutation::DeleteLabor { scope, id } => {
                let labor = self.labor(*scope);
                labor
                    .get_scoped(company_id, *id)?
                    .ok_or_else(|| LedgerError::labor_not_found(id.to_string()))?;
                if let Some(removed) = labor.remove(*id)? {
                    audit.push(AuditEntry::delete(
                        labor_entity(*scope),
                        id.to_string(),
                        removed.description.clone(),
                        &removed,
                    ));
                }
                receipt.touched.insert(Collection::from(*scope));
            }
        }

        Ok(())
    }
}

fn check_company(expected: CompanyId, actual: CompanyId, entity: &str) -> LedgerResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(LedgerError::Validation(format!(
            "{} belongs to another company",
            entity
        )))
    }
}

fn labor_entity(scope: LaborScope) -> EntityType {
    match scope {
        LaborScope::Project => EntityType::ProjectLabor,
        LaborScope::Company => EntityType::CompanyLabor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::LedgerPaths;
    use crate::models::{Account, Employee, TransactionKind};
    use crate::storage::JsonCollection;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        (temp_dir, storage)
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    #[test]
    fn test_commit_persists_touched_collections() {
        let (_temp, storage) = create_test_storage();
        let company = CompanyId::new();
        let account = Account::with_balance(company, "Bank", "USD", Money::from_units(1000));
        let account_id = account.id;
        storage.accounts.upsert(account).unwrap();

        let expense = Expense::new(company, Money::from_units(200), "Material", date());
        let receipt = storage
            .apply_batch(
                company,
                vec![
                    LedgerMutation::UpsertExpense(Box::new(expense)),
                    LedgerMutation::IncrementBalance {
                        account_id,
                        delta: Money::from_units(-200),
                    },
                ],
            )
            .unwrap();

        assert_eq!(receipt.mutations, 2);
        assert!(receipt.touched.contains(&Collection::Accounts));
        assert!(receipt.touched.contains(&Collection::Expenses));

        let reloaded = JsonCollection::<Account>::new(storage.paths().accounts_file());
        reloaded.load().unwrap();
        assert_eq!(
            reloaded.get(account_id).unwrap().unwrap().balance,
            Money::from_units(800)
        );

        let audit = storage.audit().read_all().unwrap();
        assert_eq!(audit.len(), 2);
    }

    #[test]
    fn test_failed_mutation_rolls_back_memory() {
        let (_temp, storage) = create_test_storage();
        let company = CompanyId::new();
        let account = Account::with_balance(company, "Bank", "USD", Money::from_units(1000));
        let account_id = account.id;
        storage.accounts.upsert(account).unwrap();

        let result = storage.apply_batch(
            company,
            vec![
                LedgerMutation::IncrementBalance {
                    account_id,
                    delta: Money::from_units(50),
                },
                LedgerMutation::AdjustSalaryPaid {
                    employee_id: EmployeeId::new(),
                    delta: Money::from_units(-50),
                    last_payment_date: None,
                },
            ],
        );

        assert!(result.unwrap_err().is_not_found());
        let account = storage.accounts.get(account_id).unwrap().unwrap();
        assert_eq!(account.balance, Money::from_units(1000));
        assert!(storage.audit().read_all().unwrap().is_empty());
    }

    #[test]
    fn test_balance_overflow_is_validation_and_lock_survives() {
        let (_temp, storage) = create_test_storage();
        let company = CompanyId::new();
        let start = Money::from_cents(i64::MAX - 100);
        let account = Account::with_balance(company, "Bank", "USD", start);
        let account_id = account.id;
        storage.accounts.upsert(account).unwrap();

        let expense = Expense::new(company, Money::from_units(5), "Material", date());
        let result = storage.apply_batch(
            company,
            vec![
                LedgerMutation::UpsertExpense(Box::new(expense)),
                LedgerMutation::IncrementBalance {
                    account_id,
                    delta: Money::from_units(5),
                },
            ],
        );

        assert!(result.unwrap_err().is_validation());
        assert_eq!(storage.expenses.count().unwrap(), 0);
        assert_eq!(storage.accounts.get(account_id).unwrap().unwrap().balance, start);

        let receipt = storage
            .apply_batch(
                company,
                vec![LedgerMutation::IncrementBalance {
                    account_id,
                    delta: Money::from_units(-5),
                }],
            )
            .unwrap();
        assert_eq!(receipt.mutations, 1);
        assert_eq!(
            storage.accounts.get(account_id).unwrap().unwrap().balance,
            start - Money::from_units(5)
        );
    }

    #[test]
    fn test_persist_failure_rewrites_written_files() {
        let (_temp, storage) = create_test_storage();
        let company = CompanyId::new();
        let account = Account::with_balance(company, "Bank", "USD", Money::from_units(1000));
        let account_id = account.id;
        storage.accounts.upsert(account).unwrap();
        storage.accounts.save().unwrap();

        let expense_id = ExpenseId::new();
        let txn = Transaction::new(company, TransactionKind::DebtTaken, Money::from_units(5), date())
            .linked_to(expense_id);
        storage.transactions.upsert(txn).unwrap();

        // A directory where the transactions file should be makes the save fail
        std::fs::create_dir_all(storage.paths().transactions_file()).unwrap();

        let result = storage.apply_batch(
            company,
            vec![
                LedgerMutation::IncrementBalance {
                    account_id,
                    delta: Money::from_units(200),
                },
                LedgerMutation::DeleteTransactionsForExpense(expense_id),
            ],
        );

        assert!(result.is_err());
        assert_eq!(
            storage.accounts.get(account_id).unwrap().unwrap().balance,
            Money::from_units(1000)
        );
        assert_eq!(storage.transactions.count().unwrap(), 1);

        let on_disk = JsonCollection::<Account>::new(storage.paths().accounts_file());
        on_disk.load().unwrap();
        assert_eq!(
            on_disk.get(account_id).unwrap().unwrap().balance,
            Money::from_units(1000)
        );
    }

    #[test]
    fn test_other_company_is_not_found() {
        let (_temp, storage) = create_test_storage();
        let owner = CompanyId::new();
        let employee = Employee::new(owner, "Dana");
        let employee_id = employee.id;
        storage.employees.upsert(employee).unwrap();

        let result = storage.apply_batch(
            CompanyId::new(),
            vec![LedgerMutation::AdjustSalaryPaid {
                employee_id,
                delta: Money::from_units(10),
                last_payment_date: None,
            }],
        );

        assert!(result.unwrap_err().is_not_found());
    }

    #[test]
    fn test_labor_scope_mismatch_is_rejected() {
        let (_temp, storage) = create_test_storage();
        let company = CompanyId::new();
        let record = LaborRecord::new(company, EmployeeId::new(), Money::from_units(10));

        let result = storage.apply_batch(
            company,
            vec![LedgerMutation::UpsertLabor {
                scope: LaborScope::Project,
                record,
            }],
        );

        assert!(result.unwrap_err().is_validation());
        assert_eq!(storage.project_labor.count().unwrap(), 0);
    }

    #[test]
    fn test_delete_transactions_counts_removed() {
        let (_temp, storage) = create_test_storage();
        let company = CompanyId::new();
        let expense_id = ExpenseId::new();
        for _ in 0..3 {
            let txn = Transaction::new(company, TransactionKind::DebtRepaid, Money::from_units(1), date())
                .linked_to(expense_id);
            storage.transactions.upsert(txn).unwrap();
        }

        let receipt = storage
            .apply_batch(
                company,
                vec![LedgerMutation::DeleteTransactionsForExpense(expense_id)],
            )
            .unwrap();

        assert_eq!(receipt.transactions_removed, 3);
        assert_eq!(storage.transactions.count().unwrap(), 0);
    }
}
