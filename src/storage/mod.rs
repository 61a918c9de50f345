//! Storage layer for the expense ledger
//!
//! One JSON file per collection with atomic writes, plus the batch primitive
//! that keeps multi-collection changes all-or-nothing.

pub mod accounts;
pub mod batch;
pub mod collection;
pub mod employees;
pub mod expenses;
pub mod file_io;
pub mod init;
pub mod labor;
pub mod transactions;

pub use accounts::AccountRepository;
pub use batch::{BatchReceipt, Collection, LedgerMutation};
pub use collection::{JsonCollection, Record};
pub use employees::EmployeeRepository;
pub use expenses::ExpenseRepository;
pub use file_io::{read_json, write_json_atomic};
pub use init::initialize_storage;
pub use labor::LaborRepository;
pub use transactions::TransactionRepository;

use std::sync::Mutex;

use serde::Serialize;

use crate::audit::{AuditEntry, AuditLogger, EntityType};
use crate::config::paths::LedgerPaths;
use crate::error::LedgerError;
use crate::models::LaborScope;

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: LedgerPaths,
    pub accounts: AccountRepository,
    pub expenses: ExpenseRepository,
    pub employees: EmployeeRepository,
    pub project_labor: LaborRepository,
    pub company_labor: LaborRepository,
    pub transactions: TransactionRepository,
    audit: AuditLogger,
    batch_lock: Mutex<()>,
}

impl Storage {
    /// Create a new Storage instance
    pub fn new(paths: LedgerPaths) -> Result<Self, LedgerError> {
        paths.ensure_directories()?;

        Ok(Self {
            accounts: AccountRepository::new(paths.accounts_file()),
            expenses: ExpenseRepository::new(paths.expenses_file()),
            employees: EmployeeRepository::new(paths.employees_file()),
            project_labor: LaborRepository::new(paths.project_labor_file()),
            company_labor: LaborRepository::new(paths.company_labor_file()),
            transactions: TransactionRepository::new(paths.transactions_file()),
            audit: AuditLogger::new(paths.audit_log()),
            batch_lock: Mutex::new(()),
            paths,
        })
    }

    /// Create a Storage instance and load every collection from disk
    pub fn open(paths: LedgerPaths) -> Result<Self, LedgerError> {
        let storage = Self::new(paths)?;
        storage.load_all()?;
        Ok(storage)
    }

    pub fn paths(&self) -> &LedgerPaths {
        &self.paths
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// The labor collection for `scope`
    pub fn labor(&self, scope: LaborScope) -> &LaborRepository {
        match scope {
            LaborScope::Project => &self.project_labor,
            LaborScope::Company => &self.company_labor,
        }
    }

    /// Load all data from disk
    pub fn load_all(&self) -> Result<(), LedgerError> {
        self.accounts.load()?;
        self.expenses.load()?;
        self.employees.load()?;
        self.project_labor.load()?;
        self.company_labor.load()?;
        self.transactions.load()?;
        Ok(())
    }

    /// Save all data to disk
    pub fn save_all(&self) -> Result<(), LedgerError> {
        self.accounts.save()?;
        self.expenses.save()?;
        self.employees.save()?;
        self.project_labor.save()?;
        self.company_labor.save()?;
        self.transactions.save()?;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }

    /// Record the creation of an entity written outside a batch
    pub fn log_create<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: String,
        entity_name: Option<String>,
        entity: &T,
    ) -> Result<(), LedgerError> {
        self.audit
            .log(&AuditEntry::create(entity_type, entity_id, entity_name, entity))
    }

    /// Record an update of an entity written outside a batch
    pub fn log_update<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: String,
        entity_name: Option<String>,
        before: &T,
        after: &T,
    ) -> Result<(), LedgerError> {
        self.audit.log(&AuditEntry::update(
            entity_type,
            entity_id,
            entity_name,
            before,
            after,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Account, CompanyId, Money};
    use tempfile::TempDir;

    #[test]
    fn test_storage_creation() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();

        assert!(temp_dir.path().join("data").exists());
        assert!(!storage.is_initialized());
    }

    #[test]
    fn test_save_all_and_open() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths.clone()).unwrap();
        let account = Account::with_balance(CompanyId::new(), "Cash", "USD", Money::from_units(25));
        let id = account.id;
        storage.accounts.upsert(account).unwrap();
        storage.save_all().unwrap();

        let reopened = Storage::open(paths).unwrap();
        assert_eq!(
            reopened.accounts.get(id).unwrap().unwrap().balance,
            Money::from_units(25)
        );
        assert!(reopened.paths().expenses_file().exists());
    }
}
