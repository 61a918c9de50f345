//! Account service
//!
//! Creating, finding and renaming paying accounts. Balances move only through
//! ledger batches.

use crate::audit::EntityType;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Account, AccountId, CompanyId, Money};
use crate::storage::Storage;

pub struct AccountService<'a> {
    storage: &'a Storage,
}

impl<'a> AccountService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a new account with an opening balance
    pub fn create(
        &self,
        company_id: CompanyId,
        name: &str,
        currency: &str,
        opening_balance: Money,
    ) -> LedgerResult<Account> {
        let name = name.trim();
        if self.storage.accounts.name_exists(company_id, name)? {
            return Err(LedgerError::Validation(format!(
                "An account named '{}' already exists",
                name
            )));
        }

        let account = Account::with_balance(
            company_id,
            name,
            currency.trim().to_uppercase(),
            opening_balance,
        );
        account
            .validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        self.storage.accounts.upsert(account.clone())?;
        self.storage.accounts.save()?;

        self.storage.log_create(
            EntityType::Account,
            account.id.to_string(),
            Some(account.name.clone()),
            &account,
        )?;

        Ok(account)
    }

    pub fn get(&self, company_id: CompanyId, id: AccountId) -> LedgerResult<Option<Account>> {
        self.storage.accounts.get_scoped(company_id, id)
    }

    /// Find an account by name or ID string
    pub fn find(&self, company_id: CompanyId, identifier: &str) -> LedgerResult<Option<Account>> {
        if let Some(account) = self.storage.accounts.get_by_name(company_id, identifier)? {
            return Ok(Some(account));
        }

        if let Ok(id) = identifier.trim().parse::<AccountId>() {
            return self.get(company_id, id);
        }

        Ok(None)
    }

    /// Like [`find`](Self::find), failing when nothing matches
    pub fn require(&self, company_id: CompanyId, identifier: &str) -> LedgerResult<Account> {
        self.find(company_id, identifier)?
            .ok_or_else(|| LedgerError::account_not_found(identifier))
    }

    pub fn list(&self, company_id: CompanyId) -> LedgerResult<Vec<Account>> {
        let mut accounts = self.storage.accounts.for_company(company_id)?;
        accounts.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(accounts)
    }

    /// Rename an account
    pub fn rename(&self, company_id: CompanyId, id: AccountId, name: &str) -> LedgerResult<Account> {
        let before = self
            .get(company_id, id)?
            .ok_or_else(|| LedgerError::account_not_found(id.to_string()))?;

        let name = name.trim();
        if let Some(other) = self.storage.accounts.get_by_name(company_id, name)? {
            if other.id != id {
                return Err(LedgerError::Validation(format!(
                    "An account named '{}' already exists",
                    name
                )));
            }
        }

        let mut account = before.clone();
        account.name = name.to_string();
        account.updated_at = chrono::Utc::now();
        account
            .validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        self.storage.accounts.upsert(account.clone())?;
        self.storage.accounts.save()?;

        self.storage.log_update(
            EntityType::Account,
            account.id.to_string(),
            Some(account.name.clone()),
            &before,
            &account,
        )?;

        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::Operation;
    use crate::config::paths::LedgerPaths;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_create_account() {
        let (_temp_dir, storage) = create_test_storage();
        let service = AccountService::new(&storage);
        let company = CompanyId::new();

        let account = service
            .create(company, " Main Bank ", "usd", Money::from_units(1000))
            .unwrap();

        assert_eq!(account.name, "Main Bank");
        assert_eq!(account.currency, "USD");
        assert_eq!(account.balance, Money::from_units(1000));

        let audit = storage.audit().read_all().unwrap();
        assert_eq!(audit.len(), 1);
        assert_eq!(audit[0].operation, Operation::Create);
    }

    #[test]
    fn test_duplicate_name_rejected_per_company() {
        let (_temp_dir, storage) = create_test_storage();
        let service = AccountService::new(&storage);
        let company = CompanyId::new();

        service.create(company, "Cash", "USD", Money::zero()).unwrap();
        assert!(service
            .create(company, "cash", "USD", Money::zero())
            .unwrap_err()
            .is_validation());
        assert!(service
            .create(CompanyId::new(), "Cash", "USD", Money::zero())
            .is_ok());
    }

    #[test]
    fn test_find_by_name_or_id() {
        let (_temp_dir, storage) = create_test_storage();
        let service = AccountService::new(&storage);
        let company = CompanyId::new();
        let account = service.create(company, "Cash", "USD", Money::zero()).unwrap();

        assert_eq!(service.require(company, "CASH").unwrap().id, account.id);
        let by_id = service
            .find(company, &account.id.as_uuid().to_string())
            .unwrap();
        assert_eq!(by_id.map(|a| a.id), Some(account.id));
        assert!(service.require(CompanyId::new(), "Cash").unwrap_err().is_not_found());
    }

    #[test]
    fn test_rename_logs_diff() {
        let (_temp_dir, storage) = create_test_storage();
        let service = AccountService::new(&storage);
        let company = CompanyId::new();
        let account = service.create(company, "Cash", "USD", Money::zero()).unwrap();

        let renamed = service.rename(company, account.id, "Petty Cash").unwrap();
        assert_eq!(renamed.name, "Petty Cash");

        let audit = storage.audit().read_recent(1).unwrap();
        assert_eq!(audit[0].operation, Operation::Update);
        assert!(audit[0]
            .diff_summary
            .as_deref()
            .unwrap()
            .contains("name: \"Cash\" -> \"Petty Cash\""));
    }
}
