//! Account collection
//!
//! Stored in `accounts.json`.

use chrono::{DateTime, Utc};

use crate::error::LedgerError;
use crate::models::{Account, AccountId, CompanyId};

use super::collection::{JsonCollection, Record};

impl Record for Account {
    type Id = AccountId;

    fn id(&self) -> AccountId {
        self.id
    }

    fn company_id(&self) -> CompanyId {
        self.company_id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

pub type AccountRepository = JsonCollection<Account>;

impl JsonCollection<Account> {
    /// Get a company's account by name (case-insensitive)
    pub fn get_by_name(
        &self,
        company_id: CompanyId,
        name: &str,
    ) -> Result<Option<Account>, LedgerError> {
        let name_lower = name.trim().to_lowercase();
        Ok(self
            .for_company(company_id)?
            .into_iter()
            .find(|a| a.name.to_lowercase() == name_lower))
    }

    /// Check if an account name is already taken within a company
    pub fn name_exists(&self, company_id: CompanyId, name: &str) -> Result<bool, LedgerError> {
        Ok(self.get_by_name(company_id, name)?.is_some())
    }
}
