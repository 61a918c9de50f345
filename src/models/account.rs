//! Account model
//!
//! Represents a paying account (bank, cash box, card) whose balance is a
//! running accumulator mutated by expenses and transactions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{AccountId, CompanyId};
use super::money::{Money, MoneyOverflow};

/// A company account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: AccountId,

    /// Owning company (tenant)
    pub company_id: CompanyId,

    pub name: String,

    /// Current balance; no negative-balance enforcement at this layer
    pub balance: Money,

    /// ISO currency code
    pub currency: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account with a zero balance
    pub fn new(company_id: CompanyId, name: impl Into<String>, currency: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: AccountId::new(),
            company_id,
            name: name.into(),
            balance: Money::zero(),
            currency: currency.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a new account with an opening balance
    pub fn with_balance(
        company_id: CompanyId,
        name: impl Into<String>,
        currency: impl Into<String>,
        balance: Money,
    ) -> Self {
        let mut account = Self::new(company_id, name, currency);
        account.balance = balance;
        account
    }

    /// Add `delta` to the balance (negative deltas deduct)
    ///
    /// The balance is left unchanged if it would overflow.
    pub fn increment_balance(&mut self, delta: Money) -> Result<(), MoneyOverflow> {
        self.balance = self.balance.checked_add(delta)?;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Validate the account
    pub fn validate(&self) -> Result<(), AccountValidationError> {
        if self.name.trim().is_empty() {
            return Err(AccountValidationError::EmptyName);
        }

        if self.name.len() > 100 {
            return Err(AccountValidationError::NameTooLong(self.name.len()));
        }

        if self.currency.trim().is_empty() {
            return Err(AccountValidationError::MissingCurrency);
        }

        if !self.balance.is_within_limit() {
            return Err(AccountValidationError::BalanceOutOfRange(self.balance));
        }

        Ok(())
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.currency)
    }
}

/// Validation errors for accounts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountValidationError {
    EmptyName,
    NameTooLong(usize),
    MissingCurrency,
    BalanceOutOfRange(Money),
}

impl fmt::Display for AccountValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Account name cannot be empty"),
            Self::NameTooLong(len) => {
                write!(f, "Account name too long ({} chars, max 100)", len)
            }
            Self::MissingCurrency => write!(f, "Account currency cannot be empty"),
            Self::BalanceOutOfRange(balance) => {
                write!(f, "Account balance out of range ({})", balance)
            }
        }
    }
}

impl std::error::Error for AccountValidationError {}
