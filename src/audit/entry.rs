//! Audit entry data structures
//!
//! An entry records one change to one ledger entity, with the JSON form of the
//! entity before and after the change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::diff::generate_diff;

/// Types of operations that can be audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Create => write!(f, "CREATE"),
            Operation::Update => write!(f, "UPDATE"),
            Operation::Delete => write!(f, "DELETE"),
        }
    }
}

/// Ledger entities that can be audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Account,
    Expense,
    Employee,
    ProjectLabor,
    CompanyLabor,
    Transaction,
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityType::Account => write!(f, "Account"),
            EntityType::Expense => write!(f, "Expense"),
            EntityType::Employee => write!(f, "Employee"),
            EntityType::ProjectLabor => write!(f, "ProjectLabor"),
            EntityType::CompanyLabor => write!(f, "CompanyLabor"),
            EntityType::Transaction => write!(f, "Transaction"),
        }
    }
}

/// A single audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// When the operation occurred (UTC)
    pub timestamp: DateTime<Utc>,

    pub operation: Operation,

    pub entity_type: EntityType,

    pub entity_id: String,

    /// Human-readable label for the entity (account name, expense category)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<serde_json::Value>,

    /// Human-readable diff summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_summary: Option<String>,
}

impl AuditEntry {
    fn with_values(
        operation: Operation,
        entity_type: EntityType,
        entity_id: String,
        entity_name: Option<String>,
        before: Option<serde_json::Value>,
        after: Option<serde_json::Value>,
    ) -> Self {
        let diff_summary = match (&before, &after) {
            (Some(b), Some(a)) => generate_diff(b, a),
            _ => None,
        };

        Self {
            timestamp: Utc::now(),
            operation,
            entity_type,
            entity_id,
            entity_name,
            before,
            after,
            diff_summary,
        }
    }

    pub fn create<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Self {
        Self::with_values(
            Operation::Create,
            entity_type,
            entity_id.into(),
            entity_name,
            None,
            serde_json::to_value(entity).ok(),
        )
    }

    /// Update entry; the diff summary is computed from the two states
    pub fn update<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: &T,
        after: &T,
    ) -> Self {
        Self::with_values(
            Operation::Update,
            entity_type,
            entity_id.into(),
            entity_name,
            serde_json::to_value(before).ok(),
            serde_json::to_value(after).ok(),
        )
    }

    pub fn delete<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Self {
        Self::with_values(
            Operation::Delete,
            entity_type,
            entity_id.into(),
            entity_name,
            serde_json::to_value(entity).ok(),
            None,
        )
    }

    /// Build the entry describing a change from `before` to `after`
    ///
    /// Returns `None` when neither state exists.
    pub fn change<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: Option<&T>,
        after: Option<&T>,
    ) -> Option<Self> {
        match (before, after) {
            (None, Some(after)) => Some(Self::create(entity_type, entity_id, entity_name, after)),
            (Some(before), Some(after)) => Some(Self::update(
                entity_type,
                entity_id,
                entity_name,
                before,
                after,
            )),
            (Some(before), None) => Some(Self::delete(entity_type, entity_id, entity_name, before)),
            (None, None) => None,
        }
    }

    /// Format the entry for human-readable output
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {} {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.operation,
            self.entity_type,
            self.entity_id
        );

        if let Some(name) = &self.entity_name {
            output.push_str(&format!(" ({})", name));
        }

        if let Some(diff) = &self.diff_summary {
            output.push_str(&format!("\n  Changes: {}", diff));
        }

        output
    }
}
