//! Labor record reconciliation
//!
//! When a labor expense is deleted the project labor record it paid into has
//! to shrink by the same amount. Records carry no link back to the expense,
//! so the record is found by matching, trying each [`MatchStrategy`] in rank
//! order.
//!
//! Reconciliation runs after the expense delete has committed and is
//! best-effort: every failure becomes [`LaborOutcome::Warning`].

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::error::LedgerResult;
use crate::models::{to_number, CompanyId, EmployeeId, LaborId, LaborRecord, LaborScope, Money, ProjectId};
use crate::storage::{LedgerMutation, Storage};

/// Paid amounts within this distance are considered equal
const AMOUNT_TOLERANCE: f64 = 0.01;

/// A record whose paid amount drops to this or below is removed
const REMOVAL_THRESHOLD: f64 = 0.0001;

/// What the deleted expense looked like
#[derive(Debug, Clone, PartialEq)]
pub struct LaborMatchCriteria {
    pub project_id: ProjectId,
    pub employee_id: Option<EmployeeId>,
    pub amount: f64,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
}

/// Ways of picking the labor record an expense paid into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    /// Amount, description and date all agree
    Strict,
    /// Amount agrees
    AmountOnly,
    /// Oldest record for the project (and employee)
    FirstAvailable,
}

impl MatchStrategy {
    /// Strategies in the order they are tried
    pub const RANKED: [MatchStrategy; 3] = [
        MatchStrategy::Strict,
        MatchStrategy::AmountOnly,
        MatchStrategy::FirstAvailable,
    ];

    /// Pick a record from `records` (ordered oldest first)
    pub fn select<'r>(
        &self,
        records: &'r [LaborRecord],
        criteria: &LaborMatchCriteria,
    ) -> Option<&'r LaborRecord> {
        match self {
            Self::Strict => records.iter().find(|r| {
                amount_matches(r, criteria.amount)
                    && description_matches(r, criteria.description.as_deref())
                    && date_matches(r, criteria.date)
            }),
            Self::AmountOnly => records.iter().find(|r| amount_matches(r, criteria.amount)),
            Self::FirstAvailable => records.first(),
        }
    }
}

impl std::fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::AmountOnly => write!(f, "amount-only"),
            Self::FirstAvailable => write!(f, "first-available"),
        }
    }
}

fn amount_matches(record: &LaborRecord, amount: f64) -> bool {
    (to_number(Some(&record.paid_amount), 0.0) - amount).abs() < AMOUNT_TOLERANCE
}

fn description_matches(record: &LaborRecord, wanted: Option<&str>) -> bool {
    match wanted.map(str::trim).filter(|d| !d.is_empty()) {
        None => true,
        Some(wanted) => record
            .description
            .as_deref()
            .map(|d| d.trim().to_lowercase() == wanted.to_lowercase())
            .unwrap_or(false),
    }
}

fn date_matches(record: &LaborRecord, wanted: Option<NaiveDate>) -> bool {
    match wanted {
        None => true,
        Some(day) => record.date_worked == Some(day),
    }
}

/// Result of a reconciliation attempt
#[derive(Debug, Clone, PartialEq)]
pub enum LaborOutcome {
    /// The expense does not feed a labor record
    NotApplicable,
    /// No labor records for the project
    NoRecords,
    /// The matched record was shrunk
    Reduced {
        record_id: LaborId,
        strategy: MatchStrategy,
        paid: Money,
        remaining: Option<Money>,
    },
    /// The matched record was fully unwound and deleted
    Removed {
        record_id: LaborId,
        strategy: MatchStrategy,
    },
    /// Reconciliation failed; the labor record may be stale
    Warning(String),
}

impl LaborOutcome {
    pub fn warning(&self) -> Option<&str> {
        match self {
            Self::Warning(message) => Some(message),
            _ => None,
        }
    }
}

/// Planned change to a matched record
#[derive(Debug, Clone, PartialEq)]
pub struct LaborAdjustment {
    pub strategy: MatchStrategy,
    pub record: LaborRecord,
    /// `None` when the record is to be removed
    pub updated: Option<LaborRecord>,
}

/// Choose a record and compute its shrunk state
pub fn plan_adjustment(
    records: &[LaborRecord],
    criteria: &LaborMatchCriteria,
) -> Option<LaborAdjustment> {
    let (strategy, record) = MatchStrategy::RANKED
        .iter()
        .find_map(|s| s.select(records, criteria).map(|r| (*s, r)))?;

    let paid = to_number(Some(&record.paid_amount), 0.0);
    let updated_paid = (paid - criteria.amount).max(0.0);

    let updated = if updated_paid <= REMOVAL_THRESHOLD {
        None
    } else {
        let mut updated = record.clone();
        updated.set_paid(Money::from_f64(updated_paid));
        Some(updated)
    };

    Some(LaborAdjustment {
        strategy,
        record: record.clone(),
        updated,
    })
}

pub struct LaborReconciler<'a> {
    storage: &'a Storage,
}

impl<'a> LaborReconciler<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Shrink the matching project labor record, never failing
    pub fn reconcile(&self, company_id: CompanyId, criteria: &LaborMatchCriteria) -> LaborOutcome {
        match self.try_reconcile(company_id, criteria) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(
                    project_id = %criteria.project_id,
                    error = %e,
                    "labor reconciliation failed"
                );
                LaborOutcome::Warning(format!("Labor record was not adjusted: {}", e))
            }
        }
    }

    /// Shrink the matching project labor record
    pub fn try_reconcile(
        &self,
        company_id: CompanyId,
        criteria: &LaborMatchCriteria,
    ) -> LedgerResult<LaborOutcome> {
        let records = self.storage.project_labor.get_by_project(
            company_id,
            criteria.project_id,
            criteria.employee_id,
        )?;

        let Some(adjustment) = plan_adjustment(&records, criteria) else {
            debug!(project_id = %criteria.project_id, "no labor records to reconcile");
            return Ok(LaborOutcome::NoRecords);
        };

        let record_id = adjustment.record.id;
        let strategy = adjustment.strategy;

        match adjustment.updated {
            None => {
                self.storage.apply_batch(
                    company_id,
                    vec![LedgerMutation::DeleteLabor {
                        scope: LaborScope::Project,
                        id: record_id,
                    }],
                )?;
                info!(%record_id, %strategy, "labor record removed");
                Ok(LaborOutcome::Removed {
                    record_id,
                    strategy,
                })
            }
            Some(updated) => {
                let paid = updated.paid_amount;
                let remaining = updated.remaining_wage;
                self.storage.apply_batch(
                    company_id,
                    vec![LedgerMutation::UpsertLabor {
                        scope: LaborScope::Project,
                        record: updated,
                    }],
                )?;
                info!(%record_id, %strategy, %paid, "labor record reduced");
                Ok(LaborOutcome::Reduced {
                    record_id,
                    strategy,
                    paid,
                    remaining,
                })
            }
        }
    }
}
