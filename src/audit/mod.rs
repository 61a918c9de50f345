//! Audit log for ledger changes
//!
//! Every committed batch appends one entry per changed entity to a JSONL file
//! with the entity's state before and after, plus a short diff summary for
//! updates.

mod diff;
mod entry;
mod logger;

pub use diff::generate_diff;
pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
