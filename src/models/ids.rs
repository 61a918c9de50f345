//! Identifiers for tenants and ledger records
//!
//! Every record is keyed by a UUID v4. JSON files and the HTTP API carry the
//! full hyphenated UUID, while terminal output shows a short tagged form such
//! as `exp-1a2b3c4d` that the CLI accepts back for lookups.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! ledger_id {
    ($(#[$doc:meta])* $name:ident, $tag:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Whether `text` is this id's short display form, ignoring case
            pub fn matches_short(&self, text: &str) -> bool {
                self.to_string().eq_ignore_ascii_case(text.trim())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let full = self.0.simple().to_string();
                write!(f, "{}{}", $tag, &full[..8])
            }
        }

        /// Accepts the full UUID, optionally behind the display tag
        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                let s = s.strip_prefix($tag).unwrap_or(s);
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

ledger_id!(
    /// Tenant scope; sent by API callers in the `x-company-id` header
    CompanyId,
    "co-"
);
ledger_id!(AccountId, "acc-");
ledger_id!(ExpenseId, "exp-");
ledger_id!(EmployeeId, "emp-");
ledger_id!(ProjectId, "prj-");
ledger_id!(CustomerId, "cus-");
ledger_id!(
    /// Project or company labor record
    LaborId,
    "lab-"
);
ledger_id!(TransactionId, "txn-");

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: &str = "550e8400-e29b-41d4-a716-446655440000";

    #[test]
    fn test_short_display_for_expense() {
        let id: ExpenseId = RAW.parse().unwrap();
        assert_eq!(id.to_string(), "exp-550e8400");
        assert!(id.matches_short("exp-550e8400"));
        assert!(id.matches_short(" EXP-550E8400 "));
        assert!(!id.matches_short("acc-550e8400"));
    }

    #[test]
    fn test_company_id_from_header_text() {
        let company: CompanyId = format!(" {} ", RAW).parse().unwrap();
        assert_eq!(company.as_uuid().to_string(), RAW);

        let tagged: CompanyId = format!("co-{}", RAW).parse().unwrap();
        assert_eq!(tagged, company);

        assert!("acme".parse::<CompanyId>().is_err());
        assert!("".parse::<CompanyId>().is_err());
    }

    #[test]
    fn test_json_carries_full_uuid() {
        let id: AccountId = RAW.parse().unwrap();
        let json = serde_json::json!({ "paidFrom": id });
        assert_eq!(json["paidFrom"], RAW);

        let back: AccountId = serde_json::from_value(json["paidFrom"].clone()).unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<AccountId>("\"nope\"").is_err());
    }

    #[test]
    fn test_short_form_is_not_a_full_id() {
        let id = LaborId::new();
        assert!(id.to_string().parse::<LaborId>().is_err());
        assert_ne!(LaborId::new(), id);
    }
}
