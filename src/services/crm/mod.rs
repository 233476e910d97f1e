// CRM staging sync
// Upserts CRM companies and contacts, then forwards flagged records to the ERP registrars.

pub mod company_sync;
pub mod contact_sync;

pub use company_sync::CompanySync;
pub use contact_sync::ContactSync;

use std::str::FromStr;

use crate::models::ChangeScope;
use crate::services::error::SyncError;

pub(crate) const MISSING_MANDATORY_FIELDS: &str = "Missing mandatory fields";

/// When a record with `syncFlag = true` is forwarded to the ERP side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PropagationPolicy {
    /// Every sync call forwards the record.
    #[default]
    Always,
    /// Only new records, changed records and records without an ERP id yet.
    OnChange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncPolicy {
    pub propagation: PropagationPolicy,
    pub change_scope: ChangeScope,
}

impl SyncPolicy {
    pub fn should_propagate(&self, changed: bool, already_linked: bool) -> bool {
        match self.propagation {
            PropagationPolicy::Always => true,
            PropagationPolicy::OnChange => changed || !already_linked,
        }
    }
}

impl FromStr for PropagationPolicy {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always" => Ok(PropagationPolicy::Always),
            "on_change" | "on-change" => Ok(PropagationPolicy::OnChange),
            other => Err(SyncError::Configuration(format!("unknown propagation policy: {}", other))),
        }
    }
}

impl FromStr for ChangeScope {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(ChangeScope::All),
            "propagated" => Ok(ChangeScope::Propagated),
            other => Err(SyncError::Configuration(format!("unknown change scope: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_on_change_policy() {
        let policy = SyncPolicy {
            propagation: PropagationPolicy::OnChange,
            change_scope: ChangeScope::All,
        };
        assert!(policy.should_propagate(true, true));
        assert!(policy.should_propagate(false, false));
        assert!(!policy.should_propagate(false, true));
        assert!(SyncPolicy::default().should_propagate(false, true));
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("on_change".parse::<PropagationPolicy>().unwrap(), PropagationPolicy::OnChange);
        assert_eq!("Propagated".parse::<ChangeScope>().unwrap(), ChangeScope::Propagated);
        assert!("sometimes".parse::<PropagationPolicy>().is_err());
    }
}
