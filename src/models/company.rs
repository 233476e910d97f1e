use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::{deserialize_flag, deserialize_optional_id, validate_not_blank, ChangeScope};

/// A company (account) as delivered by the CRM.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CompanyRecord {
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    #[validate(required, custom(function = validate_not_blank))]
    pub account_id: Option<String>,
    #[serde(default)]
    #[validate(required, custom(function = validate_not_blank))]
    pub account_name: Option<String>,
    #[serde(default, alias = "crmToErpFlag", deserialize_with = "deserialize_flag")]
    pub sync_flag: bool,
    #[serde(default)]
    pub status: Option<String>,
}

impl CompanyRecord {
    pub fn new(account_id: impl Into<String>, account_name: impl Into<String>) -> Self {
        Self {
            account_id: Some(account_id.into()),
            account_name: Some(account_name.into()),
            ..Self::default()
        }
    }

    pub fn with_sync_flag(mut self, sync_flag: bool) -> Self {
        self.sync_flag = sync_flag;
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Returns `(account_id, account_name)` once both are present and non-blank.
    pub fn mandatory_fields(&self) -> Option<(&str, &str)> {
        if self.validate().is_err() {
            return None;
        }
        match (self.account_id.as_deref(), self.account_name.as_deref()) {
            (Some(account_id), Some(account_name)) => Some((account_id, account_name)),
            _ => None,
        }
    }
}

/// Row of `crm_company_accounts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CrmCompany {
    pub account_id: String,
    pub account_name: String,
    pub sync_flag: bool,
    pub status: Option<String>,
    pub erp_customer_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

impl CrmCompany {
    pub fn differs_from(&self, account_name: &str, record: &CompanyRecord, scope: ChangeScope) -> bool {
        let propagated_changed = self.account_name != account_name || self.status != record.status;
        match scope {
            ChangeScope::Propagated => propagated_changed,
            ChangeScope::All => propagated_changed || self.sync_flag != record.sync_flag,
        }
    }
}
