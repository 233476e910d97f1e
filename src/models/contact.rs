use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::{deserialize_flag, deserialize_optional_id, validate_not_blank, ChangeScope};

/// A contact person as delivered by the CRM.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContactRecord {
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    #[validate(required, custom(function = validate_not_blank))]
    pub contact_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    #[validate(required, custom(function = validate_not_blank))]
    pub account_id: Option<String>,
    #[serde(default)]
    pub account_name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default, alias = "phoneNo")]
    pub phone: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub cshme_flag: bool,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "crmToErpFlag", deserialize_with = "deserialize_flag")]
    pub sync_flag: bool,
}

impl ContactRecord {
    pub fn new(contact_id: impl Into<String>, account_id: impl Into<String>) -> Self {
        Self {
            contact_id: Some(contact_id.into()),
            account_id: Some(account_id.into()),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self.last_name = Some(last_name.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_sync_flag(mut self, sync_flag: bool) -> Self {
        self.sync_flag = sync_flag;
        self
    }

    pub fn with_cshme(mut self, cshme_flag: bool, status: impl Into<String>) -> Self {
        self.cshme_flag = cshme_flag;
        self.status = Some(status.into());
        self
    }

    /// Returns `(contact_id, account_id)` once both are present and non-blank.
    pub fn mandatory_fields(&self) -> Option<(&str, &str)> {
        if self.validate().is_err() {
            return None;
        }
        match (self.contact_id.as_deref(), self.account_id.as_deref()) {
            (Some(contact_id), Some(account_id)) => Some((contact_id, account_id)),
            _ => None,
        }
    }
}

/// Row of `crm_company_contacts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CrmContact {
    pub contact_id: String,
    pub account_id: String,
    pub account_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub zip_code: Option<String>,
    pub cshme_flag: bool,
    pub status: Option<String>,
    pub sync_flag: bool,
    pub erp_contact_person_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

impl CrmContact {
    pub fn differs_from(&self, record: &ContactRecord, scope: ChangeScope) -> bool {
        let propagated_changed = self.account_id.as_str() != record.account_id.as_deref().unwrap_or_default()
            || self.first_name != record.first_name
            || self.last_name != record.last_name
            || self.email != record.email
            || self.department != record.department
            || self.country != record.country
            || self.phone != record.phone
            || self.cshme_flag != record.cshme_flag
            || self.status != record.status;

        match scope {
            ChangeScope::Propagated => propagated_changed,
            ChangeScope::All => {
                propagated_changed
                    || self.account_name != record.account_name
                    || self.zip_code != record.zip_code
                    || self.sync_flag != record.sync_flag
            }
        }
    }
}
