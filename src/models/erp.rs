use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// Row of `erp_customers`. One per synchronized CRM account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ErpCustomer {
    pub customer_id: i64,
    pub crm_account_id: String,
    pub name: String,
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

/// Row of `erp_customer_contacts`, unique on `(crm_account_id, email)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ErpContact {
    pub contact_person_id: i64,
    pub customer_id: i64,
    pub crm_account_id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub department: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub cshme_flag: bool,
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

/// Entity types that receive ERP-side sequential identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IdEntity {
    CustomerId,
    ContactPersonId,
}

impl IdEntity {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdEntity::CustomerId => "customerId",
            IdEntity::ContactPersonId => "contactPersonId",
        }
    }

    pub fn table(&self) -> &'static str {
        match self {
            IdEntity::CustomerId => "erp_customers",
            IdEntity::ContactPersonId => "erp_customer_contacts",
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            IdEntity::CustomerId => "customer_id",
            IdEntity::ContactPersonId => "contact_person_id",
        }
    }
}

impl fmt::Display for IdEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
