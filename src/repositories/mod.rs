pub mod crm_repo;
pub mod erp_repo;
pub mod memory_repo;

pub use crm_repo::*;
pub use erp_repo::*;
pub use memory_repo::*;

use async_trait::async_trait;

use crate::models::{CrmCompany, CrmContact, ErpContact, ErpCustomer, IdEntity};
use crate::services::error::Result;

/// CRM staging tables: companies keyed by account id, contacts keyed by contact id.
#[async_trait]
pub trait CrmRepository: Send + Sync {
    async fn find_company(&self, account_id: &str) -> Result<Option<CrmCompany>>;
    async fn insert_company(&self, company: &CrmCompany) -> Result<()>;
    async fn update_company(&self, company: &CrmCompany) -> Result<()>;
    async fn set_company_customer_id(&self, account_id: &str, customer_id: i64) -> Result<()>;

    async fn find_contact(&self, contact_id: &str) -> Result<Option<CrmContact>>;
    async fn insert_contact(&self, contact: &CrmContact) -> Result<()>;
    async fn update_contact(&self, contact: &CrmContact) -> Result<()>;
    async fn set_contact_person_id(&self, contact_id: &str, contact_person_id: i64) -> Result<()>;
}

/// ERP staging tables: customers keyed by CRM account id, contacts keyed by
/// `(crm_account_id, email)`.
#[async_trait]
pub trait ErpRepository: Send + Sync {
    async fn find_customer(&self, crm_account_id: &str) -> Result<Option<ErpCustomer>>;
    async fn insert_customer(&self, customer: &ErpCustomer) -> Result<()>;
    async fn update_customer(&self, customer: &ErpCustomer) -> Result<()>;

    async fn find_customer_contact(&self, crm_account_id: &str, email: &str) -> Result<Option<ErpContact>>;
    async fn insert_customer_contact(&self, contact: &ErpContact) -> Result<()>;
    async fn update_customer_contact(&self, contact: &ErpContact) -> Result<()>;
}

/// Backing storage for the id allocators.
#[async_trait]
pub trait IdSequenceRepository: Send + Sync {
    /// Largest identifier currently stored for `entity`, in its stored text form.
    async fn current_max_id(&self, entity: IdEntity) -> Result<Option<String>>;

    /// Atomically advances the counter for `entity` and returns the new value.
    /// The first call seeds the counter from the stored maximum, never below `floor`.
    async fn next_counter_value(&self, entity: IdEntity, floor: i64) -> Result<i64>;
}
