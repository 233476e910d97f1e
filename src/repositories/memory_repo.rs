use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{CrmRepository, ErpRepository, IdSequenceRepository};
use crate::models::{CrmCompany, CrmContact, ErpContact, ErpCustomer, IdEntity};
use crate::services::error::{Result, SyncError};

#[derive(Debug, Default)]
struct MemoryState {
    companies: HashMap<String, CrmCompany>,
    contacts: HashMap<String, CrmContact>,
    customers: HashMap<String, ErpCustomer>,
    customer_contacts: HashMap<(String, String), ErpContact>,
    counters: HashMap<IdEntity, i64>,
}

/// Process-local staging store. Backs dry runs and the test suite.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<MemoryState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn companies(&self) -> Vec<CrmCompany> {
        let mut companies: Vec<_> = self.state.read().await.companies.values().cloned().collect();
        companies.sort_by(|a, b| a.account_id.cmp(&b.account_id));
        companies
    }

    pub async fn contacts(&self) -> Vec<CrmContact> {
        let mut contacts: Vec<_> = self.state.read().await.contacts.values().cloned().collect();
        contacts.sort_by(|a, b| a.contact_id.cmp(&b.contact_id));
        contacts
    }

    pub async fn customers(&self) -> Vec<ErpCustomer> {
        let mut customers: Vec<_> = self.state.read().await.customers.values().cloned().collect();
        customers.sort_by_key(|c| c.customer_id);
        customers
    }

    pub async fn customer_contacts(&self) -> Vec<ErpContact> {
        let mut contacts: Vec<_> = self
            .state
            .read()
            .await
            .customer_contacts
            .values()
            .cloned()
            .collect();
        contacts.sort_by_key(|c| c.contact_person_id);
        contacts
    }

    fn max_id(state: &MemoryState, entity: IdEntity) -> Option<i64> {
        match entity {
            IdEntity::CustomerId => state.customers.values().map(|c| c.customer_id).max(),
            IdEntity::ContactPersonId => state.customer_contacts.values().map(|c| c.contact_person_id).max(),
        }
    }
}

#[async_trait]
impl CrmRepository for InMemoryStore {
    async fn find_company(&self, account_id: &str) -> Result<Option<CrmCompany>> {
        Ok(self.state.read().await.companies.get(account_id).cloned())
    }

    async fn insert_company(&self, company: &CrmCompany) -> Result<()> {
        let mut state = self.state.write().await;
        if state.companies.contains_key(&company.account_id) {
            return Err(SyncError::Persistence(format!(
                "duplicate key crm_company_accounts.account_id={}",
                company.account_id
            )));
        }
        state.companies.insert(company.account_id.clone(), company.clone());
        Ok(())
    }

    async fn update_company(&self, company: &CrmCompany) -> Result<()> {
        let mut state = self.state.write().await;
        if let Some(stored) = state.companies.get_mut(&company.account_id) {
            stored.account_name = company.account_name.clone();
            stored.sync_flag = company.sync_flag;
            stored.status = company.status.clone();
            stored.last_modified = company.last_modified;
        }
        Ok(())
    }

    async fn set_company_customer_id(&self, account_id: &str, customer_id: i64) -> Result<()> {
        if let Some(stored) = self.state.write().await.companies.get_mut(account_id) {
            stored.erp_customer_id = Some(customer_id);
        }
        Ok(())
    }

    async fn find_contact(&self, contact_id: &str) -> Result<Option<CrmContact>> {
        Ok(self.state.read().await.contacts.get(contact_id).cloned())
    }

    async fn insert_contact(&self, contact: &CrmContact) -> Result<()> {
        let mut state = self.state.write().await;
        if state.contacts.contains_key(&contact.contact_id) {
            return Err(SyncError::Persistence(format!(
                "duplicate key crm_company_contacts.contact_id={}",
                contact.contact_id
            )));
        }
        state.contacts.insert(contact.contact_id.clone(), contact.clone());
        Ok(())
    }

    async fn update_contact(&self, contact: &CrmContact) -> Result<()> {
        let mut state = self.state.write().await;
        if let Some(stored) = state.contacts.get_mut(&contact.contact_id) {
            let erp_contact_person_id = stored.erp_contact_person_id;
            let created_at = stored.created_at;
            *stored = CrmContact {
                erp_contact_person_id,
                created_at,
                ..contact.clone()
            };
        }
        Ok(())
    }

    async fn set_contact_person_id(&self, contact_id: &str, contact_person_id: i64) -> Result<()> {
        if let Some(stored) = self.state.write().await.contacts.get_mut(contact_id) {
            stored.erp_contact_person_id = Some(contact_person_id);
        }
        Ok(())
    }
}

#[async_trait]
impl ErpRepository for InMemoryStore {
    async fn find_customer(&self, crm_account_id: &str) -> Result<Option<ErpCustomer>> {
        Ok(self.state.read().await.customers.get(crm_account_id).cloned())
    }

    async fn insert_customer(&self, customer: &ErpCustomer) -> Result<()> {
        let mut state = self.state.write().await;
        let id_taken = state.customers.values().any(|c| c.customer_id == customer.customer_id);
        if id_taken || state.customers.contains_key(&customer.crm_account_id) {
            return Err(SyncError::Persistence(format!(
                "duplicate key erp_customers (customer_id={}, crm_account_id={})",
                customer.customer_id, customer.crm_account_id
            )));
        }
        state.customers.insert(customer.crm_account_id.clone(), customer.clone());
        Ok(())
    }

    async fn update_customer(&self, customer: &ErpCustomer) -> Result<()> {
        if let Some(stored) = self.state.write().await.customers.get_mut(&customer.crm_account_id) {
            stored.name = customer.name.clone();
            stored.status = customer.status.clone();
            stored.last_modified = customer.last_modified;
        }
        Ok(())
    }

    async fn find_customer_contact(&self, crm_account_id: &str, email: &str) -> Result<Option<ErpContact>> {
        let key = (crm_account_id.to_string(), email.to_string());
        Ok(self.state.read().await.customer_contacts.get(&key).cloned())
    }

    async fn insert_customer_contact(&self, contact: &ErpContact) -> Result<()> {
        let mut state = self.state.write().await;
        let key = (contact.crm_account_id.clone(), contact.email.clone());
        let id_taken = state
            .customer_contacts
            .values()
            .any(|c| c.contact_person_id == contact.contact_person_id);
        if id_taken || state.customer_contacts.contains_key(&key) {
            return Err(SyncError::Persistence(format!(
                "duplicate key erp_customer_contacts (contact_person_id={}, crm_account_id={})",
                contact.contact_person_id, contact.crm_account_id
            )));
        }
        state.customer_contacts.insert(key, contact.clone());
        Ok(())
    }

    async fn update_customer_contact(&self, contact: &ErpContact) -> Result<()> {
        let key = (contact.crm_account_id.clone(), contact.email.clone());
        if let Some(stored) = self.state.write().await.customer_contacts.get_mut(&key) {
            stored.first_name = contact.first_name.clone();
            stored.last_name = contact.last_name.clone();
            stored.department = contact.department.clone();
            stored.country = contact.country.clone();
            stored.phone = contact.phone.clone();
            stored.cshme_flag = contact.cshme_flag;
            stored.status = contact.status.clone();
            stored.last_modified = contact.last_modified;
        }
        Ok(())
    }
}

#[async_trait]
impl IdSequenceRepository for InMemoryStore {
    async fn current_max_id(&self, entity: IdEntity) -> Result<Option<String>> {
        let state = self.state.read().await;
        Ok(Self::max_id(&state, entity).map(|id| id.to_string()))
    }

    async fn next_counter_value(&self, entity: IdEntity, floor: i64) -> Result<i64> {
        let mut state = self.state.write().await;
        let previous = state.counters.get(&entity).copied().or_else(|| Self::max_id(&state, entity));
        let next = match previous {
            Some(last) => last
                .checked_add(1)
                .ok_or(SyncError::RangeExhausted { entity, end: i64::MAX })?
                .max(floor),
            None => floor,
        };
        state.counters.insert(entity, next);
        Ok(next)
    }
}
