// Shared fixtures for the sync integration tests: wrappers around the
// in-memory store that inject failures, count calls, or capture signals.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use crm_erp_sync::config::SyncSettings;
use crm_erp_sync::models::{CrmCompany, CrmContact, ErpContact, ErpCustomer};
use crm_erp_sync::repositories::{CrmRepository, ErpRepository, InMemoryStore};
use crm_erp_sync::services::crm::{CompanySync, ContactSync};
use crm_erp_sync::services::erp::{ContactRegistrar, CustomerRegistrar, ProvisioningNotifier, ProvisioningSignal};
use crm_erp_sync::services::id_allocator::build_allocator;
use crm_erp_sync::services::error::Result;
use crm_erp_sync::services::{SyncError, SyncOrchestrator};

/// CRM repository that fails every write for the listed account ids.
pub struct FaultyCrm {
    inner: Arc<InMemoryStore>,
    failing_accounts: HashSet<String>,
}

impl FaultyCrm {
    pub fn new(inner: Arc<InMemoryStore>, failing_accounts: &[&str]) -> Self {
        Self {
            inner,
            failing_accounts: failing_accounts.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn check(&self, account_id: &str) -> Result<()> {
        if self.failing_accounts.contains(account_id) {
            return Err(SyncError::Persistence(format!("simulated outage for {}", account_id)));
        }
        Ok(())
    }
}

#[async_trait]
impl CrmRepository for FaultyCrm {
    async fn find_company(&self, account_id: &str) -> Result<Option<CrmCompany>> {
        self.inner.find_company(account_id).await
    }

    async fn insert_company(&self, company: &CrmCompany) -> Result<()> {
        self.check(&company.account_id)?;
        self.inner.insert_company(company).await
    }

    async fn update_company(&self, company: &CrmCompany) -> Result<()> {
        self.check(&company.account_id)?;
        self.inner.update_company(company).await
    }

    async fn set_company_customer_id(&self, account_id: &str, customer_id: i64) -> Result<()> {
        self.check(account_id)?;
        self.inner.set_company_customer_id(account_id, customer_id).await
    }

    async fn find_contact(&self, contact_id: &str) -> Result<Option<CrmContact>> {
        self.inner.find_contact(contact_id).await
    }

    async fn insert_contact(&self, contact: &CrmContact) -> Result<()> {
        self.check(&contact.account_id)?;
        self.inner.insert_contact(contact).await
    }

    async fn update_contact(&self, contact: &CrmContact) -> Result<()> {
        self.check(&contact.account_id)?;
        self.inner.update_contact(contact).await
    }

    async fn set_contact_person_id(&self, contact_id: &str, contact_person_id: i64) -> Result<()> {
        self.inner.set_contact_person_id(contact_id, contact_person_id).await
    }
}

/// ERP repository that counts customer lookups and inserts.
pub struct CountingErp {
    inner: Arc<InMemoryStore>,
    pub customer_lookups: AtomicUsize,
    pub customer_inserts: AtomicUsize,
}

impl CountingErp {
    pub fn new(inner: Arc<InMemoryStore>) -> Self {
        Self {
            inner,
            customer_lookups: AtomicUsize::new(0),
            customer_inserts: AtomicUsize::new(0),
        }
    }

    pub fn lookups(&self) -> usize {
        self.customer_lookups.load(Ordering::SeqCst)
    }

    pub fn inserts(&self) -> usize {
        self.customer_inserts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ErpRepository for CountingErp {
    async fn find_customer(&self, crm_account_id: &str) -> Result<Option<ErpCustomer>> {
        self.customer_lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.find_customer(crm_account_id).await
    }

    async fn insert_customer(&self, customer: &ErpCustomer) -> Result<()> {
        self.customer_inserts.fetch_add(1, Ordering::SeqCst);
        self.inner.insert_customer(customer).await
    }

    async fn update_customer(&self, customer: &ErpCustomer) -> Result<()> {
        self.inner.update_customer(customer).await
    }

    async fn find_customer_contact(&self, crm_account_id: &str, email: &str) -> Result<Option<ErpContact>> {
        self.inner.find_customer_contact(crm_account_id, email).await
    }

    async fn insert_customer_contact(&self, contact: &ErpContact) -> Result<()> {
        self.inner.insert_customer_contact(contact).await
    }

    async fn update_customer_contact(&self, contact: &ErpContact) -> Result<()> {
        self.inner.update_customer_contact(contact).await
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub signals: Mutex<Vec<ProvisioningSignal>>,
}

#[async_trait]
impl ProvisioningNotifier for RecordingNotifier {
    async fn notify(&self, signal: &ProvisioningSignal) -> Result<()> {
        self.signals.lock().await.push(signal.clone());
        Ok(())
    }
}

/// Orchestrator over a fresh in-memory store with default settings.
pub fn memory_orchestrator() -> (Arc<InMemoryStore>, SyncOrchestrator) {
    memory_orchestrator_with(SyncSettings::default())
}

pub fn memory_orchestrator_with(settings: SyncSettings) -> (Arc<InMemoryStore>, SyncOrchestrator) {
    let store = Arc::new(InMemoryStore::new());
    let orchestrator = SyncOrchestrator::in_memory(store.clone(), &settings);
    (store, orchestrator)
}

/// Orchestrator whose registrars have no id range configured: the first
/// flagged record of the given phase hits a configuration error.
pub fn misconfigured_orchestrator(store: Arc<InMemoryStore>, customers_configured: bool) -> SyncOrchestrator {
    let settings = SyncSettings::default();
    let allocator = build_allocator(settings.allocation, store.clone());
    let customer_range = customers_configured.then_some(settings.customer_range);

    let customer_registrar = Arc::new(CustomerRegistrar::new(store.clone(), allocator.clone(), customer_range));
    let contact_registrar = Arc::new(ContactRegistrar::new(
        store.clone(),
        allocator,
        Arc::new(RecordingNotifier::default()),
        None,
    ));

    SyncOrchestrator::new(
        CompanySync::new(store.clone(), customer_registrar, settings.policy),
        ContactSync::new(store, contact_registrar, settings.policy),
    )
}
