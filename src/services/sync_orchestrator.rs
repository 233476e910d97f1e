// Sync Orchestrator
// Two phases with a hard gate: companies first, contacts only when every
// company went through.

use serde::Serialize;
use std::sync::Arc;

use crate::config::SyncSettings;
use crate::models::{CompanyRecord, ContactRecord, SyncBatch, SyncReport};
use crate::repositories::{CrmRepository, ErpRepository, IdSequenceRepository, InMemoryStore};
use crate::services::crm::{CompanySync, ContactSync};
use crate::services::erp::{ContactRegistrar, CustomerRegistrar, ProvisioningNotifier, TracingNotifier};
use crate::services::error::Result;
use crate::services::id_allocator::build_allocator;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub companies: SyncReport<CompanyRecord>,
    pub contacts: Option<SyncReport<ContactRecord>>,
    pub contacts_skipped: bool,
}

impl RunReport {
    pub fn has_failures(&self) -> bool {
        self.companies.has_failures() || self.contacts.as_ref().is_some_and(SyncReport::has_failures)
    }
}

pub struct SyncOrchestrator {
    company_sync: CompanySync,
    contact_sync: ContactSync,
}

impl SyncOrchestrator {
    pub fn new(company_sync: CompanySync, contact_sync: ContactSync) -> Self {
        Self {
            company_sync,
            contact_sync,
        }
    }

    /// Wires both sync phases, the registrars and the configured allocator.
    pub fn from_settings(
        crm: Arc<dyn CrmRepository>,
        erp: Arc<dyn ErpRepository>,
        sequences: Arc<dyn IdSequenceRepository>,
        notifier: Arc<dyn ProvisioningNotifier>,
        settings: &SyncSettings,
    ) -> Self {
        let allocator = build_allocator(settings.allocation, sequences);

        let customer_registrar = Arc::new(CustomerRegistrar::new(
            erp.clone(),
            allocator.clone(),
            Some(settings.customer_range),
        ));
        let contact_registrar = Arc::new(ContactRegistrar::new(
            erp,
            allocator,
            notifier,
            Some(settings.contact_person_range),
        ));

        Self::new(
            CompanySync::new(crm.clone(), customer_registrar, settings.policy),
            ContactSync::new(crm, contact_registrar, settings.policy),
        )
    }

    pub fn in_memory(store: Arc<InMemoryStore>, settings: &SyncSettings) -> Self {
        Self::from_settings(store.clone(), store.clone(), store, Arc::new(TracingNotifier), settings)
    }

    pub async fn run(&self, companies: Vec<CompanyRecord>, contacts: Vec<ContactRecord>) -> Result<RunReport> {
        tracing::info!(
            "Starting sync run: {} companies, {} contacts",
            companies.len(),
            contacts.len()
        );

        let company_report = self.company_sync.sync_companies(companies).await?;

        if company_report.has_failures() {
            tracing::warn!(
                "{} company record(s) failed, skipping contact sync for this run",
                company_report.failed.len()
            );
            return Ok(RunReport {
                companies: company_report,
                contacts: None,
                contacts_skipped: true,
            });
        }

        let contact_report = self.contact_sync.sync_contacts(contacts).await?;

        Ok(RunReport {
            companies: company_report,
            contacts: Some(contact_report),
            contacts_skipped: false,
        })
    }

    pub async fn run_batch(&self, batch: SyncBatch) -> Result<RunReport> {
        self.run(batch.companies, batch.contacts).await
    }
}
