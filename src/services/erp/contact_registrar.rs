use chrono::Utc;
use std::sync::Arc;

use super::provisioning::{ProvisioningNotifier, ProvisioningSignal};
use crate::models::{ContactRecord, ErpContact, IdEntity};
use crate::repositories::ErpRepository;
use crate::services::error::{Result, SyncError};
use crate::services::id_allocator::{IdAllocator, IdRange};
use crate::utils::{mask_email_for_log, sanitize_for_log};

/// Input of an ERP contact registration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactRegistration {
    pub account_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
    pub country: Option<String>,
    pub cshme_flag: Option<bool>,
    pub phone: Option<String>,
    pub status: Option<String>,
}

impl ContactRegistration {
    pub fn from_record(account_id: &str, record: &ContactRecord) -> Self {
        Self {
            account_id: account_id.to_string(),
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            email: record.email.clone(),
            department: record.department.clone(),
            country: record.country.clone(),
            cshme_flag: Some(record.cshme_flag),
            phone: record.phone.clone(),
            status: record.status.clone(),
        }
    }
}

/// Upserts ERP contacts keyed by `(crm_account_id, email)` under their ERP customer.
pub struct ContactRegistrar {
    erp: Arc<dyn ErpRepository>,
    allocator: Arc<dyn IdAllocator>,
    notifier: Arc<dyn ProvisioningNotifier>,
    range: Option<IdRange>,
}

impl ContactRegistrar {
    pub fn new(
        erp: Arc<dyn ErpRepository>,
        allocator: Arc<dyn IdAllocator>,
        notifier: Arc<dyn ProvisioningNotifier>,
        range: Option<IdRange>,
    ) -> Self {
        Self {
            erp,
            allocator,
            notifier,
            range,
        }
    }

    /// Returns the contact person id, or `None` when the account has no ERP
    /// customer yet. A skipped registration writes nothing.
    pub async fn register_contact(&self, registration: &ContactRegistration) -> Result<Option<i64>> {
        let customer_id = match self.resolve_customer_id(&registration.account_id).await {
            Ok(customer_id) => customer_id,
            Err(SyncError::DependencyMissing(reason)) => {
                tracing::warn!("{}, skipping ERP contact registration", reason);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let email = registration
            .email
            .as_deref()
            .filter(|email| !email.trim().is_empty())
            .ok_or_else(|| SyncError::Validation("Missing email for ERP contact".to_string()))?;

        let now = Utc::now();
        let existing = self
            .erp
            .find_customer_contact(&registration.account_id, email)
            .await?;

        let (contact, previous_cshme_flag) = match existing {
            Some(mut contact) => {
                let previous_cshme_flag = contact.cshme_flag;
                contact.first_name = registration.first_name.clone();
                contact.last_name = registration.last_name.clone();
                contact.department = registration.department.clone();
                contact.country = registration.country.clone();
                contact.phone = registration.phone.clone();
                contact.cshme_flag = registration.cshme_flag.unwrap_or(false);
                contact.status = registration.status.clone();
                contact.last_modified = now;
                self.erp.update_customer_contact(&contact).await?;

                tracing::info!(
                    "Updated ERP contact {} (accountId={} -> contactPersonId={})",
                    mask_email_for_log(email),
                    sanitize_for_log(&registration.account_id),
                    contact.contact_person_id
                );
                (contact, Some(previous_cshme_flag))
            }
            None => {
                let contact_person_id = self.allocator.allocate(IdEntity::ContactPersonId, self.range).await?;
                let contact = ErpContact {
                    contact_person_id,
                    customer_id,
                    crm_account_id: registration.account_id.clone(),
                    email: email.to_string(),
                    first_name: registration.first_name.clone(),
                    last_name: registration.last_name.clone(),
                    department: registration.department.clone(),
                    country: registration.country.clone(),
                    phone: registration.phone.clone(),
                    cshme_flag: registration.cshme_flag.unwrap_or(false),
                    status: registration.status.clone(),
                    created_at: now,
                    last_modified: now,
                };
                self.erp.insert_customer_contact(&contact).await?;

                tracing::info!(
                    "Registered new ERP contact {} (accountId={} -> customerId={}, contactPersonId={})",
                    mask_email_for_log(email),
                    sanitize_for_log(&registration.account_id),
                    customer_id,
                    contact_person_id
                );
                (contact, None)
            }
        };

        if ProvisioningSignal::is_due(registration.cshme_flag, registration.status.as_deref()) {
            let signal = ProvisioningSignal {
                contact_person_id: contact.contact_person_id,
                customer_id: contact.customer_id,
                crm_account_id: contact.crm_account_id.clone(),
                email: contact.email.clone(),
                previous_cshme_flag,
                newly_created: previous_cshme_flag.is_none(),
            };
            // The registration itself already succeeded.
            if let Err(e) = self.notifier.notify(&signal).await {
                tracing::warn!(
                    "Provisioning notification failed for contactPersonId={}: {}",
                    signal.contact_person_id,
                    e
                );
            }
        }

        Ok(Some(contact.contact_person_id))
    }

    async fn resolve_customer_id(&self, account_id: &str) -> Result<i64> {
        self.erp
            .find_customer(account_id)
            .await?
            .map(|customer| customer.customer_id)
            .ok_or_else(|| {
                SyncError::DependencyMissing(format!(
                    "No ERP customer found for crmAccountId={}",
                    sanitize_for_log(account_id)
                ))
            })
    }
}
