use chrono::Utc;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;

use super::{SyncPolicy, MISSING_MANDATORY_FIELDS};
use crate::models::{ContactRecord, CrmContact, SyncReport, UpsertOutcome};
use crate::repositories::CrmRepository;
use crate::services::erp::{ContactRegistrar, ContactRegistration};
use crate::services::error::{Result, SyncError};
use crate::utils::sanitize_for_log;

pub struct ContactSync {
    crm: Arc<dyn CrmRepository>,
    registrar: Arc<ContactRegistrar>,
    policy: SyncPolicy,
}

impl ContactSync {
    pub fn new(crm: Arc<dyn CrmRepository>, registrar: Arc<ContactRegistrar>, policy: SyncPolicy) -> Self {
        Self { crm, registrar, policy }
    }

    pub async fn sync_contacts(&self, contacts: Vec<ContactRecord>) -> Result<SyncReport<ContactRecord>> {
        let report = stream::iter(contacts)
            .map(Ok::<_, SyncError>)
            .try_fold(SyncReport::default(), |report, contact| async move {
                let outcome = self.sync_contact(&contact).await;
                match outcome {
                    Err(e) if e.is_fatal() => Err(e),
                    outcome => {
                        if let Err(ref e) = outcome {
                            tracing::error!(
                                "Failed to insert/update contactId={}: {}",
                                sanitize_for_log(contact.contact_id.as_deref().unwrap_or("<missing>")),
                                e
                            );
                        }
                        Ok(report.absorb(contact, outcome))
                    }
                }
            })
            .await?;

        tracing::info!(
            "Contact summary: processed={} (inserted={}, updated={}), failed={}",
            report.processed(),
            report.inserted,
            report.updated,
            report.failed.len()
        );
        Ok(report)
    }

    async fn sync_contact(&self, record: &ContactRecord) -> Result<UpsertOutcome> {
        let (contact_id, account_id) = record
            .mandatory_fields()
            .ok_or_else(|| SyncError::Validation(MISSING_MANDATORY_FIELDS.to_string()))?;

        let now = Utc::now();
        let incoming = CrmContact {
            contact_id: contact_id.to_string(),
            account_id: account_id.to_string(),
            account_name: record.account_name.clone(),
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            email: record.email.clone(),
            department: record.department.clone(),
            country: record.country.clone(),
            phone: record.phone.clone(),
            zip_code: record.zip_code.clone(),
            cshme_flag: record.cshme_flag,
            status: record.status.clone(),
            sync_flag: record.sync_flag,
            erp_contact_person_id: None,
            created_at: now,
            last_modified: now,
        };

        let (outcome, changed, already_linked) = match self.crm.find_contact(contact_id).await? {
            None => {
                self.crm.insert_contact(&incoming).await?;
                (UpsertOutcome::Inserted, true, false)
            }
            Some(stored) => {
                let changed = stored.differs_from(record, self.policy.change_scope);
                let already_linked = stored.erp_contact_person_id.is_some();
                let contact = CrmContact {
                    erp_contact_person_id: stored.erp_contact_person_id,
                    created_at: stored.created_at,
                    ..incoming
                };
                self.crm.update_contact(&contact).await?;
                (UpsertOutcome::Updated, changed, already_linked)
            }
        };

        if record.sync_flag && self.policy.should_propagate(changed, already_linked) {
            let registration = ContactRegistration::from_record(account_id, record);
            if let Some(contact_person_id) = self.registrar.register_contact(&registration).await? {
                self.crm.set_contact_person_id(contact_id, contact_person_id).await?;
            }
        }

        Ok(outcome)
    }
}
