use chrono::Utc;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;

use super::{SyncPolicy, MISSING_MANDATORY_FIELDS};
use crate::models::{CompanyRecord, CrmCompany, SyncReport, UpsertOutcome};
use crate::repositories::CrmRepository;
use crate::services::erp::CustomerRegistrar;
use crate::services::error::{Result, SyncError};
use crate::utils::sanitize_for_log;

pub struct CompanySync {
    crm: Arc<dyn CrmRepository>,
    registrar: Arc<CustomerRegistrar>,
    policy: SyncPolicy,
}

impl CompanySync {
    pub fn new(crm: Arc<dyn CrmRepository>, registrar: Arc<CustomerRegistrar>, policy: SyncPolicy) -> Self {
        Self { crm, registrar, policy }
    }

    /// Upserts every company independently; a failing record is reported and
    /// the batch moves on. Only configuration errors abort the call.
    pub async fn sync_companies(&self, companies: Vec<CompanyRecord>) -> Result<SyncReport<CompanyRecord>> {
        let report = stream::iter(companies)
            .map(Ok::<_, SyncError>)
            .try_fold(SyncReport::default(), |report, company| async move {
                let outcome = self.sync_company(&company).await;
                match outcome {
                    Err(e) if e.is_fatal() => Err(e),
                    outcome => {
                        if let Err(ref e) = outcome {
                            tracing::error!(
                                "Failed to insert/update accountId={}: {}",
                                sanitize_for_log(company.account_id.as_deref().unwrap_or("<missing>")),
                                e
                            );
                        }
                        Ok(report.absorb(company, outcome))
                    }
                }
            })
            .await?;

        tracing::info!(
            "Company summary: processed={} (inserted={}, updated={}), failed={}",
            report.processed(),
            report.inserted,
            report.updated,
            report.failed.len()
        );
        Ok(report)
    }

    async fn sync_company(&self, record: &CompanyRecord) -> Result<UpsertOutcome> {
        let (account_id, account_name) = record
            .mandatory_fields()
            .ok_or_else(|| SyncError::Validation(MISSING_MANDATORY_FIELDS.to_string()))?;

        let now = Utc::now();
        let (outcome, changed, already_linked) = match self.crm.find_company(account_id).await? {
            None => {
                let company = CrmCompany {
                    account_id: account_id.to_string(),
                    account_name: account_name.to_string(),
                    sync_flag: record.sync_flag,
                    status: record.status.clone(),
                    erp_customer_id: None,
                    created_at: now,
                    last_modified: now,
                };
                self.crm.insert_company(&company).await?;
                (UpsertOutcome::Inserted, true, false)
            }
            Some(stored) => {
                let changed = stored.differs_from(account_name, record, self.policy.change_scope);
                let already_linked = stored.erp_customer_id.is_some();
                let company = CrmCompany {
                    account_name: account_name.to_string(),
                    sync_flag: record.sync_flag,
                    status: record.status.clone(),
                    last_modified: now,
                    ..stored
                };
                self.crm.update_company(&company).await?;
                (UpsertOutcome::Updated, changed, already_linked)
            }
        };

        if record.sync_flag && self.policy.should_propagate(changed, already_linked) {
            let customer_id = self
                .registrar
                .register_customer(account_id, account_name, record.status.as_deref())
                .await?;
            self.crm.set_company_customer_id(account_id, customer_id).await?;
        }

        Ok(outcome)
    }
}
