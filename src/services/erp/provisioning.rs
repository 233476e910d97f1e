use async_trait::async_trait;
use serde::Serialize;

use crate::services::error::Result;
use crate::utils::{mask_email_for_log, sanitize_for_log};

/// Emitted when an ERP contact is active and flagged for identity provisioning.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisioningSignal {
    pub contact_person_id: i64,
    pub customer_id: i64,
    pub crm_account_id: String,
    pub email: String,
    pub previous_cshme_flag: Option<bool>,
    pub newly_created: bool,
}

impl ProvisioningSignal {
    /// cshmeFlag set (missing counts as unset) and status "active", any case.
    pub fn is_due(cshme_flag: Option<bool>, status: Option<&str>) -> bool {
        cshme_flag.unwrap_or(false) && status.is_some_and(|s| s.eq_ignore_ascii_case("active"))
    }
}

/// Downstream identity-provisioning process.
#[async_trait]
pub trait ProvisioningNotifier: Send + Sync {
    async fn notify(&self, signal: &ProvisioningSignal) -> Result<()>;
}

/// Default notifier: the trigger is a structured log line picked up downstream.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

#[async_trait]
impl ProvisioningNotifier for TracingNotifier {
    async fn notify(&self, signal: &ProvisioningSignal) -> Result<()> {
        tracing::info!(
            contact_person_id = signal.contact_person_id,
            customer_id = signal.customer_id,
            crm_account_id = %sanitize_for_log(&signal.crm_account_id),
            email = %mask_email_for_log(&signal.email),
            newly_created = signal.newly_created,
            "Trigger identity provisioning for ERP contact"
        );
        Ok(())
    }
}
