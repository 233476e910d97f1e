use chrono::Utc;
use std::sync::Arc;

use crate::models::{ErpCustomer, IdEntity};
use crate::repositories::ErpRepository;
use crate::services::error::Result;
use crate::services::id_allocator::{IdAllocator, IdRange};
use crate::utils::{sanitize_for_log, sanitize_option_for_log};

/// Upserts ERP customers keyed by the originating CRM account id.
pub struct CustomerRegistrar {
    erp: Arc<dyn ErpRepository>,
    allocator: Arc<dyn IdAllocator>,
    range: Option<IdRange>,
}

impl CustomerRegistrar {
    pub fn new(erp: Arc<dyn ErpRepository>, allocator: Arc<dyn IdAllocator>, range: Option<IdRange>) -> Self {
        Self { erp, allocator, range }
    }

    /// Returns the customer id for `account_id`, allocating one on first registration.
    ///
    /// Repeated calls for the same account converge on the same id: an existing
    /// customer always gets `last_modified` refreshed and its name and status
    /// brought in line with the CRM.
    pub async fn register_customer(&self, account_id: &str, account_name: &str, status: Option<&str>) -> Result<i64> {
        let now = Utc::now();

        if let Some(mut customer) = self.erp.find_customer(account_id).await? {
            let changed = customer.name != account_name || customer.status.as_deref() != status;
            customer.name = account_name.to_string();
            customer.status = status.map(str::to_string);
            customer.last_modified = now;
            self.erp.update_customer(&customer).await?;

            if changed {
                tracing::info!(
                    "Updated ERP customer (accountId={}, customerId={}, status={})",
                    sanitize_for_log(account_id),
                    customer.customer_id,
                    sanitize_option_for_log(status)
                );
            } else {
                tracing::debug!(
                    "No change for ERP customer (accountId={}, customerId={}), lastModified refreshed",
                    sanitize_for_log(account_id),
                    customer.customer_id
                );
            }
            return Ok(customer.customer_id);
        }

        let customer_id = self.allocator.allocate(IdEntity::CustomerId, self.range).await?;
        let customer = ErpCustomer {
            customer_id,
            crm_account_id: account_id.to_string(),
            name: account_name.to_string(),
            status: status.map(str::to_string),
            created_at: now,
            last_modified: now,
        };
        self.erp.insert_customer(&customer).await?;

        tracing::info!(
            "Registered new ERP customer (accountId={} -> customerId={})",
            sanitize_for_log(account_id),
            customer_id
        );
        Ok(customer_id)
    }
}
