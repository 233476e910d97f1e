// ERP staging registration
// Customers and contact persons mirrored from the CRM, with ERP-assigned ids.

pub mod contact_registrar;
pub mod customer_registrar;
pub mod provisioning;

pub use contact_registrar::{ContactRegistrar, ContactRegistration};
pub use customer_registrar::CustomerRegistrar;
pub use provisioning::{ProvisioningNotifier, ProvisioningSignal, TracingNotifier};
