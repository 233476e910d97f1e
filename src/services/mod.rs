pub mod crm;
pub mod erp;
pub mod error;
pub mod id_allocator;
pub mod sync_orchestrator;

pub use error::SyncError;
pub use id_allocator::{AllocationStrategy, CounterAllocator, IdAllocator, IdRange, MaxScanAllocator};
pub use sync_orchestrator::{RunReport, SyncOrchestrator};
