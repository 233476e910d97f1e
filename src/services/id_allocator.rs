// ID Allocator
// Hands out ERP-side sequential identifiers within a configured numeric range.
//
// Two strategies share one contract (range check, exhaustion error):
// - MaxScanAllocator: max stored id + 1. Correct for a single writer only,
//   two concurrent callers can read the same maximum.
// - CounterAllocator: atomic increment on the erp_id_counters table.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

use crate::models::IdEntity;
use crate::repositories::IdSequenceRepository;
use crate::services::error::{Result, SyncError};

/// Inclusive numeric range an entity's identifiers must stay within.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRange {
    pub start: i64,
    pub end: i64,
}

impl IdRange {
    pub fn new(start: i64, end: i64) -> Result<Self> {
        let range = Self { start, end };
        range.check()?;
        Ok(range)
    }

    pub const fn customer_default() -> Self {
        Self { start: 1_000_000, end: 9_999_999 }
    }

    pub const fn contact_person_default() -> Self {
        Self { start: 2_000_000, end: 2_999_999 }
    }

    fn check(&self) -> Result<()> {
        if self.start < 0 || self.start > self.end {
            return Err(SyncError::Configuration(format!(
                "invalid id range [{}, {}]",
                self.start, self.end
            )));
        }
        Ok(())
    }

    fn bound(&self, entity: IdEntity, candidate: i64) -> Result<i64> {
        if candidate > self.end {
            return Err(SyncError::RangeExhausted { entity, end: self.end });
        }
        Ok(candidate)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationStrategy {
    #[default]
    MaxScan,
    Counter,
}

impl FromStr for AllocationStrategy {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "max_scan" | "max-scan" => Ok(AllocationStrategy::MaxScan),
            "counter" => Ok(AllocationStrategy::Counter),
            other => Err(SyncError::Configuration(format!(
                "unknown id allocation strategy: {}",
                other
            ))),
        }
    }
}

#[async_trait]
pub trait IdAllocator: Send + Sync {
    /// Next identifier for `entity`. A missing range is a configuration error.
    async fn allocate(&self, entity: IdEntity, range: Option<IdRange>) -> Result<i64>;
}

pub fn build_allocator(strategy: AllocationStrategy, sequences: Arc<dyn IdSequenceRepository>) -> Arc<dyn IdAllocator> {
    match strategy {
        AllocationStrategy::MaxScan => Arc::new(MaxScanAllocator::new(sequences)),
        AllocationStrategy::Counter => Arc::new(CounterAllocator::new(sequences)),
    }
}

fn require_range(entity: IdEntity, range: Option<IdRange>) -> Result<IdRange> {
    let range = range.ok_or_else(|| SyncError::Configuration(format!("no id range configured for {}", entity)))?;
    range.check()?;
    Ok(range)
}

pub struct MaxScanAllocator {
    sequences: Arc<dyn IdSequenceRepository>,
}

impl MaxScanAllocator {
    pub fn new(sequences: Arc<dyn IdSequenceRepository>) -> Self {
        Self { sequences }
    }
}

#[async_trait]
impl IdAllocator for MaxScanAllocator {
    async fn allocate(&self, entity: IdEntity, range: Option<IdRange>) -> Result<i64> {
        let range = require_range(entity, range)?;
        let current_max = self.sequences.current_max_id(entity).await?;

        let candidate = match current_max {
            None => range.start,
            Some(raw) => match raw.trim().parse::<i64>() {
                // A stored max below the range (start raised later) restarts at the range start.
                Ok(max) => max
                    .checked_add(1)
                    .ok_or(SyncError::RangeExhausted { entity, end: range.end })?
                    .max(range.start),
                Err(_) => {
                    tracing::warn!(
                        "Invalid {} value found in {}: {} (falling back to range start)",
                        entity.column(),
                        entity.table(),
                        raw
                    );
                    range.start
                }
            },
        };

        let id = range.bound(entity, candidate)?;
        tracing::info!("Generated new {}: {}", entity, id);
        Ok(id)
    }
}

pub struct CounterAllocator {
    sequences: Arc<dyn IdSequenceRepository>,
}

impl CounterAllocator {
    pub fn new(sequences: Arc<dyn IdSequenceRepository>) -> Self {
        Self { sequences }
    }
}

#[async_trait]
impl IdAllocator for CounterAllocator {
    async fn allocate(&self, entity: IdEntity, range: Option<IdRange>) -> Result<i64> {
        let range = require_range(entity, range)?;
        let next = self.sequences.next_counter_value(entity, range.start).await?;
        let id = range.bound(entity, next)?;
        tracing::info!("Generated new {} from counter: {}", entity, id);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::InMemoryStore;

    struct FixedMax(Option<&'static str>);

    #[async_trait]
    impl IdSequenceRepository for FixedMax {
        async fn current_max_id(&self, _entity: IdEntity) -> Result<Option<String>> {
            Ok(self.0.map(str::to_string))
        }

        async fn next_counter_value(&self, _entity: IdEntity, floor: i64) -> Result<i64> {
            Ok(floor)
        }
    }

    fn max_scan(max: Option<&'static str>) -> MaxScanAllocator {
        MaxScanAllocator::new(Arc::new(FixedMax(max)))
    }

    const RANGE: IdRange = IdRange { start: 1000, end: 9999 };

    #[tokio::test]
    async fn test_empty_table_starts_at_range_start() {
        let id = max_scan(None).allocate(IdEntity::CustomerId, Some(RANGE)).await.unwrap();
        assert_eq!(id, 1000);
    }

    #[tokio::test]
    async fn test_next_after_existing_max() {
        let id = max_scan(Some("1005")).allocate(IdEntity::CustomerId, Some(RANGE)).await.unwrap();
        assert_eq!(id, 1006);
    }

    #[tokio::test]
    async fn test_range_exhausted() {
        let err = max_scan(Some("9999"))
            .allocate(IdEntity::ContactPersonId, Some(RANGE))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            SyncError::RangeExhausted { entity: IdEntity::ContactPersonId, end: 9999 }
        );
        assert!(!err.is_fatal());
    }

    #[tokio::test]
    async fn test_max_at_i64_limit_is_range_exhausted() {
        let range = IdRange::new(1, i64::MAX).unwrap();
        let err = max_scan(Some("9223372036854775807"))
            .allocate(IdEntity::CustomerId, Some(range))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            SyncError::RangeExhausted { entity: IdEntity::CustomerId, end: i64::MAX }
        );
    }

    #[tokio::test]
    async fn test_max_below_range_starts_at_range_start() {
        let id = max_scan(Some("500"))
            .allocate(IdEntity::ContactPersonId, Some(IdRange::contact_person_default()))
            .await
            .unwrap();
        assert_eq!(id, 2_000_000);

        let store = Arc::new(InMemoryStore::new());
        let counter = CounterAllocator::new(store);
        let id = counter
            .allocate(IdEntity::ContactPersonId, Some(IdRange::contact_person_default()))
            .await
            .unwrap();
        assert_eq!(id, 2_000_000);
    }

    #[tokio::test]
    async fn test_non_numeric_max_falls_back_to_start() {
        let id = max_scan(Some("CUST-17")).allocate(IdEntity::CustomerId, Some(RANGE)).await.unwrap();
        assert_eq!(id, 1000);
    }

    #[tokio::test]
    async fn test_missing_or_inverted_range_is_configuration_error() {
        let err = max_scan(None).allocate(IdEntity::CustomerId, None).await.unwrap_err();
        assert!(matches!(err, SyncError::Configuration(_)));
        assert!(err.is_fatal());

        let inverted = IdRange { start: 10, end: 1 };
        let err = max_scan(None).allocate(IdEntity::CustomerId, Some(inverted)).await.unwrap_err();
        assert!(matches!(err, SyncError::Configuration(_)));
        assert!(IdRange::new(10, 1).is_err());
    }

    #[tokio::test]
    async fn test_counter_is_monotonic_and_bounded() {
        let store = Arc::new(InMemoryStore::new());
        let allocator = CounterAllocator::new(store);
        let range = IdRange::new(5, 7).unwrap();

        assert_eq!(allocator.allocate(IdEntity::CustomerId, Some(range)).await.unwrap(), 5);
        assert_eq!(allocator.allocate(IdEntity::CustomerId, Some(range)).await.unwrap(), 6);
        assert_eq!(allocator.allocate(IdEntity::CustomerId, Some(range)).await.unwrap(), 7);
        assert!(matches!(
            allocator.allocate(IdEntity::CustomerId, Some(range)).await,
            Err(SyncError::RangeExhausted { end: 7, .. })
        ));
        // Counters are per entity.
        assert_eq!(allocator.allocate(IdEntity::ContactPersonId, Some(range)).await.unwrap(), 5);
    }

    #[test]
    fn test_strategy_parsing() {
        assert_eq!("counter".parse::<AllocationStrategy>().unwrap(), AllocationStrategy::Counter);
        assert_eq!("MAX_SCAN".parse::<AllocationStrategy>().unwrap(), AllocationStrategy::MaxScan);
        assert!("random".parse::<AllocationStrategy>().is_err());
    }
}
