use serde::Serialize;
use std::fmt::Display;

/// Aggregate outcome of one sync call over a list of records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncReport<R> {
    pub inserted: usize,
    pub updated: usize,
    pub failed: Vec<FailedRecord<R>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedRecord<R> {
    pub record: R,
    pub error: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

impl<R> Default for SyncReport<R> {
    fn default() -> Self {
        Self {
            inserted: 0,
            updated: 0,
            failed: Vec::new(),
        }
    }
}

impl<R> SyncReport<R> {
    /// Folds the outcome of a single record into the report.
    pub fn absorb<E: Display>(mut self, record: R, outcome: Result<UpsertOutcome, E>) -> Self {
        match outcome {
            Ok(UpsertOutcome::Inserted) => self.inserted += 1,
            Ok(UpsertOutcome::Updated) => self.updated += 1,
            Err(e) => self.failed.push(FailedRecord {
                record,
                error: e.to_string(),
            }),
        }
        self
    }

    pub fn processed(&self) -> usize {
        self.inserted + self.updated
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}
