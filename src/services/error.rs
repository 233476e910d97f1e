use thiserror::Error;

use crate::models::IdEntity;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyncError {
    #[error("{0}")]
    Validation(String),

    #[error("{entity} exceeded maximum range ({end})")]
    RangeExhausted { entity: IdEntity, end: i64 },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Dependency missing: {0}")]
    DependencyMissing(String),

    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl SyncError {
    /// Fatal errors abort the whole sync call instead of being recorded per record.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SyncError::Configuration(_))
    }
}

impl From<sqlx::Error> for SyncError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        SyncError::Persistence(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
