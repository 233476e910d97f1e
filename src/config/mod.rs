pub mod database;

pub use database::{create_pool, DatabaseConfig};

use anyhow::Result;
use std::env;
use std::str::FromStr;

use crate::models::ChangeScope;
use crate::services::crm::{PropagationPolicy, SyncPolicy};
use crate::services::{AllocationStrategy, IdRange, SyncError};

/// Everything the sync pipeline itself needs. Loadable without a database.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncSettings {
    pub customer_range: IdRange,
    pub contact_person_range: IdRange,
    pub allocation: AllocationStrategy,
    pub policy: SyncPolicy,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            customer_range: IdRange::customer_default(),
            contact_person_range: IdRange::contact_person_default(),
            allocation: AllocationStrategy::default(),
            policy: SyncPolicy::default(),
        }
    }
}

impl SyncSettings {
    pub fn from_env() -> std::result::Result<Self, SyncError> {
        let defaults = Self::default();

        let customer_range = IdRange::new(
            env_or("ERP_CUSTOMERID_START", defaults.customer_range.start)?,
            env_or("ERP_CUSTOMERID_END", defaults.customer_range.end)?,
        )?;
        let contact_person_range = IdRange::new(
            env_or("ERP_CONTACTPERSONID_START", defaults.contact_person_range.start)?,
            env_or("ERP_CONTACTPERSONID_END", defaults.contact_person_range.end)?,
        )?;

        Ok(Self {
            customer_range,
            contact_person_range,
            allocation: env_or("ID_ALLOCATION", defaults.allocation)?,
            policy: SyncPolicy {
                propagation: env_or::<PropagationPolicy>("SYNC_PROPAGATION", defaults.policy.propagation)?,
                change_scope: env_or::<ChangeScope>("SYNC_CHANGE_SCOPE", defaults.policy.change_scope)?,
            },
        })
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub sync: SyncSettings,
    pub server_host: String,
    pub server_port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database: DatabaseConfig::from_env()?,
            sync: SyncSettings::from_env()?,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn env_or<T>(key: &str, default: T) -> std::result::Result<T, SyncError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| SyncError::Configuration(format!("{} is invalid: {}", key, e))),
        _ => Ok(default),
    }
}
