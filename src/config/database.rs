use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use std::env;

use crate::services::SyncError;

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
    pub ssl_mode: String,
    /// Schema holding the staging tables. Required.
    pub schema: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self, SyncError> {
        let schema = env::var("DATABASE_SCHEMA")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| SyncError::Configuration("Environment variable DATABASE_SCHEMA is not set".to_string()))?;
        validate_schema_name(&schema)?;

        Ok(Self {
            host: env::var("DATABASE_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: env::var("DATABASE_PORT")
                .unwrap_or_else(|_| "5432".to_string())
                .parse()
                .map_err(|e| SyncError::Configuration(format!("DATABASE_PORT is invalid: {}", e)))?,
            username: env::var("DATABASE_USER").unwrap_or_else(|_| "postgres".to_string()),
            password: env::var("DATABASE_PASSWORD")
                .map_err(|_| SyncError::Configuration("Environment variable DATABASE_PASSWORD is not set".to_string()))?,
            database: env::var("DATABASE_NAME").unwrap_or_else(|_| "crm_erp".to_string()),
            ssl_mode: env::var("DATABASE_SSL_MODE").unwrap_or_else(|_| "prefer".to_string()),
            schema,
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
        })
    }

    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}?sslmode={}",
            self.username, self.password, self.host, self.port, self.database, self.ssl_mode
        )
    }
}

/// The schema name is interpolated into `SET search_path`, so only plain
/// identifiers are accepted.
pub fn validate_schema_name(schema: &str) -> Result<(), SyncError> {
    let mut chars = schema.chars();
    let valid_start = chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(SyncError::Configuration(format!("invalid schema name: {}", schema)));
    }
    Ok(())
}

pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    tracing::info!(
        "Initializing database connection (host={}, port={}, user={}, schema={})",
        config.host,
        config.port,
        config.username,
        config.schema
    );

    let search_path = format!("SET search_path TO {}", config.schema);
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .after_connect(move |conn, _meta| {
            let search_path = search_path.clone();
            Box::pin(async move {
                conn.execute(search_path.as_str()).await?;
                Ok(())
            })
        })
        .connect(&config.connection_string())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_names() {
        assert!(validate_schema_name("crm_staging").is_ok());
        assert!(validate_schema_name("_stage2").is_ok());
        assert!(validate_schema_name("2stage").is_err());
        assert!(validate_schema_name("stage; DROP TABLE x").is_err());
        assert!(validate_schema_name("").is_err());
    }
}
