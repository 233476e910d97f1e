//! CRM → ERP staging sync.
//!
//! ```text
//! crm-erp-sync serve
//! crm-erp-sync load --companies companies.json --contacts contacts.json [--dry-run]
//! crm-erp-sync migrate
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::de::DeserializeOwned;
use sqlx::PgPool;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crm_erp_sync::config::{create_pool, AppConfig, SyncSettings};
use crm_erp_sync::create_app;
use crm_erp_sync::handlers::AppState;
use crm_erp_sync::repositories::{InMemoryStore, PgCrmRepository, PgErpRepository};
use crm_erp_sync::services::erp::TracingNotifier;
use crm_erp_sync::services::SyncOrchestrator;

#[derive(Parser, Debug)]
#[command(
    name = "crm-erp-sync",
    version,
    about = "Synchronize CRM companies and contacts into the ERP staging tables",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the sync HTTP API.
    Serve,

    /// Run one sync batch from JSON files.
    Load(LoadArgs),

    /// Apply the staging table migrations.
    Migrate,
}

#[derive(Args, Debug)]
struct LoadArgs {
    /// JSON array of company records.
    #[arg(long)]
    companies: Option<PathBuf>,

    /// JSON array of contact records.
    #[arg(long)]
    contacts: Option<PathBuf>,

    /// Run against an in-memory store instead of the database.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "crm_erp_sync=info,tower_http=info,sqlx=warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Serve => serve().await,
        Commands::Load(args) => load(args).await,
        Commands::Migrate => {
            let config = AppConfig::from_env()?;
            let pool = create_pool(&config.database).await?;
            migrate(&pool).await
        }
    }
}

async fn serve() -> Result<()> {
    let config = AppConfig::from_env()?;
    let pool = create_pool(&config.database).await?;
    migrate(&pool).await?;

    let orchestrator = postgres_orchestrator(pool, &config.sync);
    let app = create_app(AppState::new(orchestrator));

    let addr = config.server_address();
    tracing::info!("Starting CRM/ERP sync server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn load(args: LoadArgs) -> Result<()> {
    let companies = match &args.companies {
        Some(path) => read_records(path)?,
        None => Vec::new(),
    };
    let contacts = match &args.contacts {
        Some(path) => read_records(path)?,
        None => Vec::new(),
    };

    let orchestrator = if args.dry_run {
        tracing::info!("Dry run: records are synced into an in-memory store");
        let settings = SyncSettings::from_env()?;
        SyncOrchestrator::in_memory(Arc::new(InMemoryStore::new()), &settings)
    } else {
        let config = AppConfig::from_env()?;
        let pool = create_pool(&config.database).await?;
        postgres_orchestrator(pool, &config.sync)
    };

    let report = orchestrator.run(companies, contacts).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if report.has_failures() {
        anyhow::bail!("sync finished with failed records");
    }
    Ok(())
}

async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to apply staging migrations")?;
    tracing::info!("Staging tables are up to date");
    Ok(())
}

fn postgres_orchestrator(pool: PgPool, settings: &SyncSettings) -> SyncOrchestrator {
    let erp = Arc::new(PgErpRepository::new(pool.clone()));
    SyncOrchestrator::from_settings(
        Arc::new(PgCrmRepository::new(pool)),
        erp.clone(),
        erp,
        Arc::new(TracingNotifier),
        settings,
    )
}

fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}
