// ============================================================================
// Sync API Handlers
// ============================================================================

use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Json},
    Extension,
};
use tracing::Instrument;
use uuid::Uuid;

use super::AppState;
use crate::middleware::error_handling::{AppError, Result};
use crate::models::SyncPayload;
use crate::services::RunReport;

const MAX_PAYLOAD_SIZE: usize = 1_048_576;

/// Runs one sync batch.
/// POST /api/sync
///
/// Accepts a plain `{companies, contacts}` batch, a CloudEvent wrapping one
/// in `data`, or either of those JSON-encoded as a string. Per-record
/// failures are part of the 200 report; only unusable payloads and fatal
/// errors produce an error status.
pub async fn run_sync(
    State(state): State<AppState>,
    request_id: Option<Extension<Uuid>>,
    body: Bytes,
) -> Result<Json<RunReport>> {
    if body.len() > MAX_PAYLOAD_SIZE {
        return Err(AppError::BadRequest("Payload exceeds 1MB limit".to_string()));
    }

    let batch = SyncPayload::from_slice(&body)?;
    let run_id = request_id.map(|Extension(id)| id).unwrap_or_else(Uuid::new_v4);
    let span = tracing::info_span!("sync_run", run_id = %run_id);

    tracing::info!(
        parent: &span,
        "Received sync batch ({} companies, {} contacts)",
        batch.companies.len(),
        batch.contacts.len()
    );

    let report = state.orchestrator.run_batch(batch).instrument(span).await?;
    Ok(Json(report))
}

/// GET /api/health
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "crm_erp_sync",
        "timestamp": chrono::Utc::now(),
    }))
}
