use axum::extract::State;
use axum::Json;
use bytes::Bytes;

use nimbus_core::models::Project;
use nimbus_reconciler::{dry_run, DryRunReport};

use crate::error::ApiError;
use crate::state::AppState;

/// Run one pass for the posted object without changing anything upstream.
pub async fn plan(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<DryRunReport>, ApiError> {
    let project: Project = serde_json::from_slice(&body)?;
    tracing::info!(project = %project.name, "dry run requested");

    let report = dry_run(project, state.transport.clone(), &state.config).await?;
    Ok(Json(report))
}
