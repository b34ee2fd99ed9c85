use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use nimbus_core::models::ProjectStatus;
use nimbus_reconciler::{reconcile_object, CloudApi, HttpCloudApi};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
    pub status: ProjectStatus,
}

/// Run one real pass for a stored object and return its new status.
pub async fn reconcile_project(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ReconcileResponse>, ApiError> {
    let client: Arc<dyn CloudApi> = Arc::new(HttpCloudApi::new(
        state.config.base_url.clone(),
        state.transport.clone(),
    ));

    let outcome = reconcile_object(state.store.as_ref(), client, &state.config, &name).await?;

    Ok(Json(ReconcileResponse {
        ok: outcome.result.is_ok(),
        reason: outcome.result.reason().map(|r| r.to_string()),
        message: outcome.result.message().to_string(),
        status: outcome.status,
    }))
}
