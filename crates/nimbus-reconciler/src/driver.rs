use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use nimbus_core::models::{Project, ProjectStatus};
use nimbus_core::{Condition, ConditionType, Reason};
use nimbus_dryrun::{DryRunTransport, PlannedAction, SimpleRecorder, Transport, VerbTable};

use crate::client::CloudApi;
use crate::config::ReconcilerConfig;
use crate::error::ReconcilerError;
use crate::http_client::HttpCloudApi;
use crate::integrations::ensure_cloud_provider_integrations;
use crate::store::{ObjectIndex, ObjectStore};
use crate::syncer::ensure;
use crate::syncers::{AuditingSynchronizer, ProjectSettingsSynchronizer};
use crate::workflow::{Context, WorkflowResult};

/// Result of [`reconcile_object`].
#[derive(Debug, Clone, PartialEq)]
pub struct PassOutcome {
    pub result: WorkflowResult,
    pub status: ProjectStatus,
}

/// What a dry run would have done.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DryRunReport {
    /// The object with the status the pass computed.
    pub object: Project,
    pub planned_actions: Vec<PlannedAction>,
}

/// One reconcile pass over every resource kind of `project`.
///
/// Kinds run in a fixed order (settings, auditing, cloud provider access)
/// and each one is attempted even when an earlier one failed. The returned
/// result is the first failure, or `Ok`. `Ready` is true only when every
/// kind condition that is set is true; otherwise it mirrors the first one
/// that is not.
pub async fn reconcile(ctx: &mut Context, project: &Project) -> WorkflowResult {
    if let Err(e) = project.validate() {
        tracing::warn!(project = %project.name, error = %e, "invalid object");
        let result = WorkflowResult::terminate(Reason::ObjectInvalid, e.to_string());
        ctx.set_condition_from_result(ConditionType::Ready, &result);
        return result;
    }

    let settings = ensure(ctx, &ProjectSettingsSynchronizer::new(project)).await;
    let auditing = ensure(ctx, &AuditingSynchronizer::new(project)).await;
    let integrations = ensure_cloud_provider_integrations(ctx, project).await;

    let result = [settings, auditing, integrations]
        .into_iter()
        .find(|r| !r.is_ok())
        .unwrap_or_else(WorkflowResult::ok);

    let not_ready = ctx
        .status()
        .conditions
        .iter()
        .find(|c| c.condition_type != ConditionType::Ready && !c.is_true())
        .cloned();
    match (&result, not_ready) {
        (WorkflowResult::Ok, None) => ctx.set_condition_true(ConditionType::Ready),
        (WorkflowResult::Ok, Some(blocking)) => ctx.set_condition(Condition {
            reason: blocking.reason,
            message: blocking.message,
            ..Condition::new(ConditionType::Ready, blocking.status)
        }),
        (failed, _) => ctx.set_condition_from_result(ConditionType::Ready, failed),
    }
    ctx.set_observed_generation(project.generation);

    tracing::info!(
        project = %project.name,
        ok = result.is_ok(),
        reason = ?result.reason(),
        "pass finished"
    );
    result
}

/// Load `name` from `store`, reconcile it, and write the status back.
pub async fn reconcile_object(
    store: &dyn ObjectStore,
    client: Arc<dyn CloudApi>,
    config: &ReconcilerConfig,
    name: &str,
) -> Result<PassOutcome, ReconcilerError> {
    run_pass(store, client, CancellationToken::new(), config, name).await
}

async fn run_pass(
    store: &dyn ObjectStore,
    client: Arc<dyn CloudApi>,
    cancel: CancellationToken,
    config: &ReconcilerConfig,
    name: &str,
) -> Result<PassOutcome, ReconcilerError> {
    let project = store
        .get(name)
        .await?
        .ok_or_else(|| ReconcilerError::ObjectNotFound {
            name: name.to_string(),
        })?;

    let span = tracing::info_span!("reconcile", project = %project.name, generation = project.generation);
    let mut ctx = Context::new(client, project.status.clone(), cancel)
        .with_span(span.clone())
        .with_timeout(config.pass_timeout())
        .with_features(config.features.clone());

    let result = reconcile(&mut ctx, &project).instrument(span).await;
    // The pass is over: stop the deadline timer and release any watch bodies.
    ctx.cancellation().cancel();
    let status = ctx.into_status();
    store
        .patch_status(name, &status)
        .await
        .map_err(|e| e.with_object(name))?;

    Ok(PassOutcome { result, status })
}

/// Run one pass for `project` without mutating anything upstream.
///
/// Reads go to `delegate`; every write is recorded and skipped. The
/// object itself is only written to a throwaway in-memory index. The pass
/// result is ignored: skipped calls count as success, so the report shows
/// what the pass would converge to.
pub async fn dry_run<T: Transport + 'static>(
    project: Project,
    delegate: T,
    config: &ReconcilerConfig,
) -> Result<DryRunReport, ReconcilerError> {
    let recorder = Arc::new(SimpleRecorder::new());
    let transport = DryRunTransport::new(delegate, recorder.clone(), VerbTable::default());
    let cancel = CancellationToken::new();
    let client = HttpCloudApi::new(config.base_url.clone(), transport).with_cancellation(cancel.clone());

    let index = ObjectIndex::new();
    let name = project.name.clone();
    index.upsert(project);

    let outcome = run_pass(&index, Arc::new(client), cancel, config, &name).await?;

    tracing::info!(
        project = %name,
        planned = recorder.len(),
        ok = outcome.result.is_ok(),
        "dry run finished"
    );

    let object = index
        .lookup(&name)
        .ok_or(ReconcilerError::ObjectNotFound { name })?;
    Ok(DryRunReport {
        object,
        planned_actions: recorder.snapshot(),
    })
}
