mod common;

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use nimbus_core::models::ProjectStatus;
use nimbus_core::{ConditionStatus, ConditionType, Reason};
use nimbus_dryrun::watch::blocking_watch_response;
use nimbus_reconciler::{ApiError, CloudApi, Context, WorkflowResult};

use common::FakeCloud;

fn bare_context(cancel: CancellationToken) -> Context {
    let client: Arc<dyn CloudApi> = FakeCloud::new();
    Context::new(client, ProjectStatus::default(), cancel)
}

async fn never() -> Result<(), ApiError> {
    tokio::time::sleep(Duration::from_secs(3600)).await;
    Ok(())
}

#[tokio::test]
async fn call_returns_the_inner_result() {
    let ctx = bare_context(CancellationToken::new());
    let value = ctx.call(async { Ok::<_, ApiError>(7) }).await.unwrap();
    assert_eq!(value, 7);
}

#[tokio::test]
async fn call_stops_when_the_pass_is_cancelled() {
    let cancel = CancellationToken::new();
    let ctx = bare_context(cancel.clone());
    cancel.cancel();

    let err = ctx.call(never()).await.unwrap_err();
    assert!(matches!(err, ApiError::Cancelled));
}

#[tokio::test]
async fn call_stops_at_the_deadline() {
    let ctx = bare_context(CancellationToken::new()).with_timeout(Duration::from_millis(20));

    let err = ctx.call(never()).await.unwrap_err();
    assert!(matches!(err, ApiError::DeadlineExceeded));
}

#[tokio::test]
async fn deadline_cancels_the_pass_token() {
    let ctx = bare_context(CancellationToken::new()).with_timeout(Duration::from_millis(20));
    let watch = blocking_watch_response(ctx.cancellation().clone());

    let body = tokio::time::timeout(Duration::from_secs(5), watch.into_body().collect())
        .await
        .expect("watch body should end at the deadline")
        .unwrap();
    assert!(body.is_empty());
    assert!(ctx.cancellation().is_cancelled());
}

#[tokio::test]
async fn cancelling_before_the_deadline_reports_cancelled() {
    let cancel = CancellationToken::new();
    let ctx = bare_context(cancel.clone()).with_timeout(Duration::from_secs(3600));
    cancel.cancel();

    let err = ctx.call(never()).await.unwrap_err();
    assert!(matches!(err, ApiError::Cancelled));
}

#[test]
fn results_map_to_conditions() {
    let mut ctx = bare_context(CancellationToken::new());

    ctx.set_condition_from_result(ConditionType::ProjectSettingsReady, &WorkflowResult::ok());
    ctx.set_condition_from_result(
        ConditionType::AuditingReady,
        &WorkflowResult::terminate(Reason::AuditingNotReady, "boom"),
    );
    ctx.set_condition_from_result(
        ConditionType::CloudProviderIntegrationReady,
        &WorkflowResult::requeue(Duration::from_secs(30), Reason::IntegrationsNotReady, "waiting"),
    );

    let status = ctx.status();
    assert!(status
        .condition(ConditionType::ProjectSettingsReady)
        .unwrap()
        .is_true());

    let auditing = status.condition(ConditionType::AuditingReady).unwrap();
    assert_eq!(auditing.status, ConditionStatus::False);
    assert_eq!(auditing.reason.as_deref(), Some("AuditingNotReady"));
    assert_eq!(auditing.message.as_deref(), Some("boom"));

    let integrations = status
        .condition(ConditionType::CloudProviderIntegrationReady)
        .unwrap();
    assert_eq!(integrations.status, ConditionStatus::Unknown);
    assert_eq!(integrations.message.as_deref(), Some("waiting"));
}

#[test]
fn unset_removes_only_that_condition() {
    let mut ctx = bare_context(CancellationToken::new());
    ctx.set_condition_true(ConditionType::AuditingReady);
    ctx.set_condition_false(ConditionType::ProjectSettingsReady, Reason::ProjectSettingsNotReady, "x");

    ctx.unset_condition(ConditionType::AuditingReady);

    let status = ctx.into_status();
    assert_eq!(status.conditions.len(), 1);
    assert_eq!(status.conditions[0].condition_type, ConditionType::ProjectSettingsReady);
}

#[test]
fn result_accessors() {
    let requeue = WorkflowResult::requeue(Duration::from_secs(5), Reason::UpstreamUnavailable, "later");
    assert!(!requeue.is_ok());
    assert_eq!(requeue.requeue_after(), Some(Duration::from_secs(5)));
    assert_eq!(requeue.reason(), Some(Reason::UpstreamUnavailable));
    assert_eq!(WorkflowResult::ok().message(), "");
    assert_eq!(WorkflowResult::ok().reason(), None);
}
