mod common;

use nimbus_core::models::{CloudProviderRole, IntegrationState, ProjectSpec};
use nimbus_core::{ConditionStatus, ConditionType};
use nimbus_reconciler::integrations::{
    enrich_statuses, ensure_cloud_provider_integrations, initiate_statuses,
    sync_cloud_provider_integrations,
};

use common::{context, context_with_status, integration, project, FakeCloud};

fn role(role_id: &str, provider: &str, arn: &str, authorized: bool) -> CloudProviderRole {
    CloudProviderRole {
        role_id: role_id.to_string(),
        provider_name: provider.to_string(),
        iam_assumed_role_arn: arn.to_string(),
        authorized_date: if authorized { "2026-01-01".to_string() } else { String::new() },
        ..Default::default()
    }
}

fn states(items: &[nimbus_core::models::IntegrationStatus]) -> Vec<(String, IntegrationState)> {
    items
        .iter()
        .map(|i| (i.role_id.clone(), i.state))
        .collect()
}

#[test]
fn enrich_matches_by_arn_and_orphans_the_rest() {
    let desired = [integration("AWS", "arn:1"), integration("AWS", "arn:2")];
    let observed = [
        role("role-2", "AWS", "arn:2", true),
        role("role-3", "AWS", "arn:3", true),
        role("role-1", "AWS", "arn:1", false),
    ];

    let items = enrich_statuses(initiate_statuses(&desired), &observed);

    assert_eq!(
        states(&items),
        vec![
            ("role-1".to_string(), IntegrationState::Created),
            ("role-2".to_string(), IntegrationState::Authorized),
            ("role-3".to_string(), IntegrationState::DeAuthorize),
        ]
    );
    assert_eq!(items[2].iam_assumed_role_arn, "arn:3");
}

#[test]
fn enrich_pairs_unbound_roles_in_observed_order() {
    let desired = [
        integration("AWS", ""),
        integration("AWS", "arn:2"),
        integration("GCP", ""),
    ];
    let observed = [
        role("role-1", "AWS", "", false),
        role("role-2", "AWS", "", false),
        role("role-4", "AWS", "", false),
    ];

    let items = enrich_statuses(initiate_statuses(&desired), &observed);

    assert_eq!(
        states(&items),
        vec![
            ("role-1".to_string(), IntegrationState::Created),
            ("role-2".to_string(), IntegrationState::Created),
            (String::new(), IntegrationState::New),
            ("role-4".to_string(), IntegrationState::DeAuthorize),
        ]
    );
    // The desired ARN survives pairing with a role that has none yet.
    assert_eq!(items[1].iam_assumed_role_arn, "arn:2");
    assert_eq!(items[0].iam_assumed_role_arn, "");
}

#[test]
fn enrich_with_nothing_desired_deauthorizes_everything() {
    let observed = [role("role-1", "AWS", "arn:1", true), role("role-2", "AWS", "", false)];

    let items = enrich_statuses(Vec::new(), &observed);

    assert!(items
        .iter()
        .all(|i| i.state == IntegrationState::DeAuthorize));
    assert_eq!(items.len(), 2);
}

#[tokio::test]
async fn fresh_entries_converge_over_three_passes() {
    let fake = FakeCloud::new();
    let project = project(ProjectSpec {
        cloud_provider_integrations: vec![
            integration("AWS", "arn:aws:iam::1:role/a"),
            integration("AWS", "arn:aws:iam::1:role/b"),
        ],
        ..Default::default()
    });

    // Pass 1: nothing upstream; both entries get created.
    let mut ctx = context(&fake);
    let result = ensure_cloud_provider_integrations(&mut ctx, &project).await;
    assert!(result.is_ok());
    assert_eq!(fake.mutating_calls(), vec!["create AWS", "create AWS"]);
    let status = ctx.into_status();
    assert!(status
        .cloud_provider_integrations
        .iter()
        .all(|i| i.state == IntegrationState::Created));
    let condition = status
        .condition(ConditionType::CloudProviderIntegrationReady)
        .unwrap();
    assert_eq!(condition.status, ConditionStatus::False);
    assert_eq!(condition.reason.as_deref(), Some("IntegrationsNotAuthorized"));
    assert_eq!(condition.message.as_deref(), Some("not all entries are authorized"));

    // Pass 2: both listed without ARNs; paired in order and authorized.
    fake.clear_calls();
    let mut ctx = context_with_status(&fake, status);
    let result = ensure_cloud_provider_integrations(&mut ctx, &project).await;
    assert!(result.is_ok());
    assert_eq!(fake.mutating_calls(), vec!["authorize role-1", "authorize role-2"]);
    let status = ctx.into_status();
    assert!(status
        .condition(ConditionType::CloudProviderIntegrationReady)
        .unwrap()
        .is_true());
    let arns: Vec<_> = fake
        .state()
        .roles
        .iter()
        .map(|r| (r.role_id.clone(), r.iam_assumed_role_arn.clone()))
        .collect();
    assert_eq!(
        arns,
        vec![
            ("role-1".to_string(), "arn:aws:iam::1:role/a".to_string()),
            ("role-2".to_string(), "arn:aws:iam::1:role/b".to_string()),
        ]
    );

    // Pass 3: already converged.
    fake.clear_calls();
    let mut ctx = context_with_status(&fake, status);
    let result = ensure_cloud_provider_integrations(&mut ctx, &project).await;
    assert!(result.is_ok());
    assert!(fake.mutating_calls().is_empty());
}

#[tokio::test]
async fn dropped_entries_are_deauthorized_and_removed() {
    let fake = FakeCloud::new();
    fake.add_role("role-3", "AWS", "arn:3", true);
    let project = project(ProjectSpec::default());

    let mut ctx = context(&fake);
    let result = ensure_cloud_provider_integrations(&mut ctx, &project).await;

    assert!(result.is_ok());
    assert_eq!(fake.mutating_calls(), vec!["deauthorize role-3"]);
    let status = ctx.into_status();
    assert!(status.cloud_provider_integrations.is_empty());
    assert!(status
        .condition(ConditionType::CloudProviderIntegrationReady)
        .is_none());
}

#[tokio::test]
async fn one_failing_item_does_not_block_the_others() {
    let fake = FakeCloud::new();
    fake.add_role("role-1", "AWS", "", false);
    fake.add_role("role-9", "AWS", "arn:9", true);
    fake.fail("create:GCP", "service unavailable");
    let project = project(ProjectSpec {
        cloud_provider_integrations: vec![integration("AWS", "arn:1"), integration("GCP", "")],
        ..Default::default()
    });

    let ctx = context(&fake);
    let outcome = sync_cloud_provider_integrations(&ctx, "p1", &project.spec.cloud_provider_integrations).await;

    assert_eq!(
        fake.mutating_calls(),
        vec!["authorize role-1", "create GCP", "deauthorize role-9"]
    );
    assert!(!outcome.result.is_ok());
    assert_eq!(
        outcome.result.message(),
        "not all items were synchronized successfully"
    );
    assert!(!outcome.ready);

    let items = outcome.items.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].state, IntegrationState::Authorized);
    assert_eq!(items[1].state, IntegrationState::FailedToCreate);
    assert_eq!(items[1].error_message, "service unavailable");
}

#[tokio::test]
async fn one_failing_authorization_does_not_block_the_others() {
    let fake = FakeCloud::new();
    fake.add_role("role-1", "AWS", "", false);
    fake.add_role("role-2", "AWS", "", false);
    fake.add_role("role-3", "AWS", "", false);
    fake.fail("authorize:role-2", "role trust policy rejected");
    let project = project(ProjectSpec {
        cloud_provider_integrations: vec![
            integration("AWS", "arn:1"),
            integration("AWS", "arn:2"),
            integration("AWS", "arn:3"),
        ],
        ..Default::default()
    });

    let mut ctx = context(&fake);
    let result = ensure_cloud_provider_integrations(&mut ctx, &project).await;

    assert_eq!(
        fake.mutating_calls(),
        vec!["authorize role-1", "authorize role-2", "authorize role-3"]
    );
    assert!(!result.is_ok());
    assert_eq!(result.message(), "not all items were synchronized successfully");

    let status = ctx.into_status();
    assert_eq!(
        states(&status.cloud_provider_integrations),
        vec![
            ("role-1".to_string(), IntegrationState::Authorized),
            ("role-2".to_string(), IntegrationState::FailedToAuthorize),
            ("role-3".to_string(), IntegrationState::Authorized),
        ]
    );
    let failed = &status.cloud_provider_integrations[1];
    assert_eq!(failed.error_message, "role trust policy rejected");
    assert_eq!(failed.iam_assumed_role_arn, "arn:2");

    let condition = status
        .condition(ConditionType::CloudProviderIntegrationReady)
        .unwrap();
    assert_eq!(condition.status, ConditionStatus::False);
}

#[tokio::test]
async fn failed_deauthorization_is_kept_with_its_error() {
    let fake = FakeCloud::new();
    fake.add_role("role-3", "AWS", "arn:3", true);
    fake.fail("deauthorize:role-3", "forbidden");
    let project = project(ProjectSpec::default());

    let mut ctx = context(&fake);
    let result = ensure_cloud_provider_integrations(&mut ctx, &project).await;

    assert!(!result.is_ok());
    let status = ctx.into_status();
    assert_eq!(status.cloud_provider_integrations.len(), 1);
    let item = &status.cloud_provider_integrations[0];
    assert_eq!(item.state, IntegrationState::FailedToDeAuthorize);
    assert_eq!(item.error_message, "forbidden");
    assert_eq!(
        status
            .condition(ConditionType::CloudProviderIntegrationReady)
            .unwrap()
            .reason
            .as_deref(),
        Some("IntegrationsNotReady")
    );

    // Retried next pass once upstream recovers.
    fake.heal("deauthorize:role-3");
    fake.clear_calls();
    let mut ctx = context_with_status(&fake, status);
    let result = ensure_cloud_provider_integrations(&mut ctx, &project).await;
    assert!(result.is_ok());
    assert_eq!(fake.mutating_calls(), vec!["deauthorize role-3"]);
    assert!(ctx.into_status().cloud_provider_integrations.is_empty());
}

#[tokio::test]
async fn entry_without_arn_waits_in_created() {
    let fake = FakeCloud::new();
    fake.add_role("role-1", "AWS", "", false);
    let project = project(ProjectSpec {
        cloud_provider_integrations: vec![integration("AWS", "")],
        ..Default::default()
    });

    let mut ctx = context(&fake);
    let result = ensure_cloud_provider_integrations(&mut ctx, &project).await;

    assert!(result.is_ok());
    assert!(fake.mutating_calls().is_empty());
    let status = ctx.into_status();
    assert_eq!(status.cloud_provider_integrations[0].state, IntegrationState::Created);
    assert_eq!(status.cloud_provider_integrations[0].external_id, "");
}

#[tokio::test]
async fn list_failure_keeps_previous_item_statuses() {
    let fake = FakeCloud::new();
    fake.add_role("role-1", "AWS", "arn:1", true);
    let project = project(ProjectSpec {
        cloud_provider_integrations: vec![integration("AWS", "arn:1")],
        ..Default::default()
    });
    let mut ctx = context(&fake);
    ensure_cloud_provider_integrations(&mut ctx, &project).await;
    let status = ctx.into_status();

    fake.fail("list", "service unavailable");
    let mut ctx = context_with_status(&fake, status.clone());
    let result = ensure_cloud_provider_integrations(&mut ctx, &project).await;

    assert_eq!(
        result.message(),
        "unable to fetch cloud provider access: service unavailable"
    );
    let after = ctx.into_status();
    assert_eq!(after.cloud_provider_integrations, status.cloud_provider_integrations);
    assert_eq!(
        after
            .condition(ConditionType::CloudProviderIntegrationReady)
            .unwrap()
            .status,
        ConditionStatus::False
    );
}
