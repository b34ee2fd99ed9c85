//! Cloud provider access: a list-valued resource whose items carry their
//! own upstream identity and move through create → authorize → deauthorize.
//!
//! Each pass lines the desired entries up against what upstream reports,
//! decides one action per item from its state, and runs the actions
//! independently so one failing item never blocks the others.

use tracing::Instrument;

use nimbus_core::models::{
    CloudProviderIntegration, CloudProviderRole, IntegrationState, IntegrationStatus, Project,
    RoleRequest,
};
use nimbus_core::{ConditionType, Reason};

use crate::client::Applied;
use crate::workflow::{Context, WorkflowResult};

const NOT_SYNCHRONIZED: &str = "not all items were synchronized successfully";
const NOT_AUTHORIZED: &str = "not all entries are authorized";

/// Result of one list pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOutcome {
    pub result: WorkflowResult,
    /// Every kept item is fully converged.
    pub ready: bool,
    /// Per-item statuses to persist. `None` when the pass never got far
    /// enough to know (the upstream list failed).
    pub items: Option<Vec<IntegrationStatus>>,
}

/// One fresh status per desired entry, in desired order.
pub fn initiate_statuses(specs: &[CloudProviderIntegration]) -> Vec<IntegrationStatus> {
    specs.iter().map(IntegrationStatus::new).collect()
}

/// Line desired statuses up against observed upstream roles.
///
/// 1. A desired item with a non-empty ARN takes the observed role with the
///    same ARN and provider.
/// 2. Unclaimed observed roles with an ARN are no longer wanted and get
///    appended for deauthorization.
/// 3. Unclaimed observed roles without an ARN (created, never authorized)
///    are handed out in observed order to the first still-unmatched desired
///    item of the same provider. Any left over are appended for
///    deauthorization too.
pub fn enrich_statuses(
    mut statuses: Vec<IntegrationStatus>,
    observed: &[CloudProviderRole],
) -> Vec<IntegrationStatus> {
    let mut claimed = vec![false; observed.len()];

    for status in statuses.iter_mut() {
        if status.iam_assumed_role_arn.is_empty() {
            continue;
        }
        let found = observed
            .iter()
            .enumerate()
            .find(|(i, role)| {
                !claimed[*i]
                    && role.iam_assumed_role_arn == status.iam_assumed_role_arn
                    && role.provider_name == status.provider_name
            });
        if let Some((i, role)) = found {
            status.absorb(role);
            claimed[i] = true;
        }
    }

    let mut orphans = Vec::new();
    let mut unbound = Vec::new();
    for (role, _) in observed.iter().zip(&claimed).filter(|(_, claimed)| !**claimed) {
        if role.iam_assumed_role_arn.is_empty() {
            unbound.push(role);
        } else {
            orphans.push(IntegrationStatus::orphaned(role));
        }
    }

    for role in unbound {
        let slot = statuses
            .iter_mut()
            .find(|s| !s.is_matched() && s.provider_name == role.provider_name);
        match slot {
            Some(status) => status.absorb(role),
            None => orphans.push(IntegrationStatus::orphaned(role)),
        }
    }

    statuses.extend(orphans);
    statuses
}

async fn create_role(ctx: &Context, project_id: &str, item: &mut IntegrationStatus) {
    let request = RoleRequest {
        provider_name: item.provider_name.clone(),
        iam_assumed_role_arn: None,
    };
    match ctx
        .call(ctx.client.create_cloud_provider_role(project_id, &request))
        .await
    {
        Ok(applied) => {
            if let Applied::Done(role) = &applied {
                item.absorb(role);
            }
            item.state = IntegrationState::Created;
            item.error_message.clear();
            tracing::info!(provider = %item.provider_name, role_id = %item.role_id, skipped = applied.is_skipped(), "role created");
        }
        Err(e) => {
            tracing::warn!(provider = %item.provider_name, error = %e, "role creation failed");
            item.fail(IntegrationState::FailedToCreate, e.to_string());
        }
    }
}

async fn authorize_role(ctx: &Context, project_id: &str, item: &mut IntegrationStatus) {
    let request = RoleRequest {
        provider_name: item.provider_name.clone(),
        iam_assumed_role_arn: Some(item.iam_assumed_role_arn.clone()),
    };
    match ctx
        .call(
            ctx.client
                .authorize_cloud_provider_role(project_id, &item.role_id, &request),
        )
        .await
    {
        Ok(applied) => {
            if let Applied::Done(role) = &applied {
                item.absorb(role);
            }
            item.state = IntegrationState::Authorized;
            item.error_message.clear();
            tracing::info!(role_id = %item.role_id, arn = %item.iam_assumed_role_arn, "role authorized");
        }
        Err(e) => {
            tracing::warn!(role_id = %item.role_id, error = %e, "role authorization failed");
            item.fail(IntegrationState::FailedToAuthorize, e.to_string());
        }
    }
}

/// `true` when the item is gone upstream and should be dropped.
async fn deauthorize_role(ctx: &Context, project_id: &str, item: &mut IntegrationStatus) -> bool {
    match ctx
        .call(ctx.client.deauthorize_cloud_provider_role(
            project_id,
            &item.provider_name,
            &item.role_id,
        ))
        .await
    {
        Ok(_) => {
            tracing::info!(role_id = %item.role_id, "role deauthorized");
            true
        }
        Err(e) => {
            tracing::warn!(role_id = %item.role_id, error = %e, "role deauthorization failed");
            item.fail(IntegrationState::FailedToDeAuthorize, e.to_string());
            false
        }
    }
}

/// One pass over the cloud provider access list of `project_id`.
pub async fn sync_cloud_provider_integrations(
    ctx: &Context,
    project_id: &str,
    specs: &[CloudProviderIntegration],
) -> ListOutcome {
    let observed = match ctx
        .call(ctx.client.list_cloud_provider_roles(project_id))
        .await
    {
        Ok(observed) => observed,
        Err(e) => {
            tracing::warn!(error = %e, "listing cloud provider access failed");
            return ListOutcome {
                result: WorkflowResult::terminate(
                    Reason::IntegrationsNotReady,
                    format!("unable to fetch cloud provider access: {e}"),
                ),
                ready: false,
                items: None,
            };
        }
    };

    let statuses = enrich_statuses(initiate_statuses(specs), &observed);
    let mut kept = Vec::with_capacity(statuses.len());
    let mut with_error = false;

    for mut item in statuses {
        match item.state {
            IntegrationState::New | IntegrationState::FailedToCreate => {
                create_role(ctx, project_id, &mut item).await;
            }
            IntegrationState::Created | IntegrationState::FailedToAuthorize => {
                // Upstream needs the ARN to authorize; without one the
                // entry waits for the user to fill it in.
                if !item.iam_assumed_role_arn.is_empty() {
                    authorize_role(ctx, project_id, &mut item).await;
                }
            }
            IntegrationState::DeAuthorize | IntegrationState::FailedToDeAuthorize => {
                if deauthorize_role(ctx, project_id, &mut item).await {
                    continue;
                }
            }
            IntegrationState::Authorized => {}
        }

        with_error |= item.state.is_failed();
        kept.push(item);
    }

    let ready = !with_error
        && kept
            .iter()
            .all(|item| item.state == IntegrationState::Authorized);
    let result = if with_error {
        WorkflowResult::terminate(Reason::IntegrationsNotReady, NOT_SYNCHRONIZED)
    } else {
        WorkflowResult::ok()
    };

    ListOutcome {
        result,
        ready,
        items: Some(kept),
    }
}

/// [`sync_cloud_provider_integrations`], then write per-item statuses and
/// the kind's condition.
///
/// A clean pass that still has unauthorized entries sets the condition
/// false without failing the pass.
pub async fn ensure_cloud_provider_integrations(
    ctx: &mut Context,
    project: &Project,
) -> WorkflowResult {
    let span = tracing::debug_span!(parent: &ctx.span, "ensure", kind = "cloud provider access");
    let specs = &project.spec.cloud_provider_integrations;
    let outcome = sync_cloud_provider_integrations(&*ctx, &project.id, specs)
        .instrument(span)
        .await;

    if let Some(items) = outcome.items {
        ctx.set_integration_statuses(items);
    }

    let condition = ConditionType::CloudProviderIntegrationReady;
    if !outcome.result.is_ok() {
        ctx.set_condition_from_result(condition, &outcome.result);
    } else if !outcome.ready {
        ctx.set_condition_false(condition, Reason::IntegrationsNotAuthorized, NOT_AUTHORIZED);
    } else if specs.is_empty() {
        ctx.unset_condition(condition);
    } else {
        ctx.set_condition_true(condition);
    }
    outcome.result
}
