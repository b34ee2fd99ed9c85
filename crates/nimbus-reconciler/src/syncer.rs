use std::fmt;

use tracing::Instrument;

use nimbus_core::compare::contained_in;
use nimbus_core::{ConditionType, Normalize, Reason, Subset};

use crate::client::{Applied, BoxFuture};
use crate::error::ApiError;
use crate::workflow::{Context, WorkflowResult};

/// One impl per scalar resource kind.
/// Each impl holds the project id and that kind's slice of the desired spec.
pub trait Synchronizer: Send + Sync {
    type Config: Subset + Normalize + Clone + fmt::Debug + Send + Sync;

    /// Human-readable kind name, used in messages ("project settings").
    fn kind(&self) -> &'static str;

    fn condition(&self) -> ConditionType;

    /// Reason reported when this kind fails.
    fn reason(&self) -> Reason;

    fn desired(&self) -> Option<&Self::Config>;

    /// Canonical "off" configuration. An absent desired or observed value
    /// stands for this one. `None` means the kind has no such form and an
    /// absent desired value asks for nothing.
    fn disabled(&self) -> Option<Self::Config> {
        None
    }

    /// Whether the desired value asks for anything at all. Decides between
    /// setting the kind's condition and clearing it once in sync.
    fn is_configured(&self) -> bool;

    /// Refuse to sync before contacting upstream.
    fn precheck(&self, _ctx: &Context) -> Result<(), String> {
        Ok(())
    }

    /// Read the current upstream value. `None` = nothing configured.
    fn fetch<'a>(&'a self, ctx: &'a Context) -> BoxFuture<'a, Result<Option<Self::Config>, ApiError>>;

    /// Replace the upstream value with `desired`.
    fn patch<'a>(
        &'a self,
        ctx: &'a Context,
        desired: &'a Self::Config,
    ) -> BoxFuture<'a, Result<Applied<Self::Config>, ApiError>>;
}

/// Converge one kind: fetch, compare, patch if the desired value is not
/// already contained in the observed one.
///
/// Issues at most one mutating call.
pub async fn sync<S: Synchronizer>(ctx: &Context, syncer: &S) -> WorkflowResult {
    if let Err(message) = syncer.precheck(ctx) {
        return WorkflowResult::terminate(syncer.reason(), message);
    }

    let observed = match syncer.fetch(ctx).await {
        Ok(observed) => observed,
        Err(e) => {
            tracing::warn!(kind = syncer.kind(), error = %e, "fetch failed");
            return WorkflowResult::terminate(
                syncer.reason(),
                format!("unable to fetch {}: {e}", syncer.kind()),
            );
        }
    };

    let observed = observed.or_else(|| syncer.disabled()).map(Normalize::normalize);
    let desired = syncer
        .desired()
        .cloned()
        .or_else(|| syncer.disabled())
        .map(Normalize::normalize);

    let Some(desired) = desired.filter(|d| !contained_in(Some(d), observed.as_ref())) else {
        tracing::debug!(kind = syncer.kind(), "in sync");
        return WorkflowResult::ok();
    };

    tracing::info!(kind = syncer.kind(), desired = ?desired, "patching");
    match syncer.patch(ctx, &desired).await {
        Ok(Applied::Done(_)) => {
            tracing::info!(kind = syncer.kind(), "patched");
            WorkflowResult::ok()
        }
        Ok(Applied::Skipped) => {
            tracing::debug!(kind = syncer.kind(), "patch suppressed");
            WorkflowResult::ok()
        }
        Err(e) => {
            tracing::warn!(kind = syncer.kind(), error = %e, "patch failed");
            WorkflowResult::terminate(
                syncer.reason(),
                format!("unable to update {}: {e}", syncer.kind()),
            )
        }
    }
}

/// [`sync`], then write the kind's condition.
///
/// Failure sets the condition from the result. Success sets it true when
/// the desired value configures something and clears it otherwise.
pub async fn ensure<S: Synchronizer>(ctx: &mut Context, syncer: &S) -> WorkflowResult {
    let span = tracing::debug_span!(parent: &ctx.span, "ensure", kind = syncer.kind());
    let result = sync(&*ctx, syncer).instrument(span).await;

    let condition = syncer.condition();
    if !result.is_ok() {
        ctx.set_condition_from_result(condition, &result);
    } else if syncer.is_configured() {
        ctx.set_condition_true(condition);
    } else {
        ctx.unset_condition(condition);
    }
    result
}
