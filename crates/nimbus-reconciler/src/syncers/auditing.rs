use nimbus_core::models::{Auditing, Project};
use nimbus_core::{ConditionType, Reason};

use crate::client::{Applied, BoxFuture};
use crate::error::ApiError;
use crate::feature_flags::AUDIT_FILTER;
use crate::syncer::Synchronizer;
use crate::workflow::Context;

/// Database auditing. An absent or empty desired value means auditing off,
/// so an object that drops or empties its auditing block turns it off upstream.
pub struct AuditingSynchronizer {
    project_id: String,
    desired: Option<Auditing>,
}

impl AuditingSynchronizer {
    pub fn new(project: &Project) -> Self {
        Self {
            project_id: project.id.clone(),
            desired: project.spec.auditing.clone(),
        }
    }
}

impl Synchronizer for AuditingSynchronizer {
    type Config = Auditing;

    fn kind(&self) -> &'static str {
        "auditing"
    }

    fn condition(&self) -> ConditionType {
        ConditionType::AuditingReady
    }

    fn reason(&self) -> Reason {
        Reason::AuditingNotReady
    }

    fn desired(&self) -> Option<&Auditing> {
        self.desired.as_ref()
    }

    fn disabled(&self) -> Option<Auditing> {
        Some(Auditing::disabled())
    }

    fn is_configured(&self) -> bool {
        self.desired.as_ref().is_some_and(|a| !a.is_empty())
    }

    fn precheck(&self, ctx: &Context) -> Result<(), String> {
        let has_filter = self
            .desired
            .as_ref()
            .is_some_and(|a| a.audit_filter.as_deref().is_some_and(|f| !f.trim().is_empty()));
        if has_filter && !ctx.features.is_enabled(AUDIT_FILTER) {
            return Err(format!(
                "auditFilter is set but the {AUDIT_FILTER} feature flag is missing"
            ));
        }
        Ok(())
    }

    fn fetch<'a>(&'a self, ctx: &'a Context) -> BoxFuture<'a, Result<Option<Auditing>, ApiError>> {
        Box::pin(async move { ctx.call(ctx.client.get_auditing(&self.project_id)).await })
    }

    fn patch<'a>(
        &'a self,
        ctx: &'a Context,
        desired: &'a Auditing,
    ) -> BoxFuture<'a, Result<Applied<Auditing>, ApiError>> {
        Box::pin(async move {
            ctx.call(ctx.client.configure_auditing(&self.project_id, desired))
                .await
        })
    }
}
