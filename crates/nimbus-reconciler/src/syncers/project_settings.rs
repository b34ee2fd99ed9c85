use nimbus_core::models::{Project, ProjectSettings};
use nimbus_core::{ConditionType, Reason};

use crate::client::{Applied, BoxFuture};
use crate::error::ApiError;
use crate::syncer::Synchronizer;
use crate::workflow::Context;

/// Project-level feature toggles. Fields left unset in the desired value
/// are not managed.
pub struct ProjectSettingsSynchronizer {
    project_id: String,
    desired: Option<ProjectSettings>,
}

impl ProjectSettingsSynchronizer {
    pub fn new(project: &Project) -> Self {
        Self {
            project_id: project.id.clone(),
            desired: project.spec.settings.clone(),
        }
    }
}

impl Synchronizer for ProjectSettingsSynchronizer {
    type Config = ProjectSettings;

    fn kind(&self) -> &'static str {
        "project settings"
    }

    fn condition(&self) -> ConditionType {
        ConditionType::ProjectSettingsReady
    }

    fn reason(&self) -> Reason {
        Reason::ProjectSettingsNotReady
    }

    fn desired(&self) -> Option<&ProjectSettings> {
        self.desired.as_ref()
    }

    fn is_configured(&self) -> bool {
        self.desired.as_ref().is_some_and(|s| !s.is_empty())
    }

    fn fetch<'a>(&'a self, ctx: &'a Context) -> BoxFuture<'a, Result<Option<ProjectSettings>, ApiError>> {
        Box::pin(async move {
            let settings = ctx
                .call(ctx.client.get_project_settings(&self.project_id))
                .await?;
            Ok(Some(settings))
        })
    }

    fn patch<'a>(
        &'a self,
        ctx: &'a Context,
        desired: &'a ProjectSettings,
    ) -> BoxFuture<'a, Result<Applied<ProjectSettings>, ApiError>> {
        Box::pin(async move {
            ctx.call(ctx.client.update_project_settings(&self.project_id, desired))
                .await
        })
    }
}
