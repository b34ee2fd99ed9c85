use nimbus_core::models::{Auditing, CloudProviderRole, ProjectSettings, RoleRequest};

pub use nimbus_dryrun::transport::BoxFuture;

use crate::error::ApiError;

/// Outcome of a mutating upstream call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied<T> {
    /// The call went through; upstream returned its new representation.
    Done(T),
    /// The call was intentionally not sent (dry run). Treat as succeeded;
    /// there is no upstream representation to look at.
    Skipped,
}

impl<T> Applied<T> {
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped)
    }
}

/// Upstream cloud control API, one method per remote call.
///
/// Scalar resources get an idempotent replace; identity-bearing list
/// resources get separate create, authorize and deauthorize calls.
/// Methods return boxed futures for dyn compatibility.
pub trait CloudApi: Send + Sync {
    fn get_project_settings<'a>(
        &'a self,
        project_id: &'a str,
    ) -> BoxFuture<'a, Result<ProjectSettings, ApiError>>;

    fn update_project_settings<'a>(
        &'a self,
        project_id: &'a str,
        settings: &'a ProjectSettings,
    ) -> BoxFuture<'a, Result<Applied<ProjectSettings>, ApiError>>;

    /// `None` when upstream has no auditing configuration at all.
    fn get_auditing<'a>(
        &'a self,
        project_id: &'a str,
    ) -> BoxFuture<'a, Result<Option<Auditing>, ApiError>>;

    fn configure_auditing<'a>(
        &'a self,
        project_id: &'a str,
        auditing: &'a Auditing,
    ) -> BoxFuture<'a, Result<Applied<Auditing>, ApiError>>;

    fn list_cloud_provider_roles<'a>(
        &'a self,
        project_id: &'a str,
    ) -> BoxFuture<'a, Result<Vec<CloudProviderRole>, ApiError>>;

    fn create_cloud_provider_role<'a>(
        &'a self,
        project_id: &'a str,
        request: &'a RoleRequest,
    ) -> BoxFuture<'a, Result<Applied<CloudProviderRole>, ApiError>>;

    fn authorize_cloud_provider_role<'a>(
        &'a self,
        project_id: &'a str,
        role_id: &'a str,
        request: &'a RoleRequest,
    ) -> BoxFuture<'a, Result<Applied<CloudProviderRole>, ApiError>>;

    fn deauthorize_cloud_provider_role<'a>(
        &'a self,
        project_id: &'a str,
        provider_name: &'a str,
        role_id: &'a str,
    ) -> BoxFuture<'a, Result<Applied<()>, ApiError>>;
}
