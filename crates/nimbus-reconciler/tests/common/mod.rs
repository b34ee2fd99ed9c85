#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;

use nimbus_core::models::{
    Auditing, CloudProviderIntegration, CloudProviderRole, Project, ProjectSettings, ProjectSpec,
    ProjectStatus, RoleRequest,
};
use nimbus_reconciler::client::BoxFuture;
use nimbus_reconciler::{ApiError, Applied, CloudApi, Context};

pub const AUTHORIZED_AT: &str = "2026-01-01T00:00:00Z";
pub const CREATED_AT: &str = "2025-12-31T00:00:00Z";

/// In-memory upstream that behaves like the real API: created roles come
/// back without an ARN until they are authorized.
#[derive(Default)]
pub struct FakeCloud {
    state: Mutex<FakeState>,
}

#[derive(Default)]
pub struct FakeState {
    pub settings: ProjectSettings,
    pub auditing: Option<Auditing>,
    pub roles: Vec<CloudProviderRole>,
    pub next_role: usize,
    pub calls: Vec<String>,
    /// Operation key → error message. Keys: `get_settings`,
    /// `update_settings`, `get_auditing`, `configure_auditing`, `list`,
    /// `create:<provider>`, `authorize:<role id>`, `deauthorize:<role id>`.
    pub failures: HashMap<String, String>,
}

impl FakeCloud {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_state(f: impl FnOnce(&mut FakeState)) -> Arc<Self> {
        let fake = Self::default();
        f(&mut fake.state.lock().unwrap());
        Arc::new(fake)
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn fail(&self, key: &str, message: &str) {
        self.state().failures.insert(key.to_string(), message.to_string());
    }

    pub fn heal(&self, key: &str) {
        self.state().failures.remove(key);
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    /// Calls that would change something upstream.
    pub fn mutating_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| !c.starts_with("get ") && !c.starts_with("list"))
            .collect()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    pub fn add_role(&self, role_id: &str, provider: &str, arn: &str, authorized: bool) {
        self.state().roles.push(CloudProviderRole {
            role_id: role_id.to_string(),
            provider_name: provider.to_string(),
            iam_assumed_role_arn: arn.to_string(),
            created_date: CREATED_AT.to_string(),
            authorized_date: if authorized { AUTHORIZED_AT.to_string() } else { String::new() },
            ..Default::default()
        });
    }
}

impl FakeState {
    fn record(&mut self, call: String, key: &str) -> Result<(), ApiError> {
        self.calls.push(call);
        match self.failures.get(key) {
            Some(message) => Err(ApiError::Upstream(message.clone())),
            None => Ok(()),
        }
    }
}

fn merge(current: &mut Option<bool>, want: Option<bool>) {
    if want.is_some() {
        *current = want;
    }
}

impl CloudApi for FakeCloud {
    fn get_project_settings<'a>(
        &'a self,
        _project_id: &'a str,
    ) -> BoxFuture<'a, Result<ProjectSettings, ApiError>> {
        Box::pin(async move {
            let mut state = self.state();
            state.record("get settings".into(), "get_settings")?;
            Ok(state.settings.clone())
        })
    }

    fn update_project_settings<'a>(
        &'a self,
        _project_id: &'a str,
        settings: &'a ProjectSettings,
    ) -> BoxFuture<'a, Result<Applied<ProjectSettings>, ApiError>> {
        Box::pin(async move {
            let mut state = self.state();
            state.record("update settings".into(), "update_settings")?;
            let current = &mut state.settings;
            merge(&mut current.is_collect_database_specifics_statistics_enabled, settings.is_collect_database_specifics_statistics_enabled);
            merge(&mut current.is_data_explorer_enabled, settings.is_data_explorer_enabled);
            merge(&mut current.is_performance_advisor_enabled, settings.is_performance_advisor_enabled);
            merge(&mut current.is_realtime_performance_panel_enabled, settings.is_realtime_performance_panel_enabled);
            merge(&mut current.is_schema_advisor_enabled, settings.is_schema_advisor_enabled);
            Ok(Applied::Done(current.clone()))
        })
    }

    fn get_auditing<'a>(
        &'a self,
        _project_id: &'a str,
    ) -> BoxFuture<'a, Result<Option<Auditing>, ApiError>> {
        Box::pin(async move {
            let mut state = self.state();
            state.record("get auditing".into(), "get_auditing")?;
            Ok(state.auditing.clone())
        })
    }

    fn configure_auditing<'a>(
        &'a self,
        _project_id: &'a str,
        auditing: &'a Auditing,
    ) -> BoxFuture<'a, Result<Applied<Auditing>, ApiError>> {
        Box::pin(async move {
            let mut state = self.state();
            state.record("configure auditing".into(), "configure_auditing")?;
            let stored = Auditing {
                configuration_type: Some("FilterJson".to_string()),
                ..auditing.clone()
            };
            state.auditing = Some(stored.clone());
            Ok(Applied::Done(stored))
        })
    }

    fn list_cloud_provider_roles<'a>(
        &'a self,
        _project_id: &'a str,
    ) -> BoxFuture<'a, Result<Vec<CloudProviderRole>, ApiError>> {
        Box::pin(async move {
            let mut state = self.state();
            state.record("list roles".into(), "list")?;
            Ok(state.roles.clone())
        })
    }

    fn create_cloud_provider_role<'a>(
        &'a self,
        _project_id: &'a str,
        request: &'a RoleRequest,
    ) -> BoxFuture<'a, Result<Applied<CloudProviderRole>, ApiError>> {
        Box::pin(async move {
            let mut state = self.state();
            let provider = &request.provider_name;
            state.record(format!("create {provider}"), &format!("create:{provider}"))?;
            state.next_role += 1;
            let role = CloudProviderRole {
                role_id: format!("role-{}", state.next_role),
                provider_name: provider.clone(),
                external_id: format!("ext-{}", state.next_role),
                created_date: CREATED_AT.to_string(),
                ..Default::default()
            };
            state.roles.push(role.clone());
            Ok(Applied::Done(role))
        })
    }

    fn authorize_cloud_provider_role<'a>(
        &'a self,
        _project_id: &'a str,
        role_id: &'a str,
        request: &'a RoleRequest,
    ) -> BoxFuture<'a, Result<Applied<CloudProviderRole>, ApiError>> {
        Box::pin(async move {
            let mut state = self.state();
            state.record(format!("authorize {role_id}"), &format!("authorize:{role_id}"))?;
            let role = state
                .roles
                .iter_mut()
                .find(|r| r.role_id == role_id)
                .ok_or_else(|| ApiError::Status {
                    status: 404,
                    body: format!("no role {role_id}"),
                })?;
            role.iam_assumed_role_arn = request.iam_assumed_role_arn.clone().unwrap_or_default();
            role.authorized_date = AUTHORIZED_AT.to_string();
            Ok(Applied::Done(role.clone()))
        })
    }

    fn deauthorize_cloud_provider_role<'a>(
        &'a self,
        _project_id: &'a str,
        _provider_name: &'a str,
        role_id: &'a str,
    ) -> BoxFuture<'a, Result<Applied<()>, ApiError>> {
        Box::pin(async move {
            let mut state = self.state();
            state.record(format!("deauthorize {role_id}"), &format!("deauthorize:{role_id}"))?;
            state.roles.retain(|r| r.role_id != role_id);
            Ok(Applied::Done(()))
        })
    }
}

pub fn project(spec: ProjectSpec) -> Project {
    Project {
        name: "orders".to_string(),
        id: "p1".to_string(),
        generation: 1,
        spec,
        status: ProjectStatus::default(),
    }
}

pub fn integration(provider: &str, arn: &str) -> CloudProviderIntegration {
    CloudProviderIntegration {
        provider_name: provider.to_string(),
        iam_assumed_role_arn: arn.to_string(),
    }
}

pub fn context(fake: &Arc<FakeCloud>) -> Context {
    context_with_status(fake, ProjectStatus::default())
}

pub fn context_with_status(fake: &Arc<FakeCloud>, status: ProjectStatus) -> Context {
    let client: Arc<dyn CloudApi> = fake.clone();
    Context::new(client, status, CancellationToken::new())
}
