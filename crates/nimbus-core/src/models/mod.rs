pub mod auditing;
pub mod integration;
pub mod project;
pub mod settings;

pub use auditing::Auditing;
pub use integration::{
    CloudProviderIntegration, CloudProviderRole, IntegrationState, IntegrationStatus, RoleRequest,
};
pub use project::{Project, ProjectSpec, ProjectStatus};
pub use settings::ProjectSettings;
