pub mod auditing;
pub mod project_settings;

pub use auditing::AuditingSynchronizer;
pub use project_settings::ProjectSettingsSynchronizer;
