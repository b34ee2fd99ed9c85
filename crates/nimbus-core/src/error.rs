use thiserror::Error;

/// A declarative object that cannot be reconciled as written.
///
/// Surfaced to the user through the object's `Ready` condition; the outer
/// control loop retries it like any other failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("object name must not be empty")]
    EmptyName,

    #[error("project {name} has no upstream project id")]
    MissingProjectId { name: String },

    #[error("cloud provider integration #{index} has no provider name")]
    MissingProvider { index: usize },

    #[error("duplicate IAM role ARN in cloud provider integrations: {arn}")]
    DuplicateRoleArn { arn: String },
}
