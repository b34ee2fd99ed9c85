use std::fmt;

use serde::{Deserialize, Serialize};

/// One desired cloud provider access entry.
///
/// `iam_assumed_role_arn` is the natural key. It may be left empty: upstream
/// only learns the ARN once the role is authorized, so a fresh entry can
/// exist before the user knows which role it will bind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudProviderIntegration {
    pub provider_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub iam_assumed_role_arn: String,
}

/// A cloud provider access role as reported by upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudProviderRole {
    #[serde(default)]
    pub role_id: String,
    #[serde(default)]
    pub provider_name: String,
    #[serde(default)]
    pub iam_assumed_role_arn: String,
    #[serde(default)]
    pub account_arn: String,
    #[serde(default)]
    pub external_id: String,
    #[serde(default)]
    pub created_date: String,
    #[serde(default)]
    pub authorized_date: String,
}

impl CloudProviderRole {
    pub fn is_authorized(&self) -> bool {
        !self.authorized_date.is_empty()
    }
}

/// Payload for the create and authorize calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRequest {
    pub provider_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iam_assumed_role_arn: Option<String>,
}

/// Lifecycle of one list item. Only the outcome of an upstream call moves an
/// item between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntegrationState {
    New,
    Created,
    Authorized,
    FailedToCreate,
    FailedToAuthorize,
    DeAuthorize,
    FailedToDeAuthorize,
}

impl IntegrationState {
    pub fn is_failed(&self) -> bool {
        matches!(
            self,
            Self::FailedToCreate | Self::FailedToAuthorize | Self::FailedToDeAuthorize
        )
    }
}

impl fmt::Display for IntegrationState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Self::New => "New",
            Self::Created => "Created",
            Self::Authorized => "Authorized",
            Self::FailedToCreate => "FailedToCreate",
            Self::FailedToAuthorize => "FailedToAuthorize",
            Self::DeAuthorize => "DeAuthorize",
            Self::FailedToDeAuthorize => "FailedToDeAuthorize",
        };
        f.write_str(s)
    }
}

/// Per-item status written back to the owning object after every pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationStatus {
    pub provider_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub iam_assumed_role_arn: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub role_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub account_arn: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub external_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub created_date: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub authorized_date: String,
    pub state: IntegrationState,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error_message: String,
}

impl IntegrationStatus {
    /// Fresh status for a desired entry nothing upstream is known about yet.
    pub fn new(spec: &CloudProviderIntegration) -> Self {
        Self {
            provider_name: spec.provider_name.clone(),
            iam_assumed_role_arn: spec.iam_assumed_role_arn.clone(),
            role_id: String::new(),
            account_arn: String::new(),
            external_id: String::new(),
            created_date: String::new(),
            authorized_date: String::new(),
            state: IntegrationState::New,
            error_message: String::new(),
        }
    }

    /// Status for an upstream role no desired entry claims anymore.
    pub fn orphaned(role: &CloudProviderRole) -> Self {
        let mut status = Self::new(&CloudProviderIntegration {
            provider_name: role.provider_name.clone(),
            iam_assumed_role_arn: String::new(),
        });
        status.absorb(role);
        status.state = IntegrationState::DeAuthorize;
        status
    }

    /// Copy upstream identifiers into this item and derive its state from
    /// the upstream authorization marker.
    ///
    /// The ARN is only overwritten when upstream reports one; roles that
    /// are created but not authorized come back without it.
    pub fn absorb(&mut self, role: &CloudProviderRole) {
        if !role.iam_assumed_role_arn.is_empty() {
            self.iam_assumed_role_arn = role.iam_assumed_role_arn.clone();
        }
        self.role_id = role.role_id.clone();
        self.account_arn = role.account_arn.clone();
        self.external_id = role.external_id.clone();
        self.created_date = role.created_date.clone();
        self.authorized_date = role.authorized_date.clone();
        self.state = if role.is_authorized() {
            IntegrationState::Authorized
        } else {
            IntegrationState::Created
        };
    }

    pub fn is_matched(&self) -> bool {
        !self.role_id.is_empty()
    }

    pub fn fail(&mut self, state: IntegrationState, message: impl Into<String>) {
        self.state = state;
        self.error_message = message.into();
    }
}
