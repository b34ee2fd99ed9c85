use std::fmt;

use serde::{Deserialize, Serialize};

/// Which part of the object a condition reports on.
///
/// `Ready` is the derived overall condition; the others map one-to-one to a
/// resource kind reconciled during a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConditionType {
    Ready,
    ProjectSettingsReady,
    AuditingReady,
    CloudProviderIntegrationReady,
}

impl ConditionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ready => "Ready",
            Self::ProjectSettingsReady => "ProjectSettingsReady",
            Self::AuditingReady => "AuditingReady",
            Self::CloudProviderIntegrationReady => "CloudProviderIntegrationReady",
        }
    }
}

impl fmt::Display for ConditionType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

/// Short machine-readable reason attached to a non-true condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reason {
    ProjectSettingsNotReady,
    AuditingNotReady,
    IntegrationsNotReady,
    IntegrationsNotAuthorized,
    ObjectInvalid,
    UpstreamUnavailable,
}

impl Reason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProjectSettingsNotReady => "ProjectSettingsNotReady",
            Self::AuditingNotReady => "AuditingNotReady",
            Self::IntegrationsNotReady => "IntegrationsNotReady",
            Self::IntegrationsNotAuthorized => "IntegrationsNotAuthorized",
            Self::ObjectInvalid => "ObjectInvalid",
            Self::UpstreamUnavailable => "UpstreamUnavailable",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted outcome of the last pass for one condition type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub condition_type: ConditionType,
    pub status: ConditionStatus,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub message: Option<String>,
    pub last_transition_time: jiff::Timestamp,
}

impl Condition {
    pub fn new(condition_type: ConditionType, status: ConditionStatus) -> Self {
        Self {
            condition_type,
            status,
            reason: None,
            message: None,
            last_transition_time: jiff::Timestamp::now(),
        }
    }

    pub fn truthy(condition_type: ConditionType) -> Self {
        Self::new(condition_type, ConditionStatus::True)
    }

    pub fn falsy(condition_type: ConditionType, reason: Reason, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            reason: Some(reason.as_str().to_string()),
            message: (!message.is_empty()).then_some(message),
            ..Self::new(condition_type, ConditionStatus::False)
        }
    }

    pub fn is_true(&self) -> bool {
        self.status == ConditionStatus::True
    }
}
