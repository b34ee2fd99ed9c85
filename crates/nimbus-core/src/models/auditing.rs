use serde::{Deserialize, Serialize};

use crate::compare::{field_matches, Normalize, Subset};

/// Database auditing configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Auditing {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub audit_authorization_success: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub audit_filter: Option<String>,
    /// Set by upstream only; never part of a desired spec.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub configuration_type: Option<String>,
}

impl Auditing {
    /// The canonical "auditing off" configuration. A missing or empty
    /// desired spec and a missing upstream configuration fold into this value.
    pub fn disabled() -> Self {
        Self {
            enabled: Some(false),
            audit_authorization_success: Some(false),
            ..Self::default()
        }
    }

    /// No field asks for anything. `configuration_type` does not count.
    pub fn is_empty(&self) -> bool {
        self.enabled.is_none()
            && self.audit_authorization_success.is_none()
            && self
                .audit_filter
                .as_deref()
                .is_none_or(|f| f.trim().is_empty())
    }
}

impl Normalize for Auditing {
    /// An empty block is the disabled form.
    fn normalize(self) -> Self {
        if self.is_empty() {
            return Self::disabled();
        }
        Self {
            audit_filter: self
                .audit_filter
                .map(|f| f.trim().to_string())
                .filter(|f| !f.is_empty()),
            configuration_type: None,
            ..self
        }
    }
}

impl Subset for Auditing {
    fn is_subset_of(&self, observed: &Self) -> bool {
        field_matches(&self.enabled, &observed.enabled)
            && field_matches(
                &self.audit_authorization_success,
                &observed.audit_authorization_success,
            )
            && field_matches(&self.audit_filter, &observed.audit_filter)
    }
}
