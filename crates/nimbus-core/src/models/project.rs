use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::condition::{Condition, ConditionType};
use crate::error::ValidationError;
use crate::models::auditing::Auditing;
use crate::models::integration::{CloudProviderIntegration, IntegrationStatus};
use crate::models::settings::ProjectSettings;

/// The declarative object: one managed upstream project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub name: String,
    /// Upstream project identifier.
    #[serde(default)]
    pub id: String,
    /// Bumped by the object store on every spec edit.
    #[serde(default)]
    pub generation: u64,
    #[serde(default)]
    pub spec: ProjectSpec,
    #[serde(default)]
    pub status: ProjectStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<ProjectSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auditing: Option<Auditing>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cloud_provider_integrations: Vec<CloudProviderIntegration>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cloud_provider_integrations: Vec<IntegrationStatus>,
    #[serde(default)]
    pub observed_generation: u64,
}

impl Project {
    /// Reject objects that cannot be reconciled as written.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.id.trim().is_empty() {
            return Err(ValidationError::MissingProjectId {
                name: self.name.clone(),
            });
        }

        let mut seen = HashSet::new();
        for (index, integration) in self.spec.cloud_provider_integrations.iter().enumerate() {
            if integration.provider_name.trim().is_empty() {
                return Err(ValidationError::MissingProvider { index });
            }
            let arn = &integration.iam_assumed_role_arn;
            if !arn.is_empty() && !seen.insert(arn.as_str()) {
                return Err(ValidationError::DuplicateRoleArn { arn: arn.clone() });
            }
        }

        Ok(())
    }
}

impl ProjectStatus {
    pub fn condition(&self, condition_type: ConditionType) -> Option<&Condition> {
        self.conditions
            .iter()
            .find(|c| c.condition_type == condition_type)
    }

    /// Insert or overwrite the condition of the same type.
    ///
    /// The transition time only moves when the status value flips.
    pub fn set_condition(&mut self, mut condition: Condition) {
        match self
            .conditions
            .iter_mut()
            .find(|c| c.condition_type == condition.condition_type)
        {
            Some(existing) => {
                if existing.status == condition.status {
                    condition.last_transition_time = existing.last_transition_time;
                }
                *existing = condition;
            }
            None => self.conditions.push(condition),
        }
    }

    pub fn unset_condition(&mut self, condition_type: ConditionType) {
        self.conditions.retain(|c| c.condition_type != condition_type);
    }
}
