use serde::{Deserialize, Serialize};

use crate::compare::{field_matches, Normalize, Subset};

/// Project-level feature toggles.
///
/// Every field is tri-state: `None` in a desired spec means "leave whatever
/// upstream has", so only explicitly set toggles participate in drift.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSettings {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub is_collect_database_specifics_statistics_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub is_data_explorer_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub is_performance_advisor_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub is_realtime_performance_panel_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub is_schema_advisor_enabled: Option<bool>,
}

impl ProjectSettings {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Subset for ProjectSettings {
    fn is_subset_of(&self, observed: &Self) -> bool {
        field_matches(
            &self.is_collect_database_specifics_statistics_enabled,
            &observed.is_collect_database_specifics_statistics_enabled,
        ) && field_matches(&self.is_data_explorer_enabled, &observed.is_data_explorer_enabled)
            && field_matches(
                &self.is_performance_advisor_enabled,
                &observed.is_performance_advisor_enabled,
            )
            && field_matches(
                &self.is_realtime_performance_panel_enabled,
                &observed.is_realtime_performance_panel_enabled,
            )
            && field_matches(&self.is_schema_advisor_enabled, &observed.is_schema_advisor_enabled)
    }
}

impl Normalize for ProjectSettings {
    fn normalize(self) -> Self {
        self
    }
}
