use std::collections::HashMap;

const PREFIX: &str = "FEATURE_";

/// Gates auditing filters. Filters are not validated upstream before being
/// applied, so they stay behind a flag.
pub const AUDIT_FILTER: &str = "FEATURE_AUDIT_FILTER";

/// Opt-in switches read from `FEATURE_*` environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureFlags {
    flags: HashMap<String, String>,
}

impl FeatureFlags {
    /// Build from `NAME=value` entries. Entries without `=` count as
    /// present with an empty value; everything not prefixed `FEATURE_` is
    /// ignored.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let flags = entries
            .into_iter()
            .filter_map(|entry| {
                let entry = entry.as_ref();
                if !entry.starts_with(PREFIX) {
                    return None;
                }
                let (name, value) = entry.split_once('=').unwrap_or((entry, ""));
                Some((name.to_string(), value.to_string()))
            })
            .collect();
        Self { flags }
    }

    pub fn from_env() -> Self {
        Self::from_entries(std::env::vars().map(|(k, v)| format!("{k}={v}")))
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.flags.contains_key(name)
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.flags.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}
