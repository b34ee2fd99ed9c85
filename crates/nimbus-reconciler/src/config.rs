use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ReconcilerError;
use crate::feature_flags::FeatureFlags;

/// Current config version. v1 is the first schema. Bump this when a field
/// changes meaning or shape; each bump requires a step in [`migrate`].
const CURRENT_VERSION: u32 = 1;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PASS_TIMEOUT_SECS: u64 = 300;

pub const ENV_BASE_URL: &str = "NIMBUS_BASE_URL";
pub const ENV_CONFIG: &str = "NIMBUS_CONFIG";
pub const ENV_LISTEN: &str = "NIMBUS_LISTEN";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    /// Schema version. Missing = the current one.
    #[serde(default = "current_version")]
    pub config_version: u32,
    /// Upstream API root, e.g. `https://cloud.example.com/api/v2`.
    pub base_url: String,
    /// Per-request timeout of the HTTP transport.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Upper bound for one whole reconcile pass.
    #[serde(default = "default_pass_timeout_secs")]
    pub pass_timeout_secs: u64,
    /// Directory of the file object store.
    #[serde(default = "default_store_dir")]
    pub store_dir: PathBuf,
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// Read from the environment, never from the file.
    #[serde(skip)]
    pub features: FeatureFlags,
}

fn current_version() -> u32 {
    CURRENT_VERSION
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_pass_timeout_secs() -> u64 {
    DEFAULT_PASS_TIMEOUT_SECS
}

fn default_store_dir() -> PathBuf {
    PathBuf::from("objects")
}

fn default_listen_addr() -> String {
    "127.0.0.1:8080".to_string()
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            config_version: CURRENT_VERSION,
            base_url: String::new(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            pass_timeout_secs: DEFAULT_PASS_TIMEOUT_SECS,
            store_dir: default_store_dir(),
            listen_addr: default_listen_addr(),
            features: FeatureFlags::default(),
        }
    }
}

impl ReconcilerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn pass_timeout(&self) -> Duration {
        Duration::from_secs(self.pass_timeout_secs)
    }

    /// Apply `NIMBUS_*` overrides. `lookup` is usually `std::env::var`.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(base_url) = lookup(ENV_BASE_URL).filter(|v| !v.is_empty()) {
            self.base_url = base_url;
        }
        if let Some(listen_addr) = lookup(ENV_LISTEN).filter(|v| !v.is_empty()) {
            self.listen_addr = listen_addr;
        }
        self
    }

    pub fn with_features(mut self, features: FeatureFlags) -> Self {
        self.features = features;
        self
    }

    pub fn validate(&self) -> Result<(), ReconcilerError> {
        if self.base_url.trim().is_empty() {
            return Err(ReconcilerError::Config("base_url is empty".to_string()));
        }
        if self.request_timeout_secs == 0 || self.pass_timeout_secs == 0 {
            return Err(ReconcilerError::Config("timeouts must be positive".to_string()));
        }
        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<ReconcilerConfig, ReconcilerError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        ReconcilerError::Config(format!("failed to read config at {}: {e}", path.display()))
    })?;

    // Parse as raw JSON so we can run migrations before deserializing.
    let json: serde_json::Value = serde_json::from_str(&contents)?;
    parse_config(json)
}

/// Migrate a raw config document and deserialize it.
pub fn parse_config(json: serde_json::Value) -> Result<ReconcilerConfig, ReconcilerError> {
    let on_disk_version = json
        .get("config_version")
        .and_then(|v| v.as_u64())
        .map_or(CURRENT_VERSION, |v| u32::try_from(v).unwrap_or(u32::MAX));

    let migrated = migrate(json, on_disk_version)?;
    Ok(serde_json::from_value(migrated)?)
}

/// Bring a raw config from `from_version` up to [`CURRENT_VERSION`].
///
/// Steps are pure transforms on the raw JSON value; v1 needs none yet.
/// A config written by a newer build is refused rather than half-read.
fn migrate(json: serde_json::Value, from_version: u32) -> Result<serde_json::Value, ReconcilerError> {
    if from_version > CURRENT_VERSION {
        return Err(ReconcilerError::Config(format!(
            "config_version {from_version} is newer than this build supports ({CURRENT_VERSION})"
        )));
    }
    if !json.is_object() {
        return Err(ReconcilerError::Config("config is not a JSON object".to_string()));
    }

    tracing::debug!(from_version, "config is current");
    Ok(json)
}

pub fn save_config(path: &Path, config: &ReconcilerConfig) -> Result<(), ReconcilerError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }

    // Always write the current version, regardless of what was loaded.
    let mut stamped = config.clone();
    stamped.config_version = CURRENT_VERSION;

    let json = serde_json::to_string_pretty(&stamped)?;
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, json.as_bytes())?;
    std::fs::rename(&tmp_path, path)?;

    tracing::info!(path = %path.display(), "config saved");
    Ok(())
}
