//! nimbus-reconciler
//!
//! Convergence engine for managed cloud projects.
//!
//! Public API:
//! - `reconcile()`: one pass over every resource kind of a project
//! - `reconcile_object()`: load from an object store → reconcile → persist status
//! - `dry_run()`: the same pass behind a dry-run transport, returning the
//!   planned actions instead of performing them
//! - `syncer::ensure()`: converge one scalar resource kind
//! - `integrations::ensure_cloud_provider_integrations()`: converge the
//!   list-valued cloud provider access entries

pub mod client;
pub mod config;
pub mod driver;
pub mod error;
pub mod feature_flags;
pub mod http_client;
pub mod integrations;
pub mod persistence;
pub mod store;
pub mod syncer;
pub mod syncers;
pub mod workflow;

pub use crate::client::{Applied, CloudApi};
pub use crate::config::ReconcilerConfig;
pub use crate::driver::{dry_run, reconcile, reconcile_object, DryRunReport, PassOutcome};
pub use crate::error::{ApiError, ReconcilerError};
pub use crate::feature_flags::FeatureFlags;
pub use crate::http_client::HttpCloudApi;
pub use crate::persistence::FileObjectStore;
pub use crate::store::{ObjectIndex, ObjectStore};
pub use crate::workflow::{Context, WorkflowResult};
