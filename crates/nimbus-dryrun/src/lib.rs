//! nimbus-dryrun
//!
//! HTTP plumbing between the reconciler and the upstream API, plus the
//! speculative-execution layer that lets a full reconcile pass run without
//! mutating anything upstream.
//!
//! Public API:
//! - `Transport`: one outbound HTTP exchange, real or intercepted
//! - `HttpTransport`: the real delegate, backed by reqwest
//! - `DryRunTransport`: passes reads through, suppresses and records writes,
//!   answers watches with a body that blocks until cancellation
//! - `SimpleRecorder`: append-only, thread-safe log of planned actions

pub mod dry_run;
pub mod error;
pub mod http_transport;
pub mod recorder;
pub mod transport;
pub mod verbs;
pub mod watch;

pub use crate::dry_run::DryRunTransport;
pub use crate::error::TransportError;
pub use crate::http_transport::HttpTransport;
pub use crate::recorder::{PlannedAction, Recorder, SimpleRecorder};
pub use crate::transport::{Body, Dispatch, Transport};
pub use crate::verbs::VerbTable;
