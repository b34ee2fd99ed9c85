//! nimbus-core
//!
//! Declarative object model for managed cloud projects: desired specs,
//! observed upstream shapes, status conditions, and the per-kind comparison
//! rules used to decide whether a resource is in sync.
//! No transport or upstream client dependency; this is the shared vocabulary
//! of the nimbus system.

pub mod compare;
pub mod condition;
pub mod error;
pub mod models;

pub use crate::compare::{Normalize, Subset};
pub use crate::condition::{Condition, ConditionStatus, ConditionType, Reason};
pub use crate::error::ValidationError;
