use std::fmt;
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};

/// Sink for actions a dry run would have executed.
pub trait Recorder: Send + Sync {
    fn record(&self, action: &str, message: &str);

    fn record_fmt(&self, action: &str, message: fmt::Arguments<'_>) {
        self.record(action, &message.to_string());
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedAction {
    pub action: String,
    pub message: String,
}

/// Append-only planned-action log.
///
/// Writers append under the write lock, [`snapshot`](Self::snapshot) copies
/// under the read lock. No deduplication; order is whatever order the lock
/// admitted writers in.
#[derive(Debug, Default)]
pub struct SimpleRecorder {
    planned_actions: RwLock<Vec<PlannedAction>>,
}

impl SimpleRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far, in insertion order.
    pub fn snapshot(&self) -> Vec<PlannedAction> {
        self.planned_actions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.planned_actions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Recorder for SimpleRecorder {
    fn record(&self, action: &str, message: &str) {
        self.planned_actions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(PlannedAction {
                action: action.to_string(),
                message: message.to_string(),
            });
    }
}
