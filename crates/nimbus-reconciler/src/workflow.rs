use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use nimbus_core::models::{IntegrationStatus, ProjectStatus};
use nimbus_core::{Condition, ConditionStatus, ConditionType, Reason};

use crate::client::CloudApi;
use crate::error::ApiError;
use crate::feature_flags::FeatureFlags;

/// Outcome of one reconcile step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowResult {
    Ok,
    /// Failed; retry on the next regular pass.
    Terminate { reason: Reason, message: String },
    /// Not converged yet; retry after the given delay.
    Requeue {
        after: Duration,
        reason: Reason,
        message: String,
    },
}

impl WorkflowResult {
    pub fn ok() -> Self {
        Self::Ok
    }

    pub fn terminate(reason: Reason, message: impl Into<String>) -> Self {
        Self::Terminate {
            reason,
            message: message.into(),
        }
    }

    pub fn requeue(after: Duration, reason: Reason, message: impl Into<String>) -> Self {
        Self::Requeue {
            after,
            reason,
            message: message.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }

    pub fn reason(&self) -> Option<Reason> {
        match self {
            Self::Ok => None,
            Self::Terminate { reason, .. } | Self::Requeue { reason, .. } => Some(*reason),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Ok => "",
            Self::Terminate { message, .. } | Self::Requeue { message, .. } => message,
        }
    }

    /// Delay before the next pass, if the result asks for one.
    pub fn requeue_after(&self) -> Option<Duration> {
        match self {
            Self::Requeue { after, .. } => Some(*after),
            _ => None,
        }
    }
}

/// Everything one reconcile pass needs: the upstream client, the span to
/// log under, the pass's cancellation and deadline, and the status being
/// written for the owning object.
///
/// A context belongs to exactly one pass over one object.
pub struct Context {
    pub client: Arc<dyn CloudApi>,
    pub span: tracing::Span,
    pub features: FeatureFlags,
    cancel: CancellationToken,
    deadline: Option<Instant>,
    status: ProjectStatus,
}

impl Context {
    /// `status` is the object's last persisted status; conditions are
    /// overwritten in place as the pass progresses.
    pub fn new(client: Arc<dyn CloudApi>, status: ProjectStatus, cancel: CancellationToken) -> Self {
        Self {
            client,
            span: tracing::Span::current(),
            features: FeatureFlags::default(),
            cancel,
            deadline: None,
            status,
        }
    }

    pub fn with_span(mut self, span: tracing::Span) -> Self {
        self.span = span;
        self
    }

    /// Bound the pass by `timeout`. When it expires the pass token is
    /// cancelled, so requests and watch bodies holding the token stop too.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        self.deadline = Some(deadline);

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let cancel = self.cancel.clone();
                handle.spawn(async move {
                    tokio::select! {
                        _ = cancel.cancelled() => {}
                        _ = tokio::time::sleep_until(deadline) => {
                            tracing::debug!("pass deadline reached");
                            cancel.cancel();
                        }
                    }
                });
            }
            Err(_) => tracing::warn!("no runtime; deadline only bounds calls made through the context"),
        }
        self
    }

    pub fn with_features(mut self, features: FeatureFlags) -> Self {
        self.features = features;
        self
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Run one upstream call bounded by the pass's cancellation and deadline.
    pub async fn call<T, F>(&self, call: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        let bounded = async {
            tokio::select! {
                _ = self.cancel.cancelled() => Err(self.stop_reason()),
                result = call => result,
            }
        };
        match self.deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, bounded)
                .await
                .unwrap_or(Err(ApiError::DeadlineExceeded)),
            None => bounded.await,
        }
    }

    fn stop_reason(&self) -> ApiError {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => ApiError::DeadlineExceeded,
            _ => ApiError::Cancelled,
        }
    }

    pub fn status(&self) -> &ProjectStatus {
        &self.status
    }

    pub fn into_status(self) -> ProjectStatus {
        self.status
    }

    /// `Ok` sets the condition true; anything else sets it to the result's
    /// reason and message.
    pub fn set_condition_from_result(&mut self, condition_type: ConditionType, result: &WorkflowResult) {
        let condition = match result {
            WorkflowResult::Ok => Condition::truthy(condition_type),
            WorkflowResult::Terminate { reason, message } => {
                Condition::falsy(condition_type, *reason, message.as_str())
            }
            WorkflowResult::Requeue {
                reason, message, ..
            } => Condition {
                status: ConditionStatus::Unknown,
                ..Condition::falsy(condition_type, *reason, message.as_str())
            },
        };
        self.status.set_condition(condition);
    }

    pub fn set_condition(&mut self, condition: Condition) {
        self.status.set_condition(condition);
    }

    pub fn set_condition_true(&mut self, condition_type: ConditionType) {
        self.status.set_condition(Condition::truthy(condition_type));
    }

    pub fn set_condition_false(
        &mut self,
        condition_type: ConditionType,
        reason: Reason,
        message: impl Into<String>,
    ) {
        self.status
            .set_condition(Condition::falsy(condition_type, reason, message));
    }

    pub fn unset_condition(&mut self, condition_type: ConditionType) {
        self.status.unset_condition(condition_type);
    }

    pub fn set_integration_statuses(&mut self, items: Vec<IntegrationStatus>) {
        self.status.cloud_provider_integrations = items;
    }

    pub fn set_observed_generation(&mut self, generation: u64) {
        self.status.observed_generation = generation;
    }
}
