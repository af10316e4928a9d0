use std::sync::Arc;

use shared::{
    domain::{TaskDraft, TaskId, TaskRecord},
    error::GatewayError,
    protocol::{CreateTaskRequest, TaskTransition, UpdateTaskRequest},
};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use crate::{
    events::{ControllerEvent, MutationAction, Notification},
    gateway::{GatewayReply, TaskGateway},
    query::QueryStateManager,
};

/// The mutation did not succeed. Details were already logged and notified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("failed to {} task", .0.verb())]
pub struct MutationFailed(pub MutationAction);

pub struct MutationCoordinator {
    gateway: Arc<dyn TaskGateway>,
    query: Arc<QueryStateManager>,
    events: broadcast::Sender<ControllerEvent>,
}

impl MutationCoordinator {
    pub fn new(
        gateway: Arc<dyn TaskGateway>,
        query: Arc<QueryStateManager>,
        events: broadcast::Sender<ControllerEvent>,
    ) -> Self {
        Self {
            gateway,
            query,
            events,
        }
    }

    pub async fn submit(&self, draft: &TaskDraft) -> Result<(), MutationFailed> {
        match draft.existing_id() {
            Some(id) => {
                let request = UpdateTaskRequest::from_draft(id.clone(), draft);
                let result = self.gateway.update(id, request).await;
                self.settle(MutationAction::Update, Some(id.clone()), result)
                    .await
            }
            None => {
                let result = self.gateway.create(CreateTaskRequest::from(draft)).await;
                self.settle(MutationAction::Create, None, result).await
            }
        }
    }

    pub async fn transition(
        &self,
        id: &TaskId,
        transition: TaskTransition,
    ) -> Result<(), MutationFailed> {
        let action = match transition {
            TaskTransition::Complete => MutationAction::Complete,
        };
        let result = self.gateway.transition(id, transition).await;
        self.settle(action, Some(id.clone()), result).await
    }

    pub async fn remove(&self, id: &TaskId) -> Result<(), MutationFailed> {
        let result = self.gateway.delete(id).await;
        self.settle(MutationAction::Delete, Some(id.clone()), result)
            .await
    }

    async fn settle<T: ReportedId>(
        &self,
        action: MutationAction,
        task_id: Option<TaskId>,
        result: Result<GatewayReply<T>, GatewayError>,
    ) -> Result<(), MutationFailed> {
        match result {
            Ok(reply) => {
                let task_id = task_id.or_else(|| reply.data.as_ref().and_then(T::reported_id));
                let notification = if reply.is_expected_status() {
                    info!(
                        task_id = task_id.as_ref().map(TaskId::as_str),
                        status = reply.status,
                        "tasks: {} task",
                        action.past_tense()
                    );
                    Notification::success(action, task_id)
                } else {
                    warn!(
                        task_id = task_id.as_ref().map(TaskId::as_str),
                        status = reply.status,
                        "tasks: unexpected response to {} request",
                        action.verb()
                    );
                    Notification::unexpected(action, task_id)
                };
                self.notify(notification);
                // Fetch failures are tracked on the query view; the write itself succeeded.
                let _ = self.query.refresh().await;
                Ok(())
            }
            Err(err) => {
                error!(
                    task_id = task_id.as_ref().map(TaskId::as_str),
                    status = err.status(),
                    body = ?err.body(),
                    "tasks: failed to {} task: {err}",
                    action.verb()
                );
                self.notify(Notification::failure(action, task_id));
                Err(MutationFailed(action))
            }
        }
    }

    fn notify(&self, notification: Notification) {
        let _ = self.events.send(ControllerEvent::Notification(notification));
    }
}

trait ReportedId {
    fn reported_id(&self) -> Option<TaskId>;
}

impl ReportedId for TaskRecord {
    fn reported_id(&self) -> Option<TaskId> {
        Some(self.id.clone()).filter(|id| !id.is_blank())
    }
}

impl ReportedId for serde_json::Value {
    fn reported_id(&self) -> Option<TaskId> {
        self.get("id")
            .and_then(|id| TaskId::deserialize(id).ok())
            .filter(|id| !id.is_blank())
    }
}

#[cfg(test)]
#[path = "tests/mutation_tests.rs"]
mod tests;
