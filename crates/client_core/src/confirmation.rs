use shared::{
    domain::{TaskId, TaskRecord},
    protocol::TaskTransition,
};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::mutation::{MutationCoordinator, MutationFailed};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatedAction {
    Delete,
    Complete,
}

impl GatedAction {
    pub fn verb(self) -> &'static str {
        match self {
            GatedAction::Delete => "delete",
            GatedAction::Complete => "complete",
        }
    }

    pub fn is_available_for(self, record: &TaskRecord) -> bool {
        match self {
            GatedAction::Delete => true,
            GatedAction::Complete => !record.is_complete,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingConfirmation {
    pub target_id: TaskId,
    pub target_label: String,
    pub action: GatedAction,
}

impl PendingConfirmation {
    pub fn title(&self) -> &'static str {
        "Are you sure?"
    }

    pub fn prompt(&self) -> String {
        format!(
            "Are you sure you want to {} this task: {}?",
            self.action.verb(),
            self.target_label
        )
    }
}

#[derive(Debug, Error)]
pub enum GateError {
    #[error("task {0} is already complete")]
    AlreadyComplete(TaskId),
    #[error("task {0} is not in the current window")]
    UnknownTask(TaskId),
    #[error("no confirmation is pending")]
    NothingPending,
    #[error(transparent)]
    Mutation(#[from] MutationFailed),
}

/// Holds at most one pending confirmation. A new request replaces the
/// current one; confirm and cancel both leave the gate idle.
#[derive(Default)]
pub struct ConfirmationGate {
    pending: Mutex<Option<PendingConfirmation>>,
}

impl ConfirmationGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn request(
        &self,
        record: &TaskRecord,
        action: GatedAction,
    ) -> Result<PendingConfirmation, GateError> {
        if !action.is_available_for(record) {
            return Err(GateError::AlreadyComplete(record.id.clone()));
        }
        let confirmation = PendingConfirmation {
            target_id: record.id.clone(),
            target_label: record.name.clone(),
            action,
        };
        let replaced = self.pending.lock().await.replace(confirmation.clone());
        if let Some(previous) = replaced {
            debug!(
                task_id = previous.target_id.as_str(),
                action = previous.action.verb(),
                "tasks: pending confirmation replaced"
            );
        }
        Ok(confirmation)
    }

    pub async fn pending(&self) -> Option<PendingConfirmation> {
        self.pending.lock().await.clone()
    }

    pub async fn cancel(&self) -> Option<PendingConfirmation> {
        self.pending.lock().await.take()
    }

    pub async fn confirm(&self, mutations: &MutationCoordinator) -> Result<(), GateError> {
        let confirmation = self
            .pending
            .lock()
            .await
            .take()
            .ok_or(GateError::NothingPending)?;
        info!(
            task_id = confirmation.target_id.as_str(),
            action = confirmation.action.verb(),
            "tasks: confirmed"
        );
        let id = &confirmation.target_id;
        match confirmation.action {
            GatedAction::Delete => mutations.remove(id).await?,
            GatedAction::Complete => mutations.transition(id, TaskTransition::Complete).await?,
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/confirmation_tests.rs"]
mod tests;
