use shared::domain::{QueryState, TaskId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationAction {
    Create,
    Update,
    Complete,
    Delete,
}

impl MutationAction {
    pub fn verb(self) -> &'static str {
        match self {
            MutationAction::Create => "create",
            MutationAction::Update => "update",
            MutationAction::Complete => "complete",
            MutationAction::Delete => "delete",
        }
    }

    pub fn past_tense(self) -> &'static str {
        match self {
            MutationAction::Create => "created",
            MutationAction::Update => "updated",
            MutationAction::Complete => "completed",
            MutationAction::Delete => "deleted",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub action: MutationAction,
    pub task_id: Option<TaskId>,
    pub message: String,
}

impl Notification {
    pub fn success(action: MutationAction, task_id: Option<TaskId>) -> Self {
        Self {
            kind: NotificationKind::Success,
            action,
            task_id,
            message: format!("Task {} successfully", action.past_tense()),
        }
    }

    pub fn unexpected(action: MutationAction, task_id: Option<TaskId>) -> Self {
        Self {
            kind: NotificationKind::Warning,
            action,
            task_id,
            message: "Unexpected response".to_string(),
        }
    }

    pub fn failure(action: MutationAction, task_id: Option<TaskId>) -> Self {
        Self {
            kind: NotificationKind::Error,
            action,
            task_id,
            message: format!("Failed to {} task", action.verb()),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ControllerEvent {
    Notification(Notification),
    QueryChanged(QueryState),
    WindowReplaced { rows: usize, total_count: u64 },
    FetchFailed(String),
}
