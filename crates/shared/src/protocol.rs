use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{QueryState, SortSpec, TaskDraft, TaskId, TaskRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub total_row_count: u64,
    pub page_number: u32,
    pub page_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskPage {
    pub data: Vec<TaskRecord>,
    pub metadata: PageMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListTasksQuery {
    pub page: u32,
    pub size: u32,
    /// JSON-encoded `[{"field": .., "direction": ..}]`.
    pub sorting: String,
}

impl ListTasksQuery {
    pub fn from_state(query: &QueryState) -> serde_json::Result<Self> {
        Ok(Self {
            page: query.page_index,
            size: query.page_size,
            sorting: serde_json::to_string(&query.sort)?,
        })
    }

    pub fn sort_specs(&self) -> serde_json::Result<Vec<SortSpec>> {
        if self.sorting.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&self.sorting)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    pub name: String,
    pub description: String,
    pub author: String,
}

impl From<&TaskDraft> for CreateTaskRequest {
    fn from(draft: &TaskDraft) -> Self {
        Self {
            name: draft.name.clone(),
            description: draft.description.clone(),
            author: draft.author.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub id: TaskId,
    pub name: String,
    pub description: String,
    pub author: String,
    pub is_complete: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl UpdateTaskRequest {
    pub fn from_draft(id: TaskId, draft: &TaskDraft) -> Self {
        Self {
            id,
            name: draft.name.clone(),
            description: draft.description.clone(),
            author: draft.author.clone(),
            is_complete: draft.is_complete,
            created_at: draft.created_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskTransition {
    Complete,
}

impl TaskTransition {
    pub fn path_segment(self) -> &'static str {
        match self {
            TaskTransition::Complete => "complete",
        }
    }
}

pub fn tasks_route() -> &'static str {
    "/tasks"
}

pub fn task_route(id: &TaskId) -> String {
    format!("/tasks/{}", id.as_str())
}

pub fn task_transition_route(id: &TaskId, transition: TaskTransition) -> String {
    format!("/tasks/{}/{}", id.as_str(), transition.path_segment())
}
