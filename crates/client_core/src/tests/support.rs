use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::Value;
use shared::{
    domain::{QueryState, TaskId, TaskRecord},
    error::GatewayError,
    protocol::{CreateTaskRequest, PageMetadata, TaskPage, TaskTransition, UpdateTaskRequest},
};
use tokio::sync::{broadcast, oneshot, Mutex};

use crate::{events::ControllerEvent, gateway::GatewayReply, gateway::TaskGateway};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum GatewayCall {
    List(QueryState),
    Create(CreateTaskRequest),
    Update(TaskId, UpdateTaskRequest),
    Transition(TaskId, TaskTransition),
    Delete(TaskId),
}

/// In-memory stand-in for the task server. Rows live here; every call is
/// recorded; list calls for a page can be held back until released.
pub(crate) struct FakeGateway {
    rows: Mutex<Vec<TaskRecord>>,
    next_id: Mutex<u32>,
    calls: Mutex<Vec<GatewayCall>>,
    fail_list: Mutex<Option<GatewayError>>,
    fail_mutations: Mutex<Option<GatewayError>>,
    mutation_status: Mutex<u16>,
    held_pages: Mutex<HashMap<u32, oneshot::Receiver<()>>>,
}

impl FakeGateway {
    pub(crate) fn new() -> Arc<Self> {
        Self::with_rows(Vec::new())
    }

    pub(crate) fn with_rows(rows: Vec<TaskRecord>) -> Arc<Self> {
        let next_id = rows.len() as u32 + 1;
        Arc::new(Self {
            rows: Mutex::new(rows),
            next_id: Mutex::new(next_id),
            calls: Mutex::new(Vec::new()),
            fail_list: Mutex::new(None),
            fail_mutations: Mutex::new(None),
            mutation_status: Mutex::new(200),
            held_pages: Mutex::new(HashMap::new()),
        })
    }

    pub(crate) fn seeded(count: u32) -> Arc<Self> {
        Self::with_rows((1..=count).map(|n| record(&n.to_string(), false)).collect())
    }

    pub(crate) async fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().await.clone()
    }

    pub(crate) async fn list_calls(&self) -> Vec<QueryState> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|call| match call {
                GatewayCall::List(query) => Some(query.clone()),
                _ => None,
            })
            .collect()
    }

    pub(crate) async fn mutation_calls(&self) -> Vec<GatewayCall> {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|call| !matches!(call, GatewayCall::List(_)))
            .cloned()
            .collect()
    }

    pub(crate) async fn clear_calls(&self) {
        self.calls.lock().await.clear();
    }

    pub(crate) async fn fail_lists_with(&self, err: Option<GatewayError>) {
        *self.fail_list.lock().await = err;
    }

    pub(crate) async fn fail_mutations_with(&self, err: Option<GatewayError>) {
        *self.fail_mutations.lock().await = err;
    }

    pub(crate) async fn reply_with_status(&self, status: u16) {
        *self.mutation_status.lock().await = status;
    }

    /// Holds the next list call for `page_index` until the returned sender fires.
    pub(crate) async fn hold_page(&self, page_index: u32) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.held_pages.lock().await.insert(page_index, rx);
        tx
    }

    pub(crate) async fn rows(&self) -> Vec<TaskRecord> {
        self.rows.lock().await.clone()
    }

    async fn mutation_gate(&self) -> Result<u16, GatewayError> {
        if let Some(err) = self.fail_mutations.lock().await.clone() {
            return Err(err);
        }
        Ok(*self.mutation_status.lock().await)
    }
}

#[async_trait]
impl TaskGateway for FakeGateway {
    async fn list(&self, query: &QueryState) -> Result<TaskPage, GatewayError> {
        self.calls.lock().await.push(GatewayCall::List(query.clone()));
        let held = self.held_pages.lock().await.remove(&query.page_index);
        if let Some(rx) = held {
            let _ = rx.await;
        }
        if let Some(err) = self.fail_list.lock().await.clone() {
            return Err(err);
        }
        let rows = self.rows.lock().await;
        let start = (query.page_index * query.page_size) as usize;
        let data = rows
            .iter()
            .skip(start)
            .take(query.page_size as usize)
            .cloned()
            .collect();
        Ok(TaskPage {
            data,
            metadata: PageMetadata {
                total_row_count: rows.len() as u64,
                page_number: query.page_index,
                page_size: query.page_size,
            },
        })
    }

    async fn create(
        &self,
        request: CreateTaskRequest,
    ) -> Result<GatewayReply<TaskRecord>, GatewayError> {
        self.calls
            .lock()
            .await
            .push(GatewayCall::Create(request.clone()));
        let status = self.mutation_gate().await?;
        let id = {
            let mut next_id = self.next_id.lock().await;
            let id = next_id.to_string();
            *next_id += 1;
            id
        };
        let created = TaskRecord {
            id: TaskId::new(id),
            name: request.name,
            description: request.description,
            author: request.author,
            is_complete: false,
            created_at: created_at(),
        };
        self.rows.lock().await.push(created.clone());
        Ok(GatewayReply {
            status,
            data: Some(created),
        })
    }

    async fn update(
        &self,
        id: &TaskId,
        request: UpdateTaskRequest,
    ) -> Result<GatewayReply<TaskRecord>, GatewayError> {
        self.calls
            .lock()
            .await
            .push(GatewayCall::Update(id.clone(), request.clone()));
        let status = self.mutation_gate().await?;
        let mut rows = self.rows.lock().await;
        let row = rows
            .iter_mut()
            .find(|row| &row.id == id)
            .ok_or(GatewayError::Rejected {
                status: 404,
                body: None,
            })?;
        row.name = request.name;
        row.description = request.description;
        row.author = request.author;
        Ok(GatewayReply {
            status,
            data: Some(row.clone()),
        })
    }

    async fn transition(
        &self,
        id: &TaskId,
        transition: TaskTransition,
    ) -> Result<GatewayReply<TaskRecord>, GatewayError> {
        self.calls
            .lock()
            .await
            .push(GatewayCall::Transition(id.clone(), transition));
        let status = self.mutation_gate().await?;
        let mut rows = self.rows.lock().await;
        let row = rows
            .iter_mut()
            .find(|row| &row.id == id)
            .ok_or(GatewayError::Rejected {
                status: 404,
                body: None,
            })?;
        row.is_complete = true;
        Ok(GatewayReply {
            status,
            data: Some(row.clone()),
        })
    }

    async fn delete(&self, id: &TaskId) -> Result<GatewayReply<Value>, GatewayError> {
        self.calls.lock().await.push(GatewayCall::Delete(id.clone()));
        let status = self.mutation_gate().await?;
        self.rows.lock().await.retain(|row| &row.id != id);
        Ok(GatewayReply::empty(if status == 200 { 204 } else { status }))
    }
}

pub(crate) fn created_at() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

pub(crate) fn record(id: &str, is_complete: bool) -> TaskRecord {
    TaskRecord {
        id: TaskId::from(id),
        name: format!("task {id}"),
        description: format!("description {id}"),
        author: "Alice".to_string(),
        is_complete,
        created_at: created_at(),
    }
}

pub(crate) fn server_error() -> GatewayError {
    GatewayError::Rejected {
        status: 500,
        body: Some(serde_json::json!({ "message": "boom" })),
    }
}

pub(crate) fn drain(rx: &mut broadcast::Receiver<ControllerEvent>) -> Vec<ControllerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

pub(crate) fn notifications(events: &[ControllerEvent]) -> Vec<crate::events::Notification> {
    events
        .iter()
        .filter_map(|event| match event {
            ControllerEvent::Notification(notification) => Some(notification.clone()),
            _ => None,
        })
        .collect()
}
