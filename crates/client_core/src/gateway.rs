use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::{
    domain::{QueryState, TaskId, TaskRecord},
    error::GatewayError,
    protocol::{
        task_route, task_transition_route, tasks_route, CreateTaskRequest, ListTasksQuery,
        TaskPage, TaskTransition, UpdateTaskRequest,
    },
};
use tracing::{debug, error, warn};
use url::Url;

#[derive(Debug, Clone, PartialEq)]
pub struct GatewayReply<T> {
    pub status: u16,
    pub data: Option<T>,
}

impl<T> GatewayReply<T> {
    pub fn empty(status: u16) -> Self {
        Self { status, data: None }
    }

    pub fn is_expected_status(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait TaskGateway: Send + Sync {
    async fn list(&self, query: &QueryState) -> Result<TaskPage, GatewayError>;
    async fn create(
        &self,
        request: CreateTaskRequest,
    ) -> Result<GatewayReply<TaskRecord>, GatewayError>;
    async fn update(
        &self,
        id: &TaskId,
        request: UpdateTaskRequest,
    ) -> Result<GatewayReply<TaskRecord>, GatewayError>;
    async fn transition(
        &self,
        id: &TaskId,
        transition: TaskTransition,
    ) -> Result<GatewayReply<TaskRecord>, GatewayError>;
    async fn delete(&self, id: &TaskId) -> Result<GatewayReply<Value>, GatewayError>;
}

pub struct MissingTaskGateway;

#[async_trait]
impl TaskGateway for MissingTaskGateway {
    async fn list(&self, _query: &QueryState) -> Result<TaskPage, GatewayError> {
        Err(unavailable())
    }

    async fn create(
        &self,
        _request: CreateTaskRequest,
    ) -> Result<GatewayReply<TaskRecord>, GatewayError> {
        Err(unavailable())
    }

    async fn update(
        &self,
        _id: &TaskId,
        _request: UpdateTaskRequest,
    ) -> Result<GatewayReply<TaskRecord>, GatewayError> {
        Err(unavailable())
    }

    async fn transition(
        &self,
        _id: &TaskId,
        _transition: TaskTransition,
    ) -> Result<GatewayReply<TaskRecord>, GatewayError> {
        Err(unavailable())
    }

    async fn delete(&self, _id: &TaskId) -> Result<GatewayReply<Value>, GatewayError> {
        Err(unavailable())
    }
}

fn unavailable() -> GatewayError {
    GatewayError::Transport("task gateway is unavailable".to_string())
}

pub struct HttpTaskGateway {
    http: Client,
    api_host: String,
}

impl HttpTaskGateway {
    pub fn new(api_host: &str) -> Result<Self, GatewayError> {
        Self::with_timeout(api_host, None)
    }

    pub fn with_timeout(api_host: &str, timeout: Option<Duration>) -> Result<Self, GatewayError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|err| GatewayError::Transport(err.to_string()))?;
        Self::with_client(http, api_host)
    }

    pub fn with_client(http: Client, api_host: &str) -> Result<Self, GatewayError> {
        let parsed = Url::parse(api_host.trim())
            .map_err(|err| GatewayError::Transport(format!("invalid api host '{api_host}': {err}")))?;
        Ok(Self {
            http,
            api_host: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn api_host(&self) -> &str {
        &self.api_host
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.api_host)
    }
}

#[async_trait]
impl TaskGateway for HttpTaskGateway {
    async fn list(&self, query: &QueryState) -> Result<TaskPage, GatewayError> {
        let params = ListTasksQuery::from_state(query)
            .map_err(|err| GatewayError::Decode(err.to_string()))?;
        debug!(
            page = params.page,
            size = params.size,
            sorting = %params.sorting,
            "tasks: GET {}",
            tasks_route()
        );
        let response = self
            .http
            .get(self.endpoint(tasks_route()))
            .query(&params)
            .send()
            .await
            .map_err(transport)?;
        let (status, body) = read_json_body(response).await?;
        if status.as_u16() >= 400 {
            error!(
                status = status.as_u16(),
                body = ?body,
                "tasks: failed to list tasks"
            );
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        let body = body.ok_or(GatewayError::MissingBody)?;
        serde_json::from_value(body).map_err(|err| GatewayError::Decode(err.to_string()))
    }

    async fn create(
        &self,
        request: CreateTaskRequest,
    ) -> Result<GatewayReply<TaskRecord>, GatewayError> {
        let response = self
            .http
            .post(self.endpoint(tasks_route()))
            .json(&request)
            .send()
            .await
            .map_err(transport)?;
        handle_response(response, "create").await
    }

    async fn update(
        &self,
        id: &TaskId,
        request: UpdateTaskRequest,
    ) -> Result<GatewayReply<TaskRecord>, GatewayError> {
        let response = self
            .http
            .put(self.endpoint(&task_route(id)))
            .json(&request)
            .send()
            .await
            .map_err(transport)?;
        handle_response(response, "update").await
    }

    async fn transition(
        &self,
        id: &TaskId,
        transition: TaskTransition,
    ) -> Result<GatewayReply<TaskRecord>, GatewayError> {
        let response = self
            .http
            .patch(self.endpoint(&task_transition_route(id, transition)))
            .send()
            .await
            .map_err(transport)?;
        handle_response(response, transition.path_segment()).await
    }

    async fn delete(&self, id: &TaskId) -> Result<GatewayReply<Value>, GatewayError> {
        let response = self
            .http
            .delete(self.endpoint(&task_route(id)))
            .send()
            .await
            .map_err(transport)?;
        handle_response(response, "delete").await
    }
}

fn transport(err: reqwest::Error) -> GatewayError {
    GatewayError::Transport(err.to_string())
}

fn is_json_response(response: &Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("application/json"))
}

async fn read_json_body(response: Response) -> Result<(StatusCode, Option<Value>), GatewayError> {
    let status = response.status();
    if !is_json_response(&response) {
        return Ok((status, None));
    }
    let bytes = response.bytes().await.map_err(transport)?;
    if bytes.is_empty() {
        return Ok((status, None));
    }
    match serde_json::from_slice::<Value>(&bytes) {
        Ok(value) => Ok((status, Some(value))),
        Err(_) if status.as_u16() >= 400 => Ok((status, None)),
        Err(err) => Err(GatewayError::Decode(err.to_string())),
    }
}

async fn handle_response<T: DeserializeOwned>(
    response: Response,
    action: &str,
) -> Result<GatewayReply<T>, GatewayError> {
    let (status, body) = read_json_body(response).await?;
    let status = status.as_u16();

    if status >= 400 {
        error!(status, body = ?body, "tasks: failed to {action} task");
        return Err(GatewayError::Rejected { status, body });
    }

    let data = match body {
        Some(value) => match serde_json::from_value::<T>(value) {
            Ok(data) => Some(data),
            Err(err) => {
                warn!(status, "tasks: {action} response body did not decode: {err}");
                None
            }
        },
        None => None,
    };
    Ok(GatewayReply { status, data })
}

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod tests;
