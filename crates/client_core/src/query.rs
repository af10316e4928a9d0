use std::sync::Arc;

use shared::{
    domain::{QueryPatch, QueryState, ResultWindow, TaskRecord},
    error::GatewayError,
};
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error};

use crate::{events::ControllerEvent, gateway::TaskGateway};

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("page size must be greater than zero")]
    ZeroPageSize,
    #[error("failed to fetch tasks: {0}")]
    Fetch(#[from] GatewayError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryView {
    pub query: QueryState,
    pub window: ResultWindow,
    pub loading: bool,
    pub refetching: bool,
    pub error: bool,
}

impl QueryView {
    pub fn rows(&self) -> &[TaskRecord] {
        &self.window.rows
    }

    pub fn row_count(&self) -> u64 {
        self.window.total_count
    }
}

/// The lock is released across gateway calls, so overlapping fetches are not
/// cancelled: whichever completes last determines the visible window.
pub struct QueryStateManager {
    gateway: Arc<dyn TaskGateway>,
    inner: Mutex<QueryView>,
    events: broadcast::Sender<ControllerEvent>,
}

impl QueryStateManager {
    pub fn new(
        gateway: Arc<dyn TaskGateway>,
        initial: QueryState,
        events: broadcast::Sender<ControllerEvent>,
    ) -> Self {
        Self {
            gateway,
            inner: Mutex::new(QueryView {
                query: initial,
                ..QueryView::default()
            }),
            events,
        }
    }

    pub async fn snapshot(&self) -> QueryView {
        self.inner.lock().await.clone()
    }

    pub async fn query(&self) -> QueryState {
        self.inner.lock().await.query.clone()
    }

    pub async fn set_query(&self, patch: QueryPatch) -> Result<(), QueryError> {
        if patch.page_size == Some(0) {
            return Err(QueryError::ZeroPageSize);
        }
        if patch.is_empty() {
            return Ok(());
        }
        {
            let mut inner = self.inner.lock().await;
            patch.apply_to(&mut inner.query);
        }
        self.on_query_changed().await
    }

    pub async fn on_query_changed(&self) -> Result<(), QueryError> {
        let query = self.query().await;
        let _ = self.events.send(ControllerEvent::QueryChanged(query));
        self.fetch().await
    }

    pub async fn refresh(&self) -> Result<(), QueryError> {
        self.fetch().await
    }

    async fn fetch(&self) -> Result<(), QueryError> {
        let query = {
            let mut inner = self.inner.lock().await;
            if inner.window.is_empty() {
                inner.loading = true;
            } else {
                inner.refetching = true;
            }
            inner.query.clone()
        };
        debug!(
            page_index = query.page_index,
            page_size = query.page_size,
            sort_keys = query.sort.len(),
            "tasks: fetching window"
        );

        let result = self.gateway.list(&query).await;

        let mut inner = self.inner.lock().await;
        inner.loading = false;
        inner.refetching = false;
        match result {
            Ok(page) => {
                let rows = page.data.len();
                let total_count = page.metadata.total_row_count;
                inner.window = ResultWindow {
                    rows: page.data,
                    total_count,
                };
                inner.error = false;
                drop(inner);
                let _ = self
                    .events
                    .send(ControllerEvent::WindowReplaced { rows, total_count });
                Ok(())
            }
            Err(err) => {
                inner.error = true;
                drop(inner);
                error!(
                    page_index = query.page_index,
                    page_size = query.page_size,
                    "tasks: fetch failed, keeping previous window: {err}"
                );
                let _ = self.events.send(ControllerEvent::FetchFailed(err.to_string()));
                Err(QueryError::Fetch(err))
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/query_tests.rs"]
mod tests;
