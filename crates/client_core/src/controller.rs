use std::sync::Arc;

use shared::domain::{QueryPatch, QueryState, TaskField, TaskId, TaskRecord};
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info};

use crate::{
    confirmation::{ConfirmationGate, GateError, GatedAction, PendingConfirmation},
    events::ControllerEvent,
    form::TaskForm,
    gateway::TaskGateway,
    mutation::{MutationCoordinator, MutationFailed},
    query::{QueryError, QueryStateManager, QueryView},
};

const EVENT_CHANNEL_CAPACITY: usize = 128;

#[derive(Debug, Error)]
pub enum FormError {
    #[error("no task form is open")]
    NoOpenForm,
    #[error("task form has missing or invalid fields")]
    NotSubmittable,
    #[error(transparent)]
    Mutation(#[from] MutationFailed),
}

pub struct TaskController {
    query: Arc<QueryStateManager>,
    mutations: MutationCoordinator,
    gate: ConfirmationGate,
    form: Mutex<Option<TaskForm>>,
    events: broadcast::Sender<ControllerEvent>,
}

impl TaskController {
    pub fn new(gateway: Arc<dyn TaskGateway>) -> Arc<Self> {
        Self::with_query(gateway, QueryState::default())
    }

    pub fn with_query(gateway: Arc<dyn TaskGateway>, initial: QueryState) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let query = Arc::new(QueryStateManager::new(
            gateway.clone(),
            initial,
            events.clone(),
        ));
        let mutations = MutationCoordinator::new(gateway, query.clone(), events.clone());
        Arc::new(Self {
            query,
            mutations,
            gate: ConfirmationGate::new(),
            form: Mutex::new(None),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    pub async fn start(&self) -> Result<(), QueryError> {
        self.query.on_query_changed().await
    }

    pub async fn view(&self) -> QueryView {
        self.query.snapshot().await
    }

    pub async fn set_query(&self, patch: QueryPatch) -> Result<(), QueryError> {
        self.query.set_query(patch).await
    }

    pub async fn refresh(&self) -> Result<(), QueryError> {
        self.query.refresh().await
    }

    pub async fn open_create_form(&self) -> TaskForm {
        let form = TaskForm::create();
        *self.form.lock().await = Some(form.clone());
        form
    }

    pub async fn open_edit_form(&self, record: &TaskRecord) -> TaskForm {
        let form = TaskForm::edit(record);
        *self.form.lock().await = Some(form.clone());
        form
    }

    pub async fn form(&self) -> Option<TaskForm> {
        self.form.lock().await.clone()
    }

    pub async fn close_form(&self) {
        self.form.lock().await.take();
    }

    pub async fn set_form_field(
        &self,
        field: TaskField,
        value: impl Into<String>,
    ) -> Result<bool, FormError> {
        let mut guard = self.form.lock().await;
        let form = guard.as_mut().ok_or(FormError::NoOpenForm)?;
        Ok(form.set_field(field, value))
    }

    /// Submits the open form. The form closes only when the write succeeded;
    /// a refused or failed submit leaves draft and validation untouched.
    pub async fn submit_form(&self) -> Result<(), FormError> {
        let draft = {
            let guard = self.form.lock().await;
            let form = guard.as_ref().ok_or(FormError::NoOpenForm)?;
            if !form.is_submittable() {
                debug!("tasks: submit refused, form is not submittable");
                return Err(FormError::NotSubmittable);
            }
            form.draft().clone()
        };

        self.mutations.submit(&draft).await?;

        let mut guard = self.form.lock().await;
        if guard.as_ref().map(TaskForm::draft) == Some(&draft) {
            guard.take();
        }
        Ok(())
    }

    /// Opens a confirmation for a row of the current window. Availability is
    /// checked against the window's copy of the row.
    pub async fn request_confirmation(
        &self,
        id: &TaskId,
        action: GatedAction,
    ) -> Result<PendingConfirmation, GateError> {
        let record = {
            let view = self.query.snapshot().await;
            view.window
                .find(id)
                .cloned()
                .ok_or_else(|| GateError::UnknownTask(id.clone()))?
        };
        let pending = self.gate.request(&record, action).await?;
        info!(
            task_id = pending.target_id.as_str(),
            action = action.verb(),
            "tasks: awaiting confirmation"
        );
        Ok(pending)
    }

    pub async fn request_delete(&self, id: &TaskId) -> Result<PendingConfirmation, GateError> {
        self.request_confirmation(id, GatedAction::Delete).await
    }

    pub async fn request_complete(&self, id: &TaskId) -> Result<PendingConfirmation, GateError> {
        self.request_confirmation(id, GatedAction::Complete).await
    }

    pub async fn pending_confirmation(&self) -> Option<PendingConfirmation> {
        self.gate.pending().await
    }

    pub async fn cancel_confirmation(&self) -> Option<PendingConfirmation> {
        self.gate.cancel().await
    }

    pub async fn confirm(&self) -> Result<(), GateError> {
        self.gate.confirm(&self.mutations).await
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
