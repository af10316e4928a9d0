use shared::domain::{TaskDraft, TaskField, TaskRecord};

use crate::validation::{self, FieldDescriptor, ValidationState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskForm {
    draft: TaskDraft,
    validation: ValidationState,
}

impl TaskForm {
    pub fn create() -> Self {
        Self {
            draft: TaskDraft::default(),
            validation: ValidationState::default(),
        }
    }

    pub fn edit(record: &TaskRecord) -> Self {
        Self {
            draft: TaskDraft::from(record),
            validation: ValidationState::default(),
        }
    }

    pub fn mode(&self) -> FormMode {
        if self.draft.is_update() {
            FormMode::Edit
        } else {
            FormMode::Create
        }
    }

    pub fn title(&self) -> &'static str {
        match self.mode() {
            FormMode::Create => "Create New Task",
            FormMode::Edit => "Update Task",
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static FieldDescriptor> {
        validation::editable_fields()
    }

    pub fn set_field(&mut self, field: TaskField, value: impl Into<String>) -> bool {
        if !validation::descriptor(field).editable {
            return false;
        }
        let value = value.into();
        self.validation.validate([(field, value.as_str())]);
        self.draft.set_text(field, value)
    }

    pub fn draft(&self) -> &TaskDraft {
        &self.draft
    }

    pub fn validation(&self) -> &ValidationState {
        &self.validation
    }

    pub fn is_submittable(&self) -> bool {
        validation::is_submittable(&self.draft, &self.validation)
    }
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
