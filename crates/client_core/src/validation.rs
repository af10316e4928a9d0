use std::collections::BTreeMap;

use shared::domain::{TaskDraft, TaskField};

pub const REQUIRED_MESSAGE: &str = "This field is required.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub field: TaskField,
    pub label: &'static str,
    pub required: bool,
    pub editable: bool,
    pub visible_by_default: bool,
}

pub static TASK_FIELDS: [FieldDescriptor; 6] = [
    describe(TaskField::Id),
    describe(TaskField::Name),
    describe(TaskField::Description),
    describe(TaskField::IsComplete),
    describe(TaskField::Author),
    describe(TaskField::CreatedAt),
];

const fn describe(field: TaskField) -> FieldDescriptor {
    let (label, required, editable, visible_by_default) = match field {
        TaskField::Id => ("Id", false, false, false),
        TaskField::Name => ("Name", true, true, true),
        TaskField::Description => ("Description", true, true, true),
        TaskField::IsComplete => ("Is Complete?", false, false, true),
        TaskField::Author => ("Author", true, true, true),
        TaskField::CreatedAt => ("Creation date", false, false, true),
    };
    FieldDescriptor {
        field,
        label,
        required,
        editable,
        visible_by_default,
    }
}

pub fn descriptor(field: TaskField) -> FieldDescriptor {
    describe(field)
}

pub fn editable_fields() -> impl Iterator<Item = &'static FieldDescriptor> {
    TASK_FIELDS.iter().filter(|descriptor| descriptor.editable)
}

pub fn required_fields() -> impl Iterator<Item = &'static FieldDescriptor> {
    TASK_FIELDS.iter().filter(|descriptor| descriptor.required)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationState {
    entries: BTreeMap<TaskField, String>,
}

impl ValidationState {
    pub fn validate<'a, I>(&mut self, changed: I)
    where
        I: IntoIterator<Item = (TaskField, &'a str)>,
    {
        for (field, value) in changed {
            if let Some(message) = check_field(field, value) {
                self.entries.insert(field, message);
            }
        }
    }

    pub fn entry(&self, field: TaskField) -> Option<&str> {
        self.entries.get(&field).map(String::as_str)
    }

    pub fn message(&self, field: TaskField) -> Option<&str> {
        self.entry(field).filter(|message| !message.is_empty())
    }

    pub fn all_clear(&self) -> bool {
        self.entries.values().all(String::is_empty)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (TaskField, &str)> {
        self.entries
            .iter()
            .map(|(field, message)| (*field, message.as_str()))
    }
}

pub fn check_field(field: TaskField, value: &str) -> Option<String> {
    if !descriptor(field).required {
        return None;
    }
    if value.is_empty() {
        Some(REQUIRED_MESSAGE.to_string())
    } else {
        Some(String::new())
    }
}

pub fn is_submittable(draft: &TaskDraft, state: &ValidationState) -> bool {
    let required_present = required_fields().all(|descriptor| {
        draft
            .text(descriptor.field)
            .is_some_and(|value| !value.is_empty())
    });
    required_present && state.all_clear()
}

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod tests;
