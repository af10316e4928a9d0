use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl<'de> Deserialize<'de> for TaskId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(serde_json::Number),
        }

        // Auto-increment backends send numbers; keep their decimal text.
        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(raw) => Self(raw),
            RawId::Number(raw) => Self(raw.to_string()),
        })
    }
}

impl TaskId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskField {
    Id,
    Name,
    Description,
    IsComplete,
    Author,
    CreatedAt,
}

impl TaskField {
    pub const ALL: [TaskField; 6] = [
        TaskField::Id,
        TaskField::Name,
        TaskField::Description,
        TaskField::IsComplete,
        TaskField::Author,
        TaskField::CreatedAt,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskField::Id => "id",
            TaskField::Name => "name",
            TaskField::Description => "description",
            TaskField::IsComplete => "isComplete",
            TaskField::Author => "author",
            TaskField::CreatedAt => "createdAt",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let needle = raw.trim();
        Self::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(needle))
            .or_else(|| match needle.to_ascii_lowercase().as_str() {
                "is_complete" | "complete" => Some(TaskField::IsComplete),
                "created_at" | "created" => Some(TaskField::CreatedAt),
                _ => None,
            })
    }
}

impl fmt::Display for TaskField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub id: TaskId,
    pub name: String,
    pub description: String,
    pub author: String,
    #[serde(default)]
    pub is_complete: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub id: Option<TaskId>,
    pub name: String,
    pub description: String,
    pub author: String,
    pub is_complete: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl TaskDraft {
    pub fn existing_id(&self) -> Option<&TaskId> {
        self.id.as_ref().filter(|id| !id.is_blank())
    }

    pub fn is_update(&self) -> bool {
        self.existing_id().is_some()
    }

    pub fn text(&self, field: TaskField) -> Option<&str> {
        match field {
            TaskField::Name => Some(&self.name),
            TaskField::Description => Some(&self.description),
            TaskField::Author => Some(&self.author),
            TaskField::Id | TaskField::IsComplete | TaskField::CreatedAt => None,
        }
    }

    pub fn set_text(&mut self, field: TaskField, value: impl Into<String>) -> bool {
        let slot = match field {
            TaskField::Name => &mut self.name,
            TaskField::Description => &mut self.description,
            TaskField::Author => &mut self.author,
            TaskField::Id | TaskField::IsComplete | TaskField::CreatedAt => return false,
        };
        *slot = value.into();
        true
    }
}

impl From<&TaskRecord> for TaskDraft {
    fn from(record: &TaskRecord) -> Self {
        Self {
            id: Some(record.id.clone()),
            name: record.name.clone(),
            description: record.description.clone(),
            author: record.author.clone(),
            is_complete: record.is_complete,
            created_at: Some(record.created_at),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: TaskField,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(field: TaskField) -> Self {
        Self {
            field,
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: TaskField) -> Self {
        Self {
            field,
            direction: SortDirection::Desc,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let (field, direction) = match raw.split_once(':') {
            Some((field, dir)) => (field, dir.trim().to_ascii_lowercase()),
            None => (raw, "asc".to_string()),
        };
        let field = TaskField::parse(field)?;
        let direction = match direction.as_str() {
            "asc" => SortDirection::Asc,
            "desc" => SortDirection::Desc,
            _ => return None,
        };
        Some(Self { field, direction })
    }
}

pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    pub page_index: u32,
    pub page_size: u32,
    pub sort: Vec<SortSpec>,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
            sort: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryPatch {
    pub page_index: Option<u32>,
    pub page_size: Option<u32>,
    pub sort: Option<Vec<SortSpec>>,
}

impl QueryPatch {
    pub fn page(page_index: u32) -> Self {
        Self {
            page_index: Some(page_index),
            ..Self::default()
        }
    }

    pub fn page_size(page_size: u32) -> Self {
        Self {
            page_size: Some(page_size),
            ..Self::default()
        }
    }

    pub fn sort(sort: Vec<SortSpec>) -> Self {
        Self {
            sort: Some(sort),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.page_index.is_none() && self.page_size.is_none() && self.sort.is_none()
    }

    pub fn apply_to(self, query: &mut QueryState) {
        if let Some(page_index) = self.page_index {
            query.page_index = page_index;
        }
        if let Some(page_size) = self.page_size {
            query.page_size = page_size;
        }
        if let Some(sort) = self.sort {
            query.sort = sort;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultWindow {
    pub rows: Vec<TaskRecord>,
    pub total_count: u64,
}

impl ResultWindow {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn find(&self, id: &TaskId) -> Option<&TaskRecord> {
        self.rows.iter().find(|row| &row.id == id)
    }
}
