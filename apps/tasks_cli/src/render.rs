use client_core::{
    validation::TASK_FIELDS, ControllerEvent, FieldDescriptor, Notification, NotificationKind,
    QueryView, TaskForm,
};
use shared::domain::{TaskField, TaskRecord};

const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M";

fn cell(record: &TaskRecord, field: TaskField) -> String {
    match field {
        TaskField::Id => record.id.to_string(),
        TaskField::Name => record.name.clone(),
        TaskField::Description => record.description.clone(),
        TaskField::Author => record.author.clone(),
        TaskField::IsComplete => (if record.is_complete { "True" } else { "False" }).to_string(),
        TaskField::CreatedAt => record.created_at.format(CREATED_AT_FORMAT).to_string(),
    }
}

pub fn visible_columns(show_id: bool) -> Vec<&'static FieldDescriptor> {
    TASK_FIELDS
        .iter()
        .filter(|descriptor| show_id || descriptor.visible_by_default)
        .collect()
}

pub fn render_table(view: &QueryView, show_id: bool) -> String {
    let columns = visible_columns(show_id);
    let mut grid: Vec<Vec<String>> = vec![columns.iter().map(|c| c.label.to_string()).collect()];
    grid.extend(
        view.rows()
            .iter()
            .map(|row| columns.iter().map(|c| cell(row, c.field)).collect()),
    );

    let widths: Vec<usize> = (0..columns.len())
        .map(|i| grid.iter().map(|line| line[i].chars().count()).max().unwrap_or(0))
        .collect();

    let mut out = String::new();
    if view.error {
        out.push_str("Error loading data\n");
    }
    for line in &grid {
        let padded: Vec<String> = line
            .iter()
            .zip(&widths)
            .map(|(value, &width)| format!("{value:<width$}"))
            .collect();
        out.push_str(padded.join("  ").trim_end());
        out.push('\n');
    }
    if view.rows().is_empty() {
        out.push_str("No records to display\n");
    }

    let page_size = u64::from(view.query.page_size.max(1));
    let pages = view.row_count().div_ceil(page_size).max(1);
    out.push_str(&format!(
        "page {} of {} ({} tasks)\n",
        u64::from(view.query.page_index) + 1,
        pages,
        view.row_count()
    ));
    out
}

pub fn render_form_errors(form: &TaskForm) -> String {
    form.fields()
        .filter_map(|descriptor| {
            form.validation()
                .message(descriptor.field)
                .map(|message| format!("{}: {message}\n", descriptor.label))
        })
        .collect()
}

pub fn render_notification(notification: &Notification) -> String {
    let tag = match notification.kind {
        NotificationKind::Success => "success",
        NotificationKind::Warning => "warning",
        NotificationKind::Error => "error",
    };
    match &notification.task_id {
        Some(id) => format!("[{tag}] {} (task {id})", notification.message),
        None => format!("[{tag}] {}", notification.message),
    }
}

pub fn render_event(event: &ControllerEvent) -> Option<String> {
    match event {
        ControllerEvent::Notification(notification) => Some(render_notification(notification)),
        ControllerEvent::FetchFailed(reason) => Some(format!("[error] Error loading data: {reason}")),
        ControllerEvent::QueryChanged(_) | ControllerEvent::WindowReplaced { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use client_core::MutationAction;
    use shared::domain::{ResultWindow, TaskId};

    use super::*;

    fn row(id: &str, is_complete: bool) -> TaskRecord {
        TaskRecord {
            id: TaskId::from(id),
            name: format!("task {id}"),
            description: "desc".into(),
            author: "Alice".into(),
            is_complete,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 9, 30, 0).unwrap(),
        }
    }

    fn view(rows: Vec<TaskRecord>, total_count: u64) -> QueryView {
        QueryView {
            window: ResultWindow { rows, total_count },
            ..QueryView::default()
        }
    }

    #[test]
    fn id_column_hidden_unless_requested() {
        let labels: Vec<&str> = visible_columns(false).iter().map(|c| c.label).collect();
        assert_eq!(
            labels,
            vec!["Name", "Description", "Is Complete?", "Author", "Creation date"]
        );
        assert_eq!(visible_columns(true)[0].label, "Id");
    }

    #[test]
    fn table_renders_rows_and_page_footer() {
        let out = render_table(&view(vec![row("1", false), row("2", true)], 12), false);
        assert!(out.contains("task 1"));
        assert!(out.contains("True"));
        assert!(out.contains("2024-01-01 09:30"));
        assert!(out.ends_with("page 1 of 2 (12 tasks)\n"));
        assert!(!out.contains("Error loading data"));
    }

    #[test]
    fn error_banner_keeps_stale_rows_visible() {
        let mut stale = view(vec![row("1", false)], 1);
        stale.error = true;
        let out = render_table(&stale, false);
        assert!(out.starts_with("Error loading data\n"));
        assert!(out.contains("task 1"));
    }

    #[test]
    fn empty_window_says_so() {
        let out = render_table(&view(Vec::new(), 0), false);
        assert!(out.contains("No records to display"));
        assert!(out.ends_with("page 1 of 1 (0 tasks)\n"));
    }

    #[test]
    fn form_errors_list_required_fields() {
        let mut form = TaskForm::create();
        form.set_field(TaskField::Name, "");
        form.set_field(TaskField::Author, "Alice");
        assert_eq!(render_form_errors(&form), "Name: This field is required.\n");
    }

    #[test]
    fn notifications_include_task_id_when_known() {
        let note = Notification::failure(MutationAction::Delete, Some(TaskId::from("7")));
        assert_eq!(render_notification(&note), "[error] Failed to delete task (task 7)");
        let created = Notification::success(MutationAction::Create, None);
        assert_eq!(render_notification(&created), "[success] Task created successfully");
    }
}
