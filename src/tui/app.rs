use crate::client::{ClientError, TaskClient};
use crate::models::{NewTask, Task, TaskPatch};
use crate::tui::board::TaskBoard;
use crate::tui::widgets::editor::Editor;
use crate::Config;
use ratatui::widgets::TableState;
use std::time::{Duration, Instant};

/// How long a status message stays in the status bar
const STATUS_MESSAGE_TIMEOUT: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Pending,
    Completed,
    All,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Pending, Tab::Completed, Tab::All];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Pending => "Pending",
            Tab::Completed => "Completed",
            Tab::All => "All",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Tab::Pending => 0,
            Tab::Completed => 1,
            Tab::All => 2,
        }
    }

    pub fn next(self) -> Self {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    pub fn previous(self) -> Self {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    View,
    Form,
    Filter,
    Help,
    ConfirmDelete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskField {
    Description,
    Category,
    Date,
    Time,
}

impl TaskField {
    pub const ORDER: [TaskField; 4] = [
        TaskField::Description,
        TaskField::Category,
        TaskField::Date,
        TaskField::Time,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TaskField::Description => "Description",
            TaskField::Category => "Category",
            TaskField::Date => "Date (YYYY-MM-DD)",
            TaskField::Time => "Time (HH:MM, UTC)",
        }
    }
}

/// Input form used for both adding and editing a task.
#[derive(Debug, Clone)]
pub struct TaskForm {
    pub current_field: TaskField,
    pub description: Editor,
    pub category: Editor,
    pub date: Editor,
    pub time: Editor,
    pub editing_id: Option<String>, // None for new tasks, Some(id) when editing in place
}

impl TaskForm {
    pub fn new() -> Self {
        Self {
            current_field: TaskField::Description,
            description: Editor::new(),
            category: Editor::new(),
            date: Editor::new(),
            time: Editor::new(),
            editing_id: None,
        }
    }

    /// Pre-fill the form from an existing task
    pub fn for_task(task: &Task) -> Self {
        Self {
            current_field: TaskField::Description,
            description: Editor::from_string(&task.description),
            category: Editor::from_string(&task.category),
            date: Editor::from_string(&task.date),
            time: Editor::from_string(&task.time),
            editing_id: Some(task.id.clone()),
        }
    }

    pub fn editor(&self, field: TaskField) -> &Editor {
        match field {
            TaskField::Description => &self.description,
            TaskField::Category => &self.category,
            TaskField::Date => &self.date,
            TaskField::Time => &self.time,
        }
    }

    pub fn current_editor_mut(&mut self) -> &mut Editor {
        match self.current_field {
            TaskField::Description => &mut self.description,
            TaskField::Category => &mut self.category,
            TaskField::Date => &mut self.date,
            TaskField::Time => &mut self.time,
        }
    }

    pub fn navigate(&mut self, forward: bool) {
        let len = TaskField::ORDER.len();
        let index = TaskField::ORDER
            .iter()
            .position(|f| *f == self.current_field)
            .unwrap_or(0);
        let next = if forward { (index + 1) % len } else { (index + len - 1) % len };
        self.current_field = TaskField::ORDER[next];
    }

    /// All four fields are required
    pub fn validate(&self) -> Result<(), String> {
        if TaskField::ORDER.iter().any(|f| self.editor(*f).is_blank()) {
            return Err("Please fill out all fields before saving the task".to_string());
        }
        Ok(())
    }

    pub fn to_new_task(&self) -> NewTask {
        NewTask {
            description: self.description.text().trim().to_string(),
            category: self.category.text().trim().to_string(),
            date: self.date.text().trim().to_string(),
            time: self.time.text().trim().to_string(),
        }
    }
}

impl Default for TaskForm {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Error,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub kind: MessageKind,
    pub shown_at: Instant,
}

#[derive(Debug, Clone)]
pub struct UiState {
    pub current_tab: Tab,
    pub mode: Mode,
    pub table_state: TableState,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            current_tab: Tab::Pending,
            mode: Mode::View,
            table_state: TableState::default(),
        }
    }
}

pub struct App {
    pub config: Config,
    pub client: TaskClient,
    pub board: TaskBoard,
    pub ui: UiState,
    pub form: Option<TaskForm>,
    pub filter_editor: Editor,
    pub delete_confirmation: Option<Task>,
    pub delete_modal_selection: usize, // 0 = Delete, 1 = Cancel
    pub status: Option<StatusMessage>,
}

impl App {
    pub fn new(config: Config, client: TaskClient) -> Self {
        Self {
            config,
            client,
            board: TaskBoard::new(),
            ui: UiState::default(),
            form: None,
            filter_editor: Editor::new(),
            delete_confirmation: None,
            delete_modal_selection: 0,
            status: None,
        }
    }

    // ---------------------------------------------------------------------
    // Status messages
    // ---------------------------------------------------------------------

    pub fn set_status_message(&mut self, message: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: message.into(),
            kind: MessageKind::Info,
            shown_at: Instant::now(),
        });
    }

    pub fn set_error_message(&mut self, message: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: message.into(),
            kind: MessageKind::Error,
            shown_at: Instant::now(),
        });
    }

    pub fn check_status_message_timeout(&mut self) {
        if let Some(ref status) = self.status {
            if status.shown_at.elapsed() >= STATUS_MESSAGE_TIMEOUT {
                self.status = None;
            }
        }
    }

    fn report_failure(&mut self, action: &str, error: &ClientError) {
        tracing::error!(%error, "{} failed", action);
        self.set_error_message(format!("Error {}: {}", action, error));
    }

    // ---------------------------------------------------------------------
    // Selection
    // ---------------------------------------------------------------------

    /// Rows of the current tab
    pub fn visible_tasks(&self) -> Vec<&Task> {
        self.board.view(self.ui.current_tab)
    }

    pub fn selected_task(&self) -> Option<&Task> {
        let index = self.ui.table_state.selected()?;
        self.visible_tasks().get(index).copied()
    }

    /// Keep the selection inside the current tab's rows
    pub fn clamp_selection(&mut self) {
        let len = self.visible_tasks().len();
        if len == 0 {
            self.ui.table_state.select(None);
        } else {
            let index = self.ui.table_state.selected().unwrap_or(0).min(len - 1);
            self.ui.table_state.select(Some(index));
        }
    }

    pub fn move_selection_up(&mut self) {
        if let Some(index) = self.ui.table_state.selected() {
            self.ui.table_state.select(Some(index.saturating_sub(1)));
        }
        self.clamp_selection();
    }

    pub fn move_selection_down(&mut self) {
        let next = self.ui.table_state.selected().map_or(0, |i| i + 1);
        self.ui.table_state.select(Some(next));
        self.clamp_selection();
    }

    pub fn switch_tab(&mut self, tab: Tab) {
        if self.ui.current_tab != tab {
            self.ui.current_tab = tab;
            self.ui.table_state.select(Some(0));
        }
        self.clamp_selection();
    }

    // ---------------------------------------------------------------------
    // Modes
    // ---------------------------------------------------------------------

    pub fn enter_create_mode(&mut self) {
        self.form = Some(TaskForm::new());
        self.ui.mode = Mode::Form;
    }

    /// Open the form pre-filled with the selected task; saving updates it in place
    pub fn enter_edit_mode(&mut self) {
        let Some(task) = self.selected_task() else {
            self.set_status_message("No task selected");
            return;
        };
        self.form = Some(TaskForm::for_task(task));
        self.ui.mode = Mode::Form;
    }

    /// Abandoning the form never touches the stored task
    pub fn exit_form_mode(&mut self) {
        self.form = None;
        self.ui.mode = Mode::View;
    }

    pub fn enter_filter_mode(&mut self) {
        self.filter_editor = Editor::from_string(self.board.category().unwrap_or(""));
        self.ui.mode = Mode::Filter;
    }

    pub fn exit_filter_mode(&mut self) {
        self.ui.mode = Mode::View;
    }

    pub fn enter_help_mode(&mut self) {
        self.ui.mode = Mode::Help;
    }

    pub fn exit_help_mode(&mut self) {
        self.ui.mode = Mode::View;
    }

    pub fn request_delete(&mut self) {
        let Some(task) = self.selected_task().cloned() else {
            self.set_status_message("No task selected");
            return;
        };
        self.delete_confirmation = Some(task);
        self.delete_modal_selection = 0;
        self.ui.mode = Mode::ConfirmDelete;
    }

    pub fn cancel_delete(&mut self) {
        self.delete_confirmation = None;
        self.ui.mode = Mode::View;
    }

    // ---------------------------------------------------------------------
    // Server round-trips
    // ---------------------------------------------------------------------

    /// Replace the mirror with the server's current list
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        let tasks = self.client.list(self.board.category()).await?;
        self.board.replace_all(tasks);
        self.clamp_selection();
        Ok(())
    }

    /// Refresh after a mutation; the mutation itself already succeeded, so a
    /// failure here only gets logged
    async fn resync(&mut self) {
        if let Err(e) = self.refresh().await {
            tracing::warn!(error = %e, "refresh after update failed");
        }
    }

    pub async fn reload(&mut self) {
        match self.refresh().await {
            Ok(()) => self.set_status_message(format!("Loaded {} tasks", self.board.len())),
            Err(e) => self.report_failure("fetching tasks", &e),
        }
    }

    pub async fn apply_filter(&mut self) {
        let category = self.filter_editor.text();
        self.board.set_category(Some(category));
        self.ui.mode = Mode::View;
        match self.refresh().await {
            Ok(()) => match self.board.category() {
                Some(category) => {
                    let message = format!("Showing category '{}'", category);
                    self.set_status_message(message);
                }
                None => self.set_status_message("Showing all categories"),
            },
            Err(e) => self.report_failure("fetching tasks", &e),
        }
    }

    /// Create a task, or update the one being edited in place
    pub async fn save_form(&mut self) {
        let Some(form) = self.form.clone() else {
            return;
        };
        if let Err(message) = form.validate() {
            self.set_error_message(message);
            return;
        }

        let input = form.to_new_task();
        let result = match form.editing_id {
            Some(ref id) => self.client.replace(id, &TaskPatch::from(input)).await,
            None => self.client.create(&input).await,
        };

        match result {
            Ok(task) => {
                let message = if form.editing_id.is_some() {
                    "Task updated successfully!"
                } else {
                    "Task added successfully!"
                };
                self.board.upsert(task);
                self.exit_form_mode();
                self.resync().await;
                self.set_status_message(message);
            }
            // Keep the form open so nothing typed is lost
            Err(e) => {
                let action = if form.editing_id.is_some() { "updating task" } else { "adding task" };
                self.report_failure(action, &e);
            }
        }
    }

    pub async fn complete_selected(&mut self) {
        let Some(id) = self.selected_task().map(|t| t.id.clone()) else {
            self.set_status_message("No task selected");
            return;
        };

        match self.client.complete(&id).await {
            Ok(task) => {
                let message = format!("Task marked as completed ({})", task.status);
                self.board.upsert(task);
                self.resync().await;
                self.clamp_selection();
                self.set_status_message(message);
            }
            Err(e) => self.report_failure("completing task", &e),
        }
    }

    pub async fn confirm_delete(&mut self) {
        let Some(task) = self.delete_confirmation.take() else {
            return;
        };
        self.ui.mode = Mode::View;

        match self.client.delete(&task.id).await {
            Ok(deleted) => {
                self.board.remove(&deleted.id);
                self.resync().await;
                self.clamp_selection();
                self.set_status_message("Task deleted successfully!");
            }
            Err(e) => {
                // Someone else already removed it; drop it from the mirror too
                if e.is_not_found() {
                    self.board.remove(&task.id);
                    self.clamp_selection();
                }
                self.report_failure("deleting task", &e);
            }
        }
    }
}
