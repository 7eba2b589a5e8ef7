use crate::models::Task;
use crate::tui::app::Tab;

/// In-memory mirror of the server's task list.
///
/// Replaced wholesale after every successful fetch; between fetches the
/// record returned by a mutation is patched in so the views stay current.
#[derive(Debug, Clone, Default)]
pub struct TaskBoard {
    tasks: Vec<Task>,
    category: Option<String>,
}

impl TaskBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Category the list is fetched with, if any
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn set_category(&mut self, category: Option<String>) {
        self.category = category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
    }

    pub fn replace_all(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }

    /// Insert a task, or overwrite the one with the same ID in place
    pub fn upsert(&mut self, task: Task) {
        if let Some(existing) = self.tasks.iter_mut().find(|t| t.id == task.id) {
            *existing = task;
        } else if self.accepts(&task) {
            self.tasks.push(task);
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<Task> {
        let index = self.tasks.iter().position(|t| t.id == id)?;
        Some(self.tasks.remove(index))
    }

    pub fn pending(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.is_pending()).collect()
    }

    pub fn completed(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.completed).collect()
    }

    pub fn all(&self) -> Vec<&Task> {
        self.tasks.iter().collect()
    }

    /// Rows shown on a tab, in store order
    pub fn view(&self, tab: Tab) -> Vec<&Task> {
        match tab {
            Tab::Pending => self.pending(),
            Tab::Completed => self.completed(),
            Tab::All => self.all(),
        }
    }

    fn accepts(&self, task: &Task) -> bool {
        self.category.as_deref().is_none_or(|c| c == task.category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewTask;
    use chrono::Utc;

    fn task(id: &str, category: &str, completed: bool) -> Task {
        let mut task = Task::new(
            id.to_string(),
            NewTask {
                description: format!("task {id}"),
                category: category.to_string(),
                date: "2024-01-01".to_string(),
                time: "09:00".to_string(),
            },
        );
        if completed {
            task.completed = true;
            task.completed_at = Some(Utc::now());
            task.refresh_status();
        }
        task
    }

    #[test]
    fn views_split_by_completion() {
        let mut board = TaskBoard::new();
        board.replace_all(vec![task("1", "a", false), task("2", "a", true), task("3", "b", false)]);

        let ids = |tasks: Vec<&Task>| tasks.iter().map(|t| t.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(board.view(Tab::Pending)), vec!["1", "3"]);
        assert_eq!(ids(board.view(Tab::Completed)), vec!["2"]);
        assert_eq!(ids(board.view(Tab::All)), vec!["1", "2", "3"]);
    }

    #[test]
    fn upsert_replaces_in_place() {
        let mut board = TaskBoard::new();
        board.replace_all(vec![task("1", "a", false), task("2", "a", false)]);

        board.upsert(task("1", "a", true));
        assert_eq!(board.len(), 2);
        assert_eq!(board.all()[0].id, "1");
        assert!(board.all()[0].completed);

        board.upsert(task("3", "a", false));
        assert_eq!(board.len(), 3);
    }

    #[test]
    fn upsert_skips_new_tasks_outside_filter() {
        let mut board = TaskBoard::new();
        board.set_category(Some("work".to_string()));
        board.upsert(task("1", "home", false));
        assert!(board.is_empty());
        board.upsert(task("2", "work", false));
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn blank_category_clears_filter() {
        let mut board = TaskBoard::new();
        board.set_category(Some("  ".to_string()));
        assert_eq!(board.category(), None);
        board.set_category(Some(" work ".to_string()));
        assert_eq!(board.category(), Some("work"));
    }

    #[test]
    fn remove_returns_task() {
        let mut board = TaskBoard::new();
        board.replace_all(vec![task("1", "a", false)]);
        assert_eq!(board.remove("1").map(|t| t.id), Some("1".to_string()));
        assert!(board.remove("1").is_none());
        assert!(board.is_empty());
    }
}
