use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::database::Database;
use crate::error::ServiceError;
use crate::models::{NewTask, Task, TaskPatch};
use crate::status;

/// CRUD operations over the task collection.
///
/// Owns validation and status semantics; the store only persists source
/// fields.
pub struct TaskService {
    db: Database,
}

impl TaskService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert a new, incomplete task and return it with its assigned ID.
    pub fn create(&self, mut input: NewTask) -> Result<Task, ServiceError> {
        // Categories are matched exactly when filtering, so store them trimmed
        input.category = input.category.trim().to_string();
        validate_fields(&input.description, &input.category, &input.date, &input.time)?;

        let task = Task::new(Uuid::new_v4().to_string(), input);
        self.db.insert_task(&task)?;
        tracing::info!(id = %task.id, category = %task.category, "task created");
        Ok(task)
    }

    /// All tasks in store order, optionally restricted to an exact category.
    pub fn list(&self, category: Option<&str>) -> Result<Vec<Task>, ServiceError> {
        Ok(self.db.get_all_tasks(category)?)
    }

    pub fn get(&self, id: &str) -> Result<Task, ServiceError> {
        self.db.get_task(id)?.ok_or_else(|| ServiceError::not_found(id))
    }

    /// Merge a payload onto an existing task and persist it.
    pub fn replace(&self, id: &str, patch: TaskPatch) -> Result<Task, ServiceError> {
        self.replace_at(id, patch, Utc::now())
    }

    /// Same as [`TaskService::replace`] with an explicit clock, used when the
    /// patch marks the task complete without a timestamp.
    pub fn replace_at(
        &self,
        id: &str,
        patch: TaskPatch,
        now: DateTime<Utc>,
    ) -> Result<Task, ServiceError> {
        let mut task = self.get(id)?;
        task.apply(patch, now);
        task.category = task.category.trim().to_string();
        validate_fields(&task.description, &task.category, &task.date, &task.time)?;

        self.persist(&task)?;
        tracing::info!(id = %task.id, status = %task.status, "task updated");
        Ok(task)
    }

    /// Mark a task completed now.
    pub fn complete(&self, id: &str) -> Result<Task, ServiceError> {
        self.complete_at(id, Utc::now())
    }

    /// Mark a task completed at `completed_at`. Completing twice overwrites
    /// the earlier timestamp.
    pub fn complete_at(&self, id: &str, completed_at: DateTime<Utc>) -> Result<Task, ServiceError> {
        let mut task = self.get(id)?;
        task.completed = true;
        task.completed_at = Some(completed_at);
        task.refresh_status();

        self.persist(&task)?;
        tracing::info!(id = %task.id, status = %task.status, "task completed");
        Ok(task)
    }

    /// Remove a task and return what was deleted.
    pub fn delete(&self, id: &str) -> Result<Task, ServiceError> {
        let task = self.db.delete_task(id)?.ok_or_else(|| ServiceError::not_found(id))?;
        tracing::info!(id = %task.id, "task deleted");
        Ok(task)
    }

    fn persist(&self, task: &Task) -> Result<(), ServiceError> {
        // Row can vanish between read and write if a delete races in
        if !self.db.update_task(task)? {
            return Err(ServiceError::not_found(&task.id));
        }
        Ok(())
    }
}

fn validate_fields(description: &str, category: &str, date: &str, time: &str) -> Result<(), ServiceError> {
    if description.trim().is_empty() {
        return Err(ServiceError::Validation("description is required".to_string()));
    }
    if category.trim().is_empty() {
        return Err(ServiceError::Validation("category is required".to_string()));
    }
    status::validate_due(date, time)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::TaskStatus;
    use chrono::TimeZone;

    fn service() -> TaskService {
        TaskService::new(Database::open_in_memory().unwrap())
    }

    fn input(category: &str) -> NewTask {
        NewTask {
            description: "Write report".to_string(),
            category: category.to_string(),
            date: "2024-01-01".to_string(),
            time: "09:00".to_string(),
        }
    }

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, h, m, s).unwrap()
    }

    #[test]
    fn create_then_list_includes_new_task() {
        let svc = service();
        let created = svc.create(input("work")).unwrap();
        assert!(!created.id.is_empty());

        let listed = svc.list(None).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, created.id);
        assert!(!listed[0].completed);
        assert_eq!(listed[0].status, TaskStatus::Incomplete);
    }

    #[test]
    fn create_assigns_distinct_ids() {
        let svc = service();
        let a = svc.create(input("work")).unwrap();
        let b = svc.create(input("work")).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn create_rejects_missing_fields() {
        let svc = service();
        let mut bad = input("work");
        bad.description = "   ".to_string();
        assert!(matches!(svc.create(bad), Err(ServiceError::Validation(_))));

        let bad = input("");
        assert!(matches!(svc.create(bad), Err(ServiceError::Validation(_))));
    }

    #[test]
    fn create_rejects_malformed_deadline() {
        let svc = service();
        let mut bad = input("work");
        bad.date = "01/02/2024".to_string();
        assert!(matches!(svc.create(bad), Err(ServiceError::Validation(_))));

        let mut bad = input("work");
        bad.time = "25:00".to_string();
        assert!(matches!(svc.create(bad), Err(ServiceError::Validation(_))));
        assert!(svc.list(None).unwrap().is_empty());
    }

    #[test]
    fn complete_before_deadline_is_on_time() {
        let svc = service();
        let task = svc.create(input("work")).unwrap();
        let done = svc.complete_at(&task.id, at(8, 59, 59)).unwrap();
        assert!(done.completed);
        assert_eq!(done.completed_at, Some(at(8, 59, 59)));
        assert_eq!(done.status, TaskStatus::CompletedOnTime);
    }

    #[test]
    fn complete_after_deadline_is_late() {
        let svc = service();
        let task = svc.create(input("work")).unwrap();
        let done = svc.complete_at(&task.id, at(9, 0, 1)).unwrap();
        assert_eq!(done.status, TaskStatus::CompletedLate);
        assert_eq!(svc.get(&task.id).unwrap().status, TaskStatus::CompletedLate);
    }

    #[test]
    fn completing_twice_overwrites_timestamp() {
        let svc = service();
        let task = svc.create(input("work")).unwrap();
        svc.complete_at(&task.id, at(8, 0, 0)).unwrap();
        let again = svc.complete_at(&task.id, at(10, 0, 0)).unwrap();
        assert_eq!(again.completed_at, Some(at(10, 0, 0)));
        assert_eq!(again.status, TaskStatus::CompletedLate);
    }

    #[test]
    fn replace_merges_and_rederives_status() {
        let svc = service();
        let task = svc.create(input("work")).unwrap();
        svc.complete_at(&task.id, at(10, 0, 0)).unwrap();

        // Pushing the deadline out turns a late completion into an on-time one
        let patch = TaskPatch { time: Some("11:00".to_string()), ..Default::default() };
        let updated = svc.replace_at(&task.id, patch, at(12, 0, 0)).unwrap();
        assert_eq!(updated.time, "11:00");
        assert_eq!(updated.description, "Write report");
        assert_eq!(updated.status, TaskStatus::CompletedOnTime);
    }

    #[test]
    fn replace_rejects_invalid_merge() {
        let svc = service();
        let task = svc.create(input("work")).unwrap();
        let patch = TaskPatch { date: Some("tomorrow".to_string()), ..Default::default() };
        assert!(matches!(svc.replace(&task.id, patch), Err(ServiceError::Validation(_))));
        assert_eq!(svc.get(&task.id).unwrap().date, "2024-01-01");
    }

    #[test]
    fn missing_ids_are_not_found() {
        let svc = service();
        assert!(matches!(svc.get("nope"), Err(ServiceError::NotFound(_))));
        assert!(matches!(svc.complete("nope"), Err(ServiceError::NotFound(_))));
        assert!(matches!(svc.replace("nope", TaskPatch::default()), Err(ServiceError::NotFound(_))));
        assert!(matches!(svc.delete("nope"), Err(ServiceError::NotFound(_))));
    }

    #[test]
    fn delete_returns_record_and_removes_it() {
        let svc = service();
        let task = svc.create(input("work")).unwrap();
        let deleted = svc.delete(&task.id).unwrap();
        assert_eq!(deleted, task);
        assert!(svc.list(None).unwrap().is_empty());
    }

    #[test]
    fn list_filters_by_exact_category() {
        let svc = service();
        svc.create(input("work")).unwrap();
        svc.create(input("home")).unwrap();
        svc.create(input("work")).unwrap();

        let work = svc.list(Some("work")).unwrap();
        assert_eq!(work.len(), 2);
        assert!(work.iter().all(|t| t.category == "work"));
        assert!(svc.list(Some("wor")).unwrap().is_empty());
    }

    #[test]
    fn categories_are_stored_trimmed() {
        let svc = service();
        let task = svc.create(input("  work ")).unwrap();
        assert_eq!(task.category, "work");
        assert_eq!(svc.list(Some("work")).unwrap().len(), 1);

        let patch = TaskPatch { category: Some(" home".to_string()), ..Default::default() };
        assert_eq!(svc.replace(&task.id, patch).unwrap().category, "home");
        assert_eq!(svc.list(Some("home")).unwrap().len(), 1);
    }
}
