use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

use crate::models::Task;
use crate::status::TaskStatus;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),
    #[error("Failed to create database directory: {0}")]
    DirectoryError(String),
    #[error("Database connection lock poisoned")]
    LockPoisoned,
}

const TASK_COLUMNS: &str = "id, description, category, date, time, completed, completed_at";

/// Task collection backed by SQLite.
///
/// Each row is one task document. Only source fields are stored; the
/// derived status is recomputed every time a row is read.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Create a new database connection and initialize the schema
    pub fn new(path: &str) -> Result<Self, DatabaseError> {
        let db_path = PathBuf::from(path);

        // Create parent directory if it doesn't exist
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| DatabaseError::DirectoryError(e.to_string()))?;
            }
        }

        let conn = Connection::open(&db_path)?;
        Self::with_connection(conn)
    }

    /// Open a private in-memory database (used by tests and dry runs)
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, DatabaseError> {
        let db = Database { conn: Mutex::new(conn) };
        db.initialize_schema()?;
        Ok(db)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, DatabaseError> {
        self.conn.lock().map_err(|_| DatabaseError::LockPoisoned)
    }

    /// Initialize the database schema (tables and indexes)
    fn initialize_schema(&self) -> Result<(), DatabaseError> {
        let conn = self.conn()?;

        // seq keeps insertion order; id is the opaque identifier handed out
        conn.execute(
            "CREATE TABLE IF NOT EXISTS tasks (
                seq             INTEGER PRIMARY KEY AUTOINCREMENT,
                id              TEXT NOT NULL UNIQUE,
                description     TEXT NOT NULL,
                category        TEXT NOT NULL,
                date            TEXT NOT NULL,
                time            TEXT NOT NULL,
                completed       INTEGER NOT NULL DEFAULT 0,
                completed_at    TEXT
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_tasks_category ON tasks(category)",
            [],
        )?;

        Ok(())
    }

    /// Insert a task document
    pub fn insert_task(&self, task: &Task) -> Result<(), DatabaseError> {
        self.conn()?.execute(
            "INSERT INTO tasks (id, description, category, date, time, completed, completed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                task.id,
                task.description,
                task.category,
                task.date,
                task.time,
                if task.completed { 1 } else { 0 },
                task.completed_at.map(|t| t.to_rfc3339()),
            ],
        )?;
        Ok(())
    }

    /// Helper function to map a row to a Task, deriving its status.
    ///
    /// Rows edited outside the service still load: an unreadable
    /// `completed_at` is dropped, and a completed flag without a timestamp
    /// is cleared so `completed` and `completed_at` stay paired.
    fn row_to_task(row: &rusqlite::Row) -> Result<Task, rusqlite::Error> {
        let id: String = row.get(0)?;
        let raw_completed_at: Option<String> = row.get(6)?;
        let completed_at = raw_completed_at.and_then(|raw| match DateTime::parse_from_rfc3339(&raw) {
            Ok(t) => Some(t.with_timezone(&Utc)),
            Err(e) => {
                tracing::warn!(id = %id, value = %raw, error = %e, "ignoring unreadable completion timestamp");
                None
            }
        });

        let mut completed = row.get::<_, i64>(5)? != 0;
        if completed && completed_at.is_none() {
            tracing::warn!(id = %id, "completed task has no completion timestamp, treating as incomplete");
            completed = false;
        }

        let mut task = Task {
            id,
            description: row.get(1)?,
            category: row.get(2)?,
            date: row.get(3)?,
            time: row.get(4)?,
            completed,
            completed_at,
            status: TaskStatus::Incomplete,
        };
        task.refresh_status();
        Ok(task)
    }

    /// Get all tasks in insertion order, optionally restricted to one category (exact match)
    pub fn get_all_tasks(&self, category: Option<&str>) -> Result<Vec<Task>, DatabaseError> {
        let conn = self.conn()?;

        if let Some(category) = category {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TASK_COLUMNS} FROM tasks WHERE category = ?1 ORDER BY seq ASC"
            ))?;
            let tasks = stmt
                .query_map(rusqlite::params![category], Self::row_to_task)?
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(tasks);
        }

        let mut stmt = conn.prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks ORDER BY seq ASC"))?;
        let tasks = stmt
            .query_map([], Self::row_to_task)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(tasks)
    }

    /// Find a single task by ID
    pub fn get_task(&self, id: &str) -> Result<Option<Task>, DatabaseError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"))?;
        let task = stmt
            .query_row(rusqlite::params![id], Self::row_to_task)
            .optional()?;
        Ok(task)
    }

    /// Overwrite a stored task; returns false if no row has that ID
    pub fn update_task(&self, task: &Task) -> Result<bool, DatabaseError> {
        let changed = self.conn()?.execute(
            "UPDATE tasks
             SET description = ?1, category = ?2, date = ?3, time = ?4, completed = ?5, completed_at = ?6
             WHERE id = ?7",
            rusqlite::params![
                task.description,
                task.category,
                task.date,
                task.time,
                if task.completed { 1 } else { 0 },
                task.completed_at.map(|t| t.to_rfc3339()),
                task.id,
            ],
        )?;
        Ok(changed > 0)
    }

    /// Delete a task by ID, returning the removed document if it existed
    pub fn delete_task(&self, id: &str) -> Result<Option<Task>, DatabaseError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let existing = {
            let mut stmt = tx.prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"))?;
            stmt.query_row(rusqlite::params![id], Self::row_to_task)
                .optional()?
        };
        if existing.is_some() {
            tx.execute("DELETE FROM tasks WHERE id = ?1", rusqlite::params![id])?;
        }

        tx.commit()?;
        Ok(existing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewTask;
    use chrono::TimeZone;

    fn task(id: &str, category: &str) -> Task {
        Task::new(
            id.to_string(),
            NewTask {
                description: format!("task {id}"),
                category: category.to_string(),
                date: "2024-01-01".to_string(),
                time: "09:00".to_string(),
            },
        )
    }

    #[test]
    fn insert_then_list_keeps_insertion_order() {
        let db = Database::open_in_memory().unwrap();
        db.insert_task(&task("b", "work")).unwrap();
        db.insert_task(&task("a", "home")).unwrap();

        let ids: Vec<_> = db.get_all_tasks(None).unwrap().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn category_filter_is_exact() {
        let db = Database::open_in_memory().unwrap();
        db.insert_task(&task("1", "work")).unwrap();
        db.insert_task(&task("2", "Work")).unwrap();
        db.insert_task(&task("3", "workshop")).unwrap();

        let found = db.get_all_tasks(Some("work")).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "1");
    }

    #[test]
    fn status_is_derived_on_read() {
        let db = Database::open_in_memory().unwrap();
        let mut t = task("1", "work");
        t.completed = true;
        t.completed_at = Some(Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap());
        // Whatever status the caller holds is not persisted
        t.status = TaskStatus::CompletedOnTime;
        db.insert_task(&t).unwrap();

        let stored = db.get_task("1").unwrap().unwrap();
        assert_eq!(stored.status, TaskStatus::CompletedLate);
        assert_eq!(stored.completed_at, t.completed_at);
    }

    #[test]
    fn unreadable_completion_timestamp_does_not_break_listing() {
        let db = Database::open_in_memory().unwrap();
        db.insert_task(&task("good", "work")).unwrap();
        db.insert_task(&task("bad", "work")).unwrap();
        db.conn()
            .unwrap()
            .execute("UPDATE tasks SET completed = 1, completed_at = 'yesterday' WHERE id = 'bad'", [])
            .unwrap();

        let tasks = db.get_all_tasks(None).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].id, "good");

        let bad = &tasks[1];
        assert_eq!(bad.id, "bad");
        assert!(!bad.completed);
        assert_eq!(bad.completed_at, None);
        assert_eq!(bad.status, TaskStatus::Incomplete);
    }

    #[test]
    fn completed_flag_without_timestamp_loads_as_incomplete() {
        let db = Database::open_in_memory().unwrap();
        db.insert_task(&task("1", "work")).unwrap();
        db.conn()
            .unwrap()
            .execute("UPDATE tasks SET completed = 1, completed_at = NULL WHERE id = '1'", [])
            .unwrap();

        let stored = db.get_task("1").unwrap().unwrap();
        assert!(!stored.completed);
        assert_eq!(stored.completed_at, None);
        assert_eq!(stored.status, TaskStatus::Incomplete);
    }

    #[test]
    fn update_missing_row_reports_false() {
        let db = Database::open_in_memory().unwrap();
        assert!(!db.update_task(&task("ghost", "x")).unwrap());
    }

    #[test]
    fn delete_returns_removed_task() {
        let db = Database::open_in_memory().unwrap();
        db.insert_task(&task("1", "work")).unwrap();

        let removed = db.delete_task("1").unwrap().unwrap();
        assert_eq!(removed.id, "1");
        assert!(db.get_task("1").unwrap().is_none());
        assert!(db.delete_task("1").unwrap().is_none());
    }

    #[test]
    fn opens_file_in_new_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tasks.db");
        let db = Database::new(path.to_str().unwrap()).unwrap();
        db.insert_task(&task("1", "work")).unwrap();
        drop(db);

        let reopened = Database::new(path.to_str().unwrap()).unwrap();
        assert_eq!(reopened.get_all_tasks(None).unwrap().len(), 1);
    }
}
