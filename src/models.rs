use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::status::TaskStatus;

/// A to-do item with a due deadline and completion state.
///
/// `status` is derived from the other fields whenever a task is loaded from
/// the store; it is never written back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub description: String,
    pub category: String,
    pub date: String, // YYYY-MM-DD
    pub time: String, // HH:MM, UTC
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: TaskStatus,
}

impl Task {
    /// Build a fresh, incomplete task from a create payload.
    pub fn new(id: String, input: NewTask) -> Self {
        Self {
            id,
            description: input.description,
            category: input.category,
            date: input.date,
            time: input.time,
            completed: false,
            completed_at: None,
            status: TaskStatus::Incomplete,
        }
    }

    /// Recompute `status` from the source fields.
    pub fn refresh_status(&mut self) {
        self.status = TaskStatus::of(self.completed, &self.date, &self.time, self.completed_at);
    }

    /// Merge a partial payload onto this task.
    ///
    /// Keeps `completed_at` non-null iff `completed`: marking a task complete
    /// without a timestamp stamps it with `now`, and reopening clears it.
    pub fn apply(&mut self, patch: TaskPatch, now: DateTime<Utc>) {
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(time) = patch.time {
            self.time = time;
        }
        if let Some(completed_at) = patch.completed_at {
            self.completed_at = completed_at;
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }

        if self.completed && self.completed_at.is_none() {
            self.completed_at = Some(now);
        } else if !self.completed {
            self.completed_at = None;
        }

        self.refresh_status();
    }

    /// Whether the task still needs doing.
    pub fn is_pending(&self) -> bool {
        !self.completed
    }
}

/// Payload accepted when creating a task.
///
/// Completion fields and status sent by a client are ignored: new tasks
/// always start incomplete.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
}

/// Payload accepted by the replace-update endpoint; present fields are
/// merged onto the stored record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    // Outer None: field absent. Some(None): explicit null.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_explicit_null"
    )]
    pub completed_at: Option<Option<DateTime<Utc>>>,
}

impl From<NewTask> for TaskPatch {
    fn from(input: NewTask) -> Self {
        Self {
            description: Some(input.description),
            category: Some(input.category),
            date: Some(input.date),
            time: Some(input.time),
            completed: None,
            completed_at: None,
        }
    }
}

fn deserialize_explicit_null<'de, D>(deserializer: D) -> Result<Option<Option<DateTime<Utc>>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<DateTime<Utc>>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Task {
        Task::new(
            "abc".to_string(),
            NewTask {
                description: "Write report".to_string(),
                category: "work".to_string(),
                date: "2024-01-01".to_string(),
                time: "09:00".to_string(),
            },
        )
    }

    #[test]
    fn new_task_starts_incomplete() {
        let task = sample();
        assert!(!task.completed);
        assert!(task.completed_at.is_none());
        assert_eq!(task.status, TaskStatus::Incomplete);
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["_id"], "abc");
        assert_eq!(json["completedAt"], serde_json::Value::Null);
        assert_eq!(json["status"], "Incomplete");
    }

    #[test]
    fn accepts_plain_id_alias() {
        let task: Task = serde_json::from_value(serde_json::json!({
            "id": "xyz",
            "description": "d",
            "category": "c",
            "date": "2024-01-01",
            "time": "09:00"
        }))
        .unwrap();
        assert_eq!(task.id, "xyz");
        assert!(!task.completed);
    }

    #[test]
    fn patch_marks_complete_and_stamps_timestamp() {
        let mut task = sample();
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        task.apply(TaskPatch { completed: Some(true), ..Default::default() }, now);
        assert_eq!(task.completed_at, Some(now));
        assert_eq!(task.status, TaskStatus::CompletedOnTime);
    }

    #[test]
    fn patch_reopening_clears_timestamp() {
        let mut task = sample();
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 8, 0, 0).unwrap();
        task.apply(TaskPatch { completed: Some(true), ..Default::default() }, now);
        assert_eq!(task.status, TaskStatus::CompletedLate);

        task.apply(TaskPatch { completed: Some(false), ..Default::default() }, now);
        assert!(task.completed_at.is_none());
        assert_eq!(task.status, TaskStatus::Incomplete);
    }

    #[test]
    fn patch_distinguishes_absent_and_null_completed_at() {
        let absent: TaskPatch = serde_json::from_str(r#"{"description":"x"}"#).unwrap();
        assert_eq!(absent.completed_at, None);

        let null: TaskPatch = serde_json::from_str(r#"{"completedAt":null}"#).unwrap();
        assert_eq!(null.completed_at, Some(None));
    }

    #[test]
    fn patch_ignores_status_field() {
        let patch: TaskPatch =
            serde_json::from_str(r#"{"status":"Completed on time","category":"home"}"#).unwrap();
        let mut task = sample();
        task.apply(patch, Utc::now());
        assert_eq!(task.category, "home");
        assert_eq!(task.status, TaskStatus::Incomplete);
    }
}
