use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StatusError {
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("Invalid time '{0}', expected HH:MM")]
    InvalidTime(String),
}

/// Derived completion label of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "Incomplete")]
    Incomplete,
    #[serde(rename = "Completed on time")]
    CompletedOnTime,
    #[serde(rename = "Completed late")]
    CompletedLate,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Incomplete => "Incomplete",
            TaskStatus::CompletedOnTime => "Completed on time",
            TaskStatus::CompletedLate => "Completed late",
        }
    }

    /// Status of a task given its source fields.
    ///
    /// A completed task whose deadline cannot be parsed is reported late;
    /// writes reject such values, so this only happens for rows edited
    /// behind the service's back.
    pub fn of(
        completed: bool,
        date: &str,
        time: &str,
        completed_at: Option<DateTime<Utc>>,
    ) -> Self {
        if !completed {
            return TaskStatus::Incomplete;
        }
        let Some(completed_at) = completed_at else {
            tracing::warn!(date, time, "completed task has no completion timestamp");
            return TaskStatus::CompletedLate;
        };
        match derive_status(date, time, completed_at) {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!(error = %e, "cannot derive status from stored deadline");
                TaskStatus::CompletedLate
            }
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a due date in ISO 8601 format (YYYY-MM-DD)
pub fn parse_due_date(date: &str) -> Result<NaiveDate, StatusError> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| StatusError::InvalidDate(date.to_string()))
}

/// Parse a due time of day (HH:MM, seconds optional)
pub fn parse_due_time(time: &str) -> Result<NaiveTime, StatusError> {
    let time_str = time.trim();
    NaiveTime::parse_from_str(time_str, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(time_str, "%H:%M:%S"))
        .map_err(|_| StatusError::InvalidTime(time.to_string()))
}

/// Check that a date/time pair forms a valid deadline.
pub fn validate_due(date: &str, time: &str) -> Result<(), StatusError> {
    deadline(date, time).map(|_| ())
}

/// The deadline instant: due date and time of day, interpreted as UTC.
pub fn deadline(date: &str, time: &str) -> Result<DateTime<Utc>, StatusError> {
    let date = parse_due_date(date)?;
    let time = parse_due_time(time)?;
    Ok(NaiveDateTime::new(date, time).and_utc())
}

/// On time iff `completed_at <= deadline`; a tie counts as on time.
pub fn derive_status(
    date: &str,
    time: &str,
    completed_at: DateTime<Utc>,
) -> Result<TaskStatus, StatusError> {
    let due = deadline(date, time)?;
    if completed_at <= due {
        Ok(TaskStatus::CompletedOnTime)
    } else {
        Ok(TaskStatus::CompletedLate)
    }
}
