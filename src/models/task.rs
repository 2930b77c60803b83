use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::UnknownCode;

/// Represents the priority of a task.
/// Persisted as a three-letter code (`CRT`, `HIG`, `MED`, `LOW`).
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskPriority {
    #[serde(rename = "CRT", alias = "CRITICAL")]
    Critical,
    #[serde(rename = "HIG", alias = "HIGH")]
    High,
    #[default]
    #[serde(rename = "MED", alias = "MEDIUM")]
    Medium,
    #[serde(rename = "LOW")]
    Low,
}

impl TaskPriority {
    /// The stable storage code for this priority.
    pub fn as_code(&self) -> &'static str {
        match self {
            TaskPriority::Critical => "CRT",
            TaskPriority::High => "HIG",
            TaskPriority::Medium => "MED",
            TaskPriority::Low => "LOW",
        }
    }
}

impl TryFrom<String> for TaskPriority {
    type Error = UnknownCode;

    fn try_from(code: String) -> Result<Self, Self::Error> {
        match code.as_str() {
            "CRT" => Ok(TaskPriority::Critical),
            "HIG" => Ok(TaskPriority::High),
            "MED" => Ok(TaskPriority::Medium),
            "LOW" => Ok(TaskPriority::Low),
            _ => Err(UnknownCode::new("task priority", code)),
        }
    }
}

/// Represents the status of a task.
/// Persisted as `NEW`, `INP` or `CMP`. Any status may follow any other.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskStatus {
    /// Task is yet to be started.
    #[default]
    #[serde(rename = "NEW")]
    New,
    /// Task is currently being worked on.
    #[serde(rename = "INP", alias = "IN_PROGRESS")]
    InProgress,
    /// Task is completed.
    #[serde(rename = "CMP", alias = "COMPLETED")]
    Completed,
}

impl TaskStatus {
    /// The stable storage code for this status.
    pub fn as_code(&self) -> &'static str {
        match self {
            TaskStatus::New => "NEW",
            TaskStatus::InProgress => "INP",
            TaskStatus::Completed => "CMP",
        }
    }
}

impl TryFrom<String> for TaskStatus {
    type Error = UnknownCode;

    fn try_from(code: String) -> Result<Self, Self::Error> {
        match code.as_str() {
            "NEW" => Ok(TaskStatus::New),
            "INP" => Ok(TaskStatus::InProgress),
            "CMP" => Ok(TaskStatus::Completed),
            _ => Err(UnknownCode::new("task status", code)),
        }
    }
}

/// Input structure for creating or updating a task.
///
/// There is no owner field; the owner always comes from the authenticated
/// principal.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    /// Short summary of the task, 1 to 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub summary: String,

    /// Optional free-text description, at most 1000 characters.
    #[validate(length(max = 1000))]
    pub description: Option<String>,

    #[serde(default)]
    pub status: TaskStatus,

    #[serde(default)]
    pub priority: TaskPriority,
}

/// A task as stored and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub summary: String,
    pub description: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: TaskStatus,
    #[sqlx(try_from = "String")]
    pub priority: TaskPriority,
    /// Identifier of the owning user.
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates a new `Task` owned by `owner_id`.
    pub fn new(input: TaskInput, owner_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            summary: input.summary,
            description: input.description,
            status: input.status,
            priority: input.priority,
            user_id: owner_id,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// Overwrites the editable fields and hands the task to `editor_id`.
    ///
    /// The owner is always replaced: whoever last edited a task owns it.
    pub fn apply(&mut self, input: TaskInput, editor_id: Uuid) {
        self.summary = input.summary;
        self.description = input.description;
        self.status = input.status;
        self.priority = input.priority;
        self.user_id = editor_id;
        self.updated_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(summary: &str) -> TaskInput {
        TaskInput {
            summary: summary.to_string(),
            description: Some("Test Description".to_string()),
            status: TaskStatus::New,
            priority: TaskPriority::High,
        }
    }

    #[test]
    fn test_task_creation() {
        let owner = Uuid::new_v4();
        let task = Task::new(input("Test Task"), owner);
        assert_eq!(task.summary, "Test Task");
        assert_eq!(task.user_id, owner);
        assert!(task.updated_at.is_none());
    }

    #[test]
    fn test_apply_reassigns_owner() {
        let owner = Uuid::new_v4();
        let editor = Uuid::new_v4();
        let mut task = Task::new(input("Original"), owner);

        let mut edit = input("Edited");
        edit.status = TaskStatus::Completed;
        task.apply(edit, editor);

        assert_eq!(task.summary, "Edited");
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.user_id, editor);
        assert!(task.updated_at.is_some());
    }

    #[test]
    fn test_task_validation() {
        assert!(input("Valid Task").validate().is_ok());
        assert!(input("").validate().is_err());
        assert!(input(&"a".repeat(201)).validate().is_err());

        let mut long_description = input("Valid title");
        long_description.description = Some("b".repeat(1001));
        assert!(long_description.validate().is_err());
    }

    #[test]
    fn test_enum_codes() {
        let status: TaskStatus = serde_json::from_str("\"INP\"").unwrap();
        assert_eq!(status, TaskStatus::InProgress);
        let status: TaskStatus = serde_json::from_str("\"COMPLETED\"").unwrap();
        assert_eq!(status, TaskStatus::Completed);
        assert_eq!(serde_json::to_string(&TaskPriority::Critical).unwrap(), "\"CRT\"");

        assert_eq!(TaskStatus::try_from("CMP".to_string()).unwrap(), TaskStatus::Completed);
        assert_eq!(TaskPriority::try_from("HIG".to_string()).unwrap(), TaskPriority::High);
        assert!(TaskStatus::try_from("DONE".to_string()).is_err());
    }

    #[test]
    fn test_input_defaults() {
        let input: TaskInput = serde_json::from_str(r#"{"summary": "Defaults"}"#).unwrap();
        assert_eq!(input.status, TaskStatus::New);
        assert_eq!(input.priority, TaskPriority::Medium);
        assert!(input.description.is_none());
    }
}
