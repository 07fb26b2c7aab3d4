use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use crate::policy::{Action, Guarded, Parties, Relation};

/// Progress of a task or subtask.
/// Corresponds to the `work_status` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "work_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started yet. Every new task and subtask starts here.
    Pending,
    /// Currently being worked on.
    InProgress,
    /// Finished.
    Completed,
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Pending
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            other => Err(format!("unknown status `{}`", other)),
        }
    }
}

/// Payload for `POST /createtask`.
///
/// There is no `status` or `creator_id` here: both are forced by the server.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    /// Must be between 3 and 100 characters.
    #[validate(length(min = 3, max = 100))]
    pub title: String,

    /// At most 500 characters.
    #[serde(default)]
    #[validate(length(max = 500))]
    pub description: String,

    /// Project the task belongs to.
    pub project_id: Uuid,

    /// Optional user the task is assigned to.
    pub assignee_id: Option<Uuid>,
}

/// Payload for `PUT /updatetask/{id}`. Only these fields can change.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskUpdate {
    #[validate(length(min = 3, max = 100))]
    pub title: String,

    #[serde(default)]
    #[validate(length(max = 500))]
    pub description: String,

    pub status: TaskStatus,

    pub assignee_id: Option<Uuid>,
}

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub project_id: Uuid,
    /// The user who created the task. Taken from the token, never from the body.
    pub creator_id: Uuid,
    pub assignee_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new `Task` from `TaskInput` and the creator's id.
    /// The status always starts as `pending`.
    pub fn new(input: TaskInput, creator_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            status: TaskStatus::Pending,
            project_id: input.project_id,
            creator_id,
            assignee_id: input.assignee_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Copies the whitelisted fields of an update onto this task.
    pub fn apply(&mut self, update: TaskUpdate) {
        self.title = update.title;
        self.description = update.description;
        self.status = update.status;
        self.assignee_id = update.assignee_id;
    }
}

impl Guarded for Task {
    fn parties(&self) -> Parties {
        Parties {
            creator: Some(self.creator_id),
            assignee: self.assignee_id,
            ..Parties::default()
        }
    }

    fn grants(&self, action: Action) -> &'static [Relation] {
        match action {
            Action::Update => &[Relation::Creator, Relation::Assignee],
            Action::Delete => &[Relation::Creator],
            Action::ManageMembers => &[],
        }
    }
}

/// Filters accepted by `GET /gettask`.
#[derive(Debug, Default, Clone)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
}
