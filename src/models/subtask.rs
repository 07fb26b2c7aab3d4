use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::TaskStatus;
use crate::policy::{Action, Guarded, Parties, Relation};

/// Payload for `POST /createsubtask`.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct SubtaskInput {
    #[validate(length(min = 3, max = 100))]
    pub title: String,
    pub task_id: Uuid,
    pub assignee_id: Option<Uuid>,
}

/// Payload for `PUT /updatesubtask/{id}`.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct SubtaskUpdate {
    #[validate(length(min = 3, max = 100))]
    pub title: String,
    pub status: TaskStatus,
    pub assignee_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Subtask {
    pub id: Uuid,
    pub title: String,
    pub status: TaskStatus,
    pub task_id: Uuid,
    pub creator_id: Uuid,
    pub assignee_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subtask {
    pub fn new(input: SubtaskInput, creator_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            status: TaskStatus::Pending,
            task_id: input.task_id,
            creator_id,
            assignee_id: input.assignee_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, update: SubtaskUpdate) {
        self.title = update.title;
        self.status = update.status;
        self.assignee_id = update.assignee_id;
    }
}

impl Guarded for Subtask {
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

/// Filters accepted by `GET /getsubtask`.
#[derive(Debug, Default, Clone)]
pub struct SubtaskFilter {
    pub status: Option<TaskStatus>,
    pub task_id: Option<Uuid>,
}
