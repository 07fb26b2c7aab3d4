use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::policy::{Action, Guarded, Parties, Relation};

/// Payload for creating or updating a project.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ProjectInput {
    /// Must be between 3 and 10 characters.
    #[validate(length(min = 3, max = 10))]
    pub name: String,
    /// At most 500 characters.
    #[serde(default)]
    #[validate(length(max = 500))]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// Set from the creator's identity. The owner is implicitly a member.
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(input: ProjectInput, owner_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            owner_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Only the name and description of a project can be edited.
    pub fn apply(&mut self, update: ProjectInput) {
        self.name = update.name;
        self.description = update.description;
    }
}

impl Guarded for Project {
    fn parties(&self) -> Parties {
        Parties {
            owner: Some(self.owner_id),
            ..Parties::default()
        }
    }

    fn grants(&self, _action: Action) -> &'static [Relation] {
        &[Relation::Owner]
    }
}

/// A project together with its explicit membership, returned by
/// `POST /projects/{id}/members`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectWithMembers {
    #[serde(flatten)]
    pub project: Project,
    pub members: Vec<Uuid>,
}

/// Payload for `POST /projects/{id}/members`.
#[derive(Debug, Deserialize)]
pub struct MemberInput {
    pub user_id: Uuid,
}
