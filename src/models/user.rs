use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::policy::{Action, Guarded, Parties, Relation};

/// Access level of a user account.
/// Corresponds to the `user_role` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Manager,
    TeamMember,
}

impl Default for Role {
    fn default() -> Self {
        Role::TeamMember
    }
}

/// A user account as stored in the database.
///
/// The password hash is never serialized into responses.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Creates a new account from an already hashed password.
    pub fn new(username: String, password_hash: String, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            password_hash,
            role,
            created_at: Utc::now(),
        }
    }
}

/// A user "owns" their own account.
impl Guarded for User {
    fn parties(&self) -> Parties {
        Parties {
            owner: Some(self.id),
            ..Parties::default()
        }
    }

    fn grants(&self, action: Action) -> &'static [Relation] {
        match action {
            Action::Update => &[Relation::Owner],
            Action::Delete | Action::ManageMembers => &[],
        }
    }
}

/// Payload for `PUT /updateuser/{id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct UserUpdate {
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    /// An absent or empty password keeps the stored hash.
    #[serde(default)]
    #[validate(custom = "validate_new_password")]
    pub password: Option<String>,
    pub role: Option<Role>,
}

impl UserUpdate {
    /// The replacement password, if one was actually supplied.
    pub fn new_password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }
}

const MIN_PASSWORD_LEN: usize = 6;

fn validate_new_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() || password.chars().count() >= MIN_PASSWORD_LEN {
        Ok(())
    } else {
        Err(ValidationError::new("password_too_short"))
    }
}
