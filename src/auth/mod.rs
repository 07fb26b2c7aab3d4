pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::Role;

// Re-export necessary items
pub use middleware::{AdminMiddleware, AuthMiddleware};
pub use password::PasswordHasher;
pub use token::{Claims, TokenCodec, TokenError};

/// The authenticated caller, as asserted by a verified token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub role: Role,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Represents the payload for a user login request.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Must be between 3 and 50 characters.
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    /// Must be at least 6 characters long.
    #[validate(length(min = 6))]
    pub password: String,
    /// Defaults to `team_member` when omitted.
    pub role: Option<Role>,
}

/// Response structure after a successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// The JWT for session authentication.
    pub token: String,
    /// The unique identifier of the authenticated user.
    pub user_id: Uuid,
}
