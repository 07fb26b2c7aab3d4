//! Persistence seam.
//!
//! Handlers talk to a `Store` trait object so they never depend on the concrete
//! backend. `PgStore` is the production implementation; tests plug in their own.
//! Every method is a single statement; uniqueness and referential integrity
//! are left to the backend and surface as `AppError::Conflict` /
//! `AppError::InvalidInput`.

pub mod postgres;

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::Identity;
use crate::error::AppError;
use crate::models::{Pagination, Project, Subtask, SubtaskFilter, Task, TaskFilter, User};

pub use postgres::PgStore;

/// Which rows a listing may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Every row (admins).
    All,
    /// Only rows the user owns, created, is assigned to or is a member of.
    Involving(Uuid),
}

impl Scope {
    pub fn for_identity(identity: &Identity) -> Self {
        if identity.is_admin() {
            Scope::All
        } else {
            Scope::Involving(identity.user_id)
        }
    }
}

#[async_trait]
pub trait Store: Send + Sync {
    // --- Users ---
    async fn insert_user(&self, user: &User) -> Result<User, AppError>;
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
    async fn list_users(&self, page: Pagination) -> Result<Vec<User>, AppError>;
    async fn update_user(&self, user: &User) -> Result<User, AppError>;
    async fn delete_user(&self, id: Uuid) -> Result<(), AppError>;

    // --- Projects ---
    async fn insert_project(&self, project: &Project) -> Result<Project, AppError>;
    async fn find_project(&self, id: Uuid) -> Result<Option<Project>, AppError>;
    /// Non-admin scope matches projects the user owns or is a member of.
    async fn list_projects(&self, scope: Scope, page: Pagination)
        -> Result<Vec<Project>, AppError>;
    async fn update_project(&self, project: &Project) -> Result<Project, AppError>;
    async fn delete_project(&self, id: Uuid) -> Result<(), AppError>;
    /// Idempotent: adding an existing member is a no-op.
    async fn add_project_member(&self, project_id: Uuid, user_id: Uuid) -> Result<(), AppError>;
    async fn project_members(&self, project_id: Uuid) -> Result<Vec<Uuid>, AppError>;

    // --- Tasks ---
    async fn insert_task(&self, task: &Task) -> Result<Task, AppError>;
    async fn find_task(&self, id: Uuid) -> Result<Option<Task>, AppError>;
    /// Non-admin scope matches tasks the user created or is assigned to.
    async fn list_tasks(
        &self,
        scope: Scope,
        filter: &TaskFilter,
        page: Pagination,
    ) -> Result<Vec<Task>, AppError>;
    async fn update_task(&self, task: &Task) -> Result<Task, AppError>;
    async fn delete_task(&self, id: Uuid) -> Result<(), AppError>;

    // --- Subtasks ---
    async fn insert_subtask(&self, subtask: &Subtask) -> Result<Subtask, AppError>;
    async fn find_subtask(&self, id: Uuid) -> Result<Option<Subtask>, AppError>;
    async fn list_subtasks(
        &self,
        scope: Scope,
        filter: &SubtaskFilter,
        page: Pagination,
    ) -> Result<Vec<Subtask>, AppError>;
    async fn update_subtask(&self, subtask: &Subtask) -> Result<Subtask, AppError>;
    async fn delete_subtask(&self, id: Uuid) -> Result<(), AppError>;
}

/// The shared handle registered as application data.
pub type StoreState = Arc<dyn Store>;
