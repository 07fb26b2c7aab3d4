use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{Scope, Store};
use crate::error::AppError;
use crate::models::{Pagination, Project, Subtask, SubtaskFilter, Task, TaskFilter, User};

const USER_COLUMNS: &str = "id, username, password_hash, role, created_at";
const PROJECT_COLUMNS: &str = "id, name, description, owner_id, created_at, updated_at";
const TASK_COLUMNS: &str =
    "id, title, description, status, project_id, creator_id, assignee_id, created_at, updated_at";
const SUBTASK_COLUMNS: &str =
    "id, title, status, task_id, creator_id, assignee_id, created_at, updated_at";

/// PostgreSQL-backed store. Schema lives in `migrations/`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// `None` means "no restriction" in the scoped listing queries below.
fn scope_user(scope: Scope) -> Option<Uuid> {
    match scope {
        Scope::All => None,
        Scope::Involving(user_id) => Some(user_id),
    }
}

/// Maps "no row affected" on a delete to a 404.
fn ensure_deleted(rows: u64, what: &str) -> Result<(), AppError> {
    if rows == 0 {
        Err(AppError::NotFound(format!("{} not found", what)))
    } else {
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn insert_user(&self, user: &User) -> Result<User, AppError> {
        let sql = format!(
            "INSERT INTO users (id, username, password_hash, role, created_at) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(user.id)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(user.role)
            .bind(user.created_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn list_users(&self, page: Pagination) -> Result<Vec<User>, AppError> {
        let sql = format!(
            "SELECT {} FROM users ORDER BY created_at, id LIMIT $1 OFFSET $2",
            USER_COLUMNS
        );
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn update_user(&self, user: &User) -> Result<User, AppError> {
        let sql = format!(
            "UPDATE users SET username = $2, password_hash = $3, role = $4 \
             WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        let updated = sqlx::query_as::<_, User>(&sql)
            .bind(user.id)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(user.role)
            .fetch_optional(&self.pool)
            .await?;
        updated.ok_or_else(|| AppError::NotFound("User not found".into()))
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        ensure_deleted(result.rows_affected(), "User")
    }

    async fn insert_project(&self, project: &Project) -> Result<Project, AppError> {
        let sql = format!(
            "INSERT INTO projects (id, name, description, owner_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            PROJECT_COLUMNS
        );
        let project = sqlx::query_as::<_, Project>(&sql)
            .bind(project.id)
            .bind(&project.name)
            .bind(&project.description)
            .bind(project.owner_id)
            .bind(project.created_at)
            .bind(project.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(project)
    }

    async fn find_project(&self, id: Uuid) -> Result<Option<Project>, AppError> {
        let sql = format!("SELECT {} FROM projects WHERE id = $1", PROJECT_COLUMNS);
        let project = sqlx::query_as::<_, Project>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(project)
    }

    async fn list_projects(
        &self,
        scope: Scope,
        page: Pagination,
    ) -> Result<Vec<Project>, AppError> {
        let sql = format!(
            "SELECT {} FROM projects p \
             WHERE $1::uuid IS NULL \
                OR p.owner_id = $1 \
                OR EXISTS (SELECT 1 FROM project_members m \
                           WHERE m.project_id = p.id AND m.user_id = $1) \
             ORDER BY p.created_at, p.id LIMIT $2 OFFSET $3",
            PROJECT_COLUMNS
        );
        let projects = sqlx::query_as::<_, Project>(&sql)
            .bind(scope_user(scope))
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;
        Ok(projects)
    }

    async fn update_project(&self, project: &Project) -> Result<Project, AppError> {
        let sql = format!(
            "UPDATE projects SET name = $2, description = $3, updated_at = NOW() \
             WHERE id = $1 RETURNING {}",
            PROJECT_COLUMNS
        );
        let updated = sqlx::query_as::<_, Project>(&sql)
            .bind(project.id)
            .bind(&project.name)
            .bind(&project.description)
            .fetch_optional(&self.pool)
            .await?;
        updated.ok_or_else(|| AppError::NotFound("Project not found".into()))
    }

    async fn delete_project(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        ensure_deleted(result.rows_affected(), "Project")
    }

    async fn add_project_member(&self, project_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO project_members (project_id, user_id) VALUES ($1, $2) \
             ON CONFLICT (project_id, user_id) DO NOTHING",
        )
        .bind(project_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn project_members(&self, project_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        let members = sqlx::query_scalar::<_, Uuid>(
            "SELECT user_id FROM project_members WHERE project_id = $1 ORDER BY added_at, user_id",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(members)
    }

    async fn insert_task(&self, task: &Task) -> Result<Task, AppError> {
        let sql = format!(
            "INSERT INTO tasks (id, title, description, status, project_id, creator_id, \
                                assignee_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {}",
            TASK_COLUMNS
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(task.id)
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.status)
            .bind(task.project_id)
            .bind(task.creator_id)
            .bind(task.assignee_id)
            .bind(task.created_at)
            .bind(task.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(task)
    }

    async fn find_task(&self, id: Uuid) -> Result<Option<Task>, AppError> {
        let sql = format!("SELECT {} FROM tasks WHERE id = $1", TASK_COLUMNS);
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    async fn list_tasks(
        &self,
        scope: Scope,
        filter: &TaskFilter,
        page: Pagination,
    ) -> Result<Vec<Task>, AppError> {
        let sql = format!(
            "SELECT {} FROM tasks \
             WHERE ($1::uuid IS NULL OR creator_id = $1 OR assignee_id = $1) \
               AND ($2::work_status IS NULL OR status = $2) \
             ORDER BY created_at, id LIMIT $3 OFFSET $4",
            TASK_COLUMNS
        );
        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(scope_user(scope))
            .bind(filter.status)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;
        Ok(tasks)
    }

    async fn update_task(&self, task: &Task) -> Result<Task, AppError> {
        let sql = format!(
            "UPDATE tasks SET title = $2, description = $3, status = $4, assignee_id = $5, \
                              updated_at = NOW() \
             WHERE id = $1 RETURNING {}",
            TASK_COLUMNS
        );
        let updated = sqlx::query_as::<_, Task>(&sql)
            .bind(task.id)
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.status)
            .bind(task.assignee_id)
            .fetch_optional(&self.pool)
            .await?;
        updated.ok_or_else(|| AppError::NotFound("Task not found".into()))
    }

    async fn delete_task(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        ensure_deleted(result.rows_affected(), "Task")
    }

    async fn insert_subtask(&self, subtask: &Subtask) -> Result<Subtask, AppError> {
        let sql = format!(
            "INSERT INTO subtasks (id, title, status, task_id, creator_id, assignee_id, \
                                   created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}",
            SUBTASK_COLUMNS
        );
        let subtask = sqlx::query_as::<_, Subtask>(&sql)
            .bind(subtask.id)
            .bind(&subtask.title)
            .bind(subtask.status)
            .bind(subtask.task_id)
            .bind(subtask.creator_id)
            .bind(subtask.assignee_id)
            .bind(subtask.created_at)
            .bind(subtask.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(subtask)
    }

    async fn find_subtask(&self, id: Uuid) -> Result<Option<Subtask>, AppError> {
        let sql = format!("SELECT {} FROM subtasks WHERE id = $1", SUBTASK_COLUMNS);
        let subtask = sqlx::query_as::<_, Subtask>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(subtask)
    }

    async fn list_subtasks(
        &self,
        scope: Scope,
        filter: &SubtaskFilter,
        page: Pagination,
    ) -> Result<Vec<Subtask>, AppError> {
        let sql = format!(
            "SELECT {} FROM subtasks \
             WHERE ($1::uuid IS NULL OR creator_id = $1 OR assignee_id = $1) \
               AND ($2::work_status IS NULL OR status = $2) \
               AND ($3::uuid IS NULL OR task_id = $3) \
             ORDER BY created_at, id LIMIT $4 OFFSET $5",
            SUBTASK_COLUMNS
        );
        let subtasks = sqlx::query_as::<_, Subtask>(&sql)
            .bind(scope_user(scope))
            .bind(filter.status)
            .bind(filter.task_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;
        Ok(subtasks)
    }

    async fn update_subtask(&self, subtask: &Subtask) -> Result<Subtask, AppError> {
        let sql = format!(
            "UPDATE subtasks SET title = $2, status = $3, assignee_id = $4, updated_at = NOW() \
             WHERE id = $1 RETURNING {}",
            SUBTASK_COLUMNS
        );
        let updated = sqlx::query_as::<_, Subtask>(&sql)
            .bind(subtask.id)
            .bind(&subtask.title)
            .bind(subtask.status)
            .bind(subtask.assignee_id)
            .fetch_optional(&self.pool)
            .await?;
        updated.ok_or_else(|| AppError::NotFound("Subtask not found".into()))
    }

    async fn delete_subtask(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM subtasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        ensure_deleted(result.rows_affected(), "Subtask")
    }
}
