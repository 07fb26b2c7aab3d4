#![allow(dead_code)]

use actix_web::{
    body::MessageBody,
    dev::{Service, ServiceResponse},
    http::{header, StatusCode},
    test, web, App,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use taskboard::auth::{PasswordHasher, TokenCodec};
use taskboard::error::{AppError, ErrorBody};
use taskboard::models::{
    Pagination, Project, Role, Subtask, SubtaskFilter, Task, TaskFilter, User,
};
use taskboard::routes;
use taskboard::store::{Scope, Store, StoreState};

pub const TEST_SECRET: &str = "integration-test-secret";
pub const TEST_PASSWORD: &str = "password123";

// --- IN-MEMORY STORE ---

// Mirrors the constraints the PostgreSQL schema enforces: unique usernames,
// foreign keys and the delete cascades.
#[derive(Default)]
struct Tables {
    users: Vec<User>,
    projects: Vec<Project>,
    members: Vec<(Uuid, Uuid)>,
    tasks: Vec<Task>,
    subtasks: Vec<Subtask>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

fn conflict() -> AppError {
    AppError::Conflict("Resource already exists".into())
}

fn missing_reference() -> AppError {
    AppError::InvalidInput("Referenced resource does not exist".into())
}

fn page<T>(
    mut rows: Vec<T>,
    key: impl Fn(&T) -> (DateTime<Utc>, Uuid),
    p: Pagination,
) -> Vec<T> {
    rows.sort_by_key(|row| key(row));
    rows.into_iter()
        .skip(p.offset() as usize)
        .take(p.limit() as usize)
        .collect()
}

impl Tables {
    fn has_user(&self, id: Uuid) -> bool {
        self.users.iter().any(|u| u.id == id)
    }

    fn check_assignee(&self, assignee: Option<Uuid>) -> Result<(), AppError> {
        match assignee {
            Some(id) if !self.has_user(id) => Err(missing_reference()),
            _ => Ok(()),
        }
    }

    fn remove_tasks(&mut self, doomed: impl Fn(&Task) -> bool) {
        let removed: Vec<Uuid> = self
            .tasks
            .iter()
            .filter(|t| doomed(t))
            .map(|t| t.id)
            .collect();
        self.tasks.retain(|t| !removed.contains(&t.id));
        self.subtasks.retain(|s| !removed.contains(&s.task_id));
    }

    fn remove_projects(&mut self, doomed: impl Fn(&Project) -> bool) {
        let removed: Vec<Uuid> = self
            .projects
            .iter()
            .filter(|p| doomed(p))
            .map(|p| p.id)
            .collect();
        self.projects.retain(|p| !removed.contains(&p.id));
        self.members.retain(|(project_id, _)| !removed.contains(project_id));
        self.remove_tasks(|t| removed.contains(&t.project_id));
    }
}

fn involves(scope: Scope, creator: Uuid, assignee: Option<Uuid>) -> bool {
    match scope {
        Scope::All => true,
        Scope::Involving(user_id) => creator == user_id || assignee == Some(user_id),
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_user(&self, user: &User) -> Result<User, AppError> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.username == user.username) {
            return Err(conflict());
        }
        tables.users.push(user.clone());
        Ok(user.clone())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn list_users(&self, p: Pagination) -> Result<Vec<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(page(tables.users.clone(), |u| (u.created_at, u.id), p))
    }

    async fn update_user(&self, user: &User) -> Result<User, AppError> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .iter()
            .any(|u| u.username == user.username && u.id != user.id)
        {
            return Err(conflict());
        }
        let stored = tables
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        stored.username = user.username.clone();
        stored.password_hash = user.password_hash.clone();
        stored.role = user.role;
        Ok(stored.clone())
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        if !tables.has_user(id) {
            return Err(AppError::NotFound("User not found".into()));
        }
        tables.users.retain(|u| u.id != id);
        tables.remove_projects(|p| p.owner_id == id);
        tables.members.retain(|(_, user_id)| *user_id != id);
        tables.remove_tasks(|t| t.creator_id == id);
        tables.subtasks.retain(|s| s.creator_id != id);
        for task in tables.tasks.iter_mut().filter(|t| t.assignee_id == Some(id)) {
            task.assignee_id = None;
        }
        for subtask in tables
            .subtasks
            .iter_mut()
            .filter(|s| s.assignee_id == Some(id))
        {
            subtask.assignee_id = None;
        }
        Ok(())
    }

    async fn insert_project(&self, project: &Project) -> Result<Project, AppError> {
        let mut tables = self.tables.write().await;
        if !tables.has_user(project.owner_id) {
            return Err(missing_reference());
        }
        tables.projects.push(project.clone());
        Ok(project.clone())
    }

    async fn find_project(&self, id: Uuid) -> Result<Option<Project>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.projects.iter().find(|p| p.id == id).cloned())
    }

    async fn list_projects(&self, scope: Scope, p: Pagination) -> Result<Vec<Project>, AppError> {
        let tables = self.tables.read().await;
        let rows = tables
            .projects
            .iter()
            .filter(|project| match scope {
                Scope::All => true,
                Scope::Involving(user_id) => {
                    project.owner_id == user_id
                        || tables.members.contains(&(project.id, user_id))
                }
            })
            .cloned()
            .collect();
        Ok(page(rows, |project| (project.created_at, project.id), p))
    }

    async fn update_project(&self, project: &Project) -> Result<Project, AppError> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .projects
            .iter_mut()
            .find(|p| p.id == project.id)
            .ok_or_else(|| AppError::NotFound("Project not found".into()))?;
        stored.name = project.name.clone();
        stored.description = project.description.clone();
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete_project(&self, id: Uuid) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        if !tables.projects.iter().any(|p| p.id == id) {
            return Err(AppError::NotFound("Project not found".into()));
        }
        tables.remove_projects(|p| p.id == id);
        Ok(())
    }

    async fn add_project_member(&self, project_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        if !tables.has_user(user_id) || !tables.projects.iter().any(|p| p.id == project_id) {
            return Err(missing_reference());
        }
        if !tables.members.contains(&(project_id, user_id)) {
            tables.members.push((project_id, user_id));
        }
        Ok(())
    }

    async fn project_members(&self, project_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .members
            .iter()
            .filter(|(p, _)| *p == project_id)
            .map(|(_, u)| *u)
            .collect())
    }

    async fn insert_task(&self, task: &Task) -> Result<Task, AppError> {
        let mut tables = self.tables.write().await;
        if !tables.projects.iter().any(|p| p.id == task.project_id)
            || !tables.has_user(task.creator_id)
        {
            return Err(missing_reference());
        }
        tables.check_assignee(task.assignee_id)?;
        tables.tasks.push(task.clone());
        Ok(task.clone())
    }

    async fn find_task(&self, id: Uuid) -> Result<Option<Task>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn list_tasks(
        &self,
        scope: Scope,
        filter: &TaskFilter,
        p: Pagination,
    ) -> Result<Vec<Task>, AppError> {
        let tables = self.tables.read().await;
        let rows = tables
            .tasks
            .iter()
            .filter(|t| involves(scope, t.creator_id, t.assignee_id))
            .filter(|t| filter.status.map_or(true, |status| t.status == status))
            .cloned()
            .collect();
        Ok(page(rows, |t| (t.created_at, t.id), p))
    }

    async fn update_task(&self, task: &Task) -> Result<Task, AppError> {
        let mut tables = self.tables.write().await;
        tables.check_assignee(task.assignee_id)?;
        let stored = tables
            .tasks
            .iter_mut()
            .find(|t| t.id == task.id)
            .ok_or_else(|| AppError::NotFound("Task not found".into()))?;
        stored.title = task.title.clone();
        stored.description = task.description.clone();
        stored.status = task.status;
        stored.assignee_id = task.assignee_id;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete_task(&self, id: Uuid) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        if !tables.tasks.iter().any(|t| t.id == id) {
            return Err(AppError::NotFound("Task not found".into()));
        }
        tables.remove_tasks(|t| t.id == id);
        Ok(())
    }

    async fn insert_subtask(&self, subtask: &Subtask) -> Result<Subtask, AppError> {
        let mut tables = self.tables.write().await;
        if !tables.tasks.iter().any(|t| t.id == subtask.task_id)
            || !tables.has_user(subtask.creator_id)
        {
            return Err(missing_reference());
        }
        tables.check_assignee(subtask.assignee_id)?;
        tables.subtasks.push(subtask.clone());
        Ok(subtask.clone())
    }

    async fn find_subtask(&self, id: Uuid) -> Result<Option<Subtask>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.subtasks.iter().find(|s| s.id == id).cloned())
    }

    async fn list_subtasks(
        &self,
        scope: Scope,
        filter: &SubtaskFilter,
        p: Pagination,
    ) -> Result<Vec<Subtask>, AppError> {
        let tables = self.tables.read().await;
        let rows = tables
            .subtasks
            .iter()
            .filter(|s| involves(scope, s.creator_id, s.assignee_id))
            .filter(|s| filter.status.map_or(true, |status| s.status == status))
            .filter(|s| filter.task_id.map_or(true, |task_id| s.task_id == task_id))
            .cloned()
            .collect();
        Ok(page(rows, |s| (s.created_at, s.id), p))
    }

    async fn update_subtask(&self, subtask: &Subtask) -> Result<Subtask, AppError> {
        let mut tables = self.tables.write().await;
        tables.check_assignee(subtask.assignee_id)?;
        let stored = tables
            .subtasks
            .iter_mut()
            .find(|s| s.id == subtask.id)
            .ok_or_else(|| AppError::NotFound("Subtask not found".into()))?;
        stored.title = subtask.title.clone();
        stored.status = subtask.status;
        stored.assignee_id = subtask.assignee_id;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete_subtask(&self, id: Uuid) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        if !tables.subtasks.iter().any(|s| s.id == id) {
            return Err(AppError::NotFound("Subtask not found".into()));
        }
        tables.subtasks.retain(|s| s.id != id);
        Ok(())
    }
}

// --- TEST APPLICATION ---

/// A user already present in the store, with a fresh token.
pub struct TestUser {
    pub id: Uuid,
    pub token: String,
}

pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub codec: TokenCodec,
    pub hasher: PasswordHasher,
}

impl TestContext {
    pub fn new() -> Self {
        Self {
            store: Arc::new(MemoryStore::default()),
            codec: TokenCodec::new(TEST_SECRET),
            hasher: PasswordHasher::new(4).unwrap(),
        }
    }

    /// Inserts a user directly, bypassing `/register`.
    pub async fn seed_user(&self, username: &str, role: Role) -> TestUser {
        let hash = self.hasher.hash_password(TEST_PASSWORD).await.unwrap();
        let user = self
            .store
            .insert_user(&User::new(username.to_string(), hash, role))
            .await
            .unwrap();
        TestUser {
            id: user.id,
            token: self.codec.issue(user.id, role).unwrap(),
        }
    }

    pub async fn app(
        &self,
    ) -> impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    > {
        let store: StoreState = self.store.clone();
        test::init_service(
            App::new()
                .app_data(web::Data::new(store))
                .app_data(web::Data::new(self.codec.clone()))
                .app_data(web::Data::new(self.hasher.clone()))
                .configure(routes::config),
        )
        .await
    }
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

/// Reads an error response and checks its `status` field matches the HTTP status.
pub async fn read_error<B: MessageBody>(resp: ServiceResponse<B>) -> ErrorBody {
    let status = resp.status().as_u16();
    let body: ErrorBody = test::read_body_json(resp).await;
    assert_eq!(body.status, status);
    body
}

// --- REQUEST HELPERS ---

pub async fn create_project<S, B>(app: &S, owner: &TestUser, name: &str) -> Project
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/createproject")
        .insert_header(bearer(&owner.token))
        .set_json(json!({ "name": name }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    test::read_body_json(resp).await
}

pub async fn create_task<S, B>(
    app: &S,
    creator: &TestUser,
    project: &Project,
    title: &str,
    assignee: Option<Uuid>,
) -> Task
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/createtask")
        .insert_header(bearer(&creator.token))
        .set_json(json!({
            "title": title,
            "project_id": project.id,
            "assignee_id": assignee
        }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    test::read_body_json(resp).await
}
