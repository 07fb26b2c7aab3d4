use crate::{
    auth::Identity,
    error::AppError,
    models::{ListQuery, Task, TaskInput, TaskUpdate},
    policy::{authorize, Action},
    routes::parse_json,
    store::{Scope, StoreState},
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use log::info;
use uuid::Uuid;
use validator::Validate;

async fn load_task(store: &StoreState, id: Uuid) -> Result<Task, AppError> {
    store
        .find_task(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))
}

/// Creates a new task.
///
/// The caller becomes the creator and the status always starts as `pending`,
/// whatever the body says.
///
/// ## Request Body:
/// - `title`: 3 to 100 characters.
/// - `description` (optional): at most 500 characters.
/// - `project_id`: the owning project.
/// - `assignee_id` (optional): the user doing the work.
///
/// ## Responses:
/// - `201 Created`: the new `Task`.
/// - `400 Bad Request`: malformed body, validation failure, or a
///   `project_id`/`assignee_id` that does not exist.
#[post("/createtask")]
pub async fn create_task(
    store: web::Data<StoreState>,
    identity: Identity,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = Task::new(task_data.into_inner(), identity.user_id);
    let task = store.insert_task(&task).await?;

    info!("user {} created task {}", identity.user_id, task.id);
    Ok(HttpResponse::Created().json(task))
}

/// Lists tasks, paginated and optionally filtered by `status`.
///
/// Admins see every task; other users only the ones they created or are
/// assigned to. Out-of-range `page`/`per_page` values fall back to 1 and 10.
#[get("/gettask")]
pub async fn get_tasks(
    store: web::Data<StoreState>,
    identity: Identity,
    query: web::Query<ListQuery>,
) -> Result<impl Responder, AppError> {
    let filter = query.task_filter()?;
    let tasks = store
        .list_tasks(Scope::for_identity(&identity), &filter, query.pagination())
        .await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Updates a task's title, description, status and assignee.
///
/// The body replaces all four fields. A missing `assignee_id` clears the
/// assignee, so an assignee who leaves it out loses update access.
///
/// ## Responses:
/// - `200 OK`: the updated `Task`.
/// - `403 Forbidden`: caller is neither creator, assignee nor admin.
/// - `404 Not Found`: no task with that id.
#[put("/updatetask/{id}")]
pub async fn update_task(
    store: web::Data<StoreState>,
    identity: Identity,
    task_id: web::Path<Uuid>,
    body: web::Bytes,
) -> Result<impl Responder, AppError> {
    let mut task = load_task(&store, task_id.into_inner()).await?;
    authorize(&identity, &task, Action::Update)?;

    let update: TaskUpdate = parse_json(&body)?;
    update.validate()?;
    task.apply(update);

    let task = store.update_task(&task).await?;
    info!("user {} updated task {}", identity.user_id, task.id);
    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task and its subtasks. Creator or admin only.
#[delete("/deletetask/{id}")]
pub async fn delete_task(
    store: web::Data<StoreState>,
    identity: Identity,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let task = load_task(&store, task_id.into_inner()).await?;
    authorize(&identity, &task, Action::Delete)?;

    store.delete_task(task.id).await?;
    info!("user {} deleted task {}", identity.user_id, task.id);
    Ok(HttpResponse::NoContent().finish())
}
