use crate::{
    auth::Identity,
    error::AppError,
    models::{ListQuery, Subtask, SubtaskInput, SubtaskUpdate},
    policy::{authorize, Action},
    routes::parse_json,
    store::{Scope, StoreState},
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use log::info;
use uuid::Uuid;
use validator::Validate;

async fn load_subtask(store: &StoreState, id: Uuid) -> Result<Subtask, AppError> {
    store
        .find_subtask(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Subtask not found".into()))
}

/// Creates a subtask under an existing task. Status starts as `pending`.
#[post("/createsubtask")]
pub async fn create_subtask(
    store: web::Data<StoreState>,
    identity: Identity,
    subtask_data: web::Json<SubtaskInput>,
) -> Result<impl Responder, AppError> {
    subtask_data.validate()?;

    let subtask = Subtask::new(subtask_data.into_inner(), identity.user_id);
    let subtask = store.insert_subtask(&subtask).await?;

    info!(
        "user {} created subtask {} under task {}",
        identity.user_id, subtask.id, subtask.task_id
    );
    Ok(HttpResponse::Created().json(subtask))
}

/// Lists subtasks, filterable by `status` and `task_id`.
#[get("/getsubtask")]
pub async fn get_subtasks(
    store: web::Data<StoreState>,
    identity: Identity,
    query: web::Query<ListQuery>,
) -> Result<impl Responder, AppError> {
    let filter = query.subtask_filter()?;
    let subtasks = store
        .list_subtasks(Scope::for_identity(&identity), &filter, query.pagination())
        .await?;
    Ok(HttpResponse::Ok().json(subtasks))
}

/// Replaces title, status and assignee. Leaving out `assignee_id` unassigns.
#[put("/updatesubtask/{id}")]
pub async fn update_subtask(
    store: web::Data<StoreState>,
    identity: Identity,
    subtask_id: web::Path<Uuid>,
    body: web::Bytes,
) -> Result<impl Responder, AppError> {
    let mut subtask = load_subtask(&store, subtask_id.into_inner()).await?;
    authorize(&identity, &subtask, Action::Update)?;

    let update: SubtaskUpdate = parse_json(&body)?;
    update.validate()?;
    subtask.apply(update);

    let subtask = store.update_subtask(&subtask).await?;
    info!("user {} updated subtask {}", identity.user_id, subtask.id);
    Ok(HttpResponse::Ok().json(subtask))
}

#[delete("/deletesubtask/{id}")]
pub async fn delete_subtask(
    store: web::Data<StoreState>,
    identity: Identity,
    subtask_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let subtask = load_subtask(&store, subtask_id.into_inner()).await?;
    authorize(&identity, &subtask, Action::Delete)?;

    store.delete_subtask(subtask.id).await?;
    info!("user {} deleted subtask {}", identity.user_id, subtask.id);
    Ok(HttpResponse::NoContent().finish())
}
