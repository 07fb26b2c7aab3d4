use crate::{
    auth::Identity,
    error::AppError,
    models::{ListQuery, MemberInput, Project, ProjectInput, ProjectWithMembers},
    policy::{authorize, Action},
    routes::parse_json,
    store::{Scope, StoreState},
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use log::info;
use uuid::Uuid;
use validator::Validate;

async fn load_project(store: &StoreState, id: Uuid) -> Result<Project, AppError> {
    store
        .find_project(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".into()))
}

/// Creates a project owned by the caller.
///
/// ## Responses:
/// - `201 Created`: the new `Project`.
/// - `400 Bad Request`: malformed body or validation failure (name is 3 to 10
///   characters, description at most 500).
#[post("/createproject")]
pub async fn create_project(
    store: web::Data<StoreState>,
    identity: Identity,
    project_data: web::Json<ProjectInput>,
) -> Result<impl Responder, AppError> {
    project_data.validate()?;

    let project = Project::new(project_data.into_inner(), identity.user_id);
    let project = store.insert_project(&project).await?;

    info!("user {} created project {}", identity.user_id, project.id);
    Ok(HttpResponse::Created().json(project))
}

/// Lists projects, paginated.
///
/// Admins see every project; other users see the ones they own or belong to.
#[get("/getproject")]
pub async fn get_projects(
    store: web::Data<StoreState>,
    identity: Identity,
    query: web::Query<ListQuery>,
) -> Result<impl Responder, AppError> {
    let projects = store
        .list_projects(Scope::for_identity(&identity), query.pagination())
        .await?;
    Ok(HttpResponse::Ok().json(projects))
}

/// Renames or re-describes a project. Owner or admin only.
#[put("/updateproject/{id}")]
pub async fn update_project(
    store: web::Data<StoreState>,
    identity: Identity,
    project_id: web::Path<Uuid>,
    body: web::Bytes,
) -> Result<impl Responder, AppError> {
    let mut project = load_project(&store, project_id.into_inner()).await?;
    authorize(&identity, &project, Action::Update)?;

    let update: ProjectInput = parse_json(&body)?;
    update.validate()?;
    project.apply(update);

    let project = store.update_project(&project).await?;
    info!("user {} updated project {}", identity.user_id, project.id);
    Ok(HttpResponse::Ok().json(project))
}

/// Deletes a project along with its tasks and memberships. Owner or admin only.
#[delete("/deleteproject/{id}")]
pub async fn delete_project(
    store: web::Data<StoreState>,
    identity: Identity,
    project_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let project = load_project(&store, project_id.into_inner()).await?;
    authorize(&identity, &project, Action::Delete)?;

    store.delete_project(project.id).await?;
    info!("user {} deleted project {}", identity.user_id, project.id);
    Ok(HttpResponse::NoContent().finish())
}

/// Adds a user to a project's member list. Adding an existing member is a no-op.
///
/// ## Request Body:
/// `{"user_id": "<uuid>"}`
///
/// ## Responses:
/// - `200 OK`: the project with its `members` (user ids).
/// - `400 Bad Request`: missing or malformed `user_id`.
/// - `403 Forbidden`: caller is neither the owner nor an admin.
/// - `404 Not Found`: unknown project or user.
#[post("/projects/{id}/members")]
pub async fn add_member(
    store: web::Data<StoreState>,
    identity: Identity,
    project_id: web::Path<Uuid>,
    body: web::Bytes,
) -> Result<impl Responder, AppError> {
    let project = load_project(&store, project_id.into_inner()).await?;
    authorize(&identity, &project, Action::ManageMembers)?;

    let input: MemberInput = parse_json(&body)?;
    if store.find_user(input.user_id).await?.is_none() {
        return Err(AppError::NotFound("User not found".into()));
    }

    store.add_project_member(project.id, input.user_id).await?;
    let members = store.project_members(project.id).await?;

    info!(
        "user {} added {} to project {}",
        identity.user_id, input.user_id, project.id
    );
    Ok(HttpResponse::Ok().json(ProjectWithMembers { project, members }))
}
