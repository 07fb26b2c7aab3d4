use crate::{
    auth::{Identity, PasswordHasher},
    error::AppError,
    models::{ListQuery, UserUpdate},
    policy::{authorize, Action},
    routes::parse_json,
    store::StoreState,
};
use actix_web::{delete, get, put, web, HttpResponse, Responder};
use log::{info, warn};
use uuid::Uuid;
use validator::Validate;

/// Lists every account, paginated. Mounted under `/admin`.
#[get("/users")]
pub async fn list_users(
    store: web::Data<StoreState>,
    query: web::Query<ListQuery>,
) -> Result<impl Responder, AppError> {
    let users = store.list_users(query.pagination()).await?;
    Ok(HttpResponse::Ok().json(users))
}

/// Deletes an account. Mounted under `/admin`.
///
/// Projects, tasks and memberships the user owns go with it; assignments
/// elsewhere are cleared.
#[delete("/deleteusers/{id}")]
pub async fn delete_user(
    store: web::Data<StoreState>,
    identity: Identity,
    user_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let user_id = user_id.into_inner();
    store.delete_user(user_id).await?;
    info!("admin {} deleted user {}", identity.user_id, user_id);
    Ok(HttpResponse::NoContent().finish())
}

/// Updates an account's username, password and role.
///
/// Users may edit themselves; admins may edit anyone. Only admins can change a
/// role. An absent or empty `password` keeps the current one.
///
/// ## Responses:
/// - `200 OK`: the updated `User`.
/// - `400 Bad Request`: malformed body, validation failure or taken username.
/// - `403 Forbidden`: editing someone else, or a non-admin changing a role.
/// - `404 Not Found`: no user with that id.
#[put("/updateuser/{id}")]
pub async fn update_user(
    store: web::Data<StoreState>,
    hasher: web::Data<PasswordHasher>,
    identity: Identity,
    user_id: web::Path<Uuid>,
    body: web::Bytes,
) -> Result<impl Responder, AppError> {
    let mut user = store
        .find_user(user_id.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    authorize(&identity, &user, Action::Update)?;

    let update: UserUpdate = parse_json(&body)?;
    update.validate()?;

    if let Some(role) = update.role {
        if role != user.role && !identity.is_admin() {
            warn!("user {} tried to change role to {:?}", identity.user_id, role);
            return Err(AppError::Forbidden("Only admins can change roles".into()));
        }
        user.role = role;
    }

    if update.username != user.username {
        if let Some(existing) = store.find_user_by_username(&update.username).await? {
            if existing.id != user.id {
                return Err(AppError::Conflict("Username already exists".into()));
            }
        }
    }

    if let Some(password) = update.new_password() {
        user.password_hash = hasher.hash_password(password).await?;
    }
    user.username = update.username;

    let user = store.update_user(&user).await?;
    info!("user {} updated account {}", identity.user_id, user.id);
    Ok(HttpResponse::Ok().json(user))
}
