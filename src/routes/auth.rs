use crate::{
    auth::{AuthResponse, LoginRequest, PasswordHasher, RegisterRequest, TokenCodec},
    error::AppError,
    models::User,
    store::StoreState,
};
use actix_web::{post, web, HttpResponse, Responder};
use log::{info, warn};
use validator::Validate;

/// Register a new user
///
/// Creates the account and returns it. The caller logs in separately to get a
/// token.
///
/// ## Responses:
/// - `201 Created`: the new `User` (without its password hash).
/// - `400 Bad Request`: malformed body, validation failure or taken username.
#[post("/register")]
pub async fn register(
    store: web::Data<StoreState>,
    hasher: web::Data<PasswordHasher>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;
    let request = register_data.into_inner();

    if store.find_user_by_username(&request.username).await?.is_some() {
        return Err(AppError::Conflict("Username already exists".into()));
    }

    let password_hash = hasher.hash_password(&request.password).await?;
    let user = User::new(
        request.username,
        password_hash,
        request.role.unwrap_or_default(),
    );
    let user = store.insert_user(&user).await?;

    info!("registered user {} as {:?}", user.id, user.role);
    Ok(HttpResponse::Created().json(user))
}

/// Login user
///
/// Checks the credentials and returns a bearer token valid for 30 minutes.
/// An unknown username and a wrong password produce the same 401.
#[post("/login")]
pub async fn login(
    store: web::Data<StoreState>,
    hasher: web::Data<PasswordHasher>,
    codec: web::Data<TokenCodec>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let user = match store.find_user_by_username(&login_data.username).await? {
        Some(user) => user,
        None => {
            hasher.verify_against_dummy(&login_data.password).await?;
            warn!("failed login attempt");
            return Err(AppError::InvalidCredentials);
        }
    };

    if !hasher
        .verify_password(&login_data.password, &user.password_hash)
        .await?
    {
        warn!("failed login attempt");
        return Err(AppError::InvalidCredentials);
    }

    let token = codec.issue(user.id, user.role)?;
    info!("user {} logged in", user.id);
    Ok(HttpResponse::Ok().json(AuthResponse {
        token,
        user_id: user.id,
    }))
}
