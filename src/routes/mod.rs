pub mod auth;
pub mod health;
pub mod projects;
pub mod subtasks;
pub mod tasks;
pub mod users;

use actix_web::{web, HttpResponse};
use serde::de::DeserializeOwned;

use crate::auth::{AdminMiddleware, AuthMiddleware};
use crate::error::AppError;

/// Registers every route plus the extractor error handlers.
///
/// Public routes come first; the admin subtree is matched before the catch-all
/// protected scope so its extra role gate applies. Paths or methods nothing
/// matches fall through to a JSON 404, after authentication.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::InvalidInput(err.to_string()).into()
    }))
    .app_data(
        web::PathConfig::default()
            .error_handler(|_err, _req| AppError::NotFound("Resource not found".into()).into()),
    )
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        AppError::InvalidInput(err.to_string()).into()
    }))
    .service(health::health)
    .service(auth::register)
    .service(auth::login)
    .service(
        web::scope("/admin")
            .wrap(AdminMiddleware)
            .wrap(AuthMiddleware)
            .service(users::list_users)
            .service(users::delete_user)
            .default_service(web::to(not_found)),
    )
    .service(
        web::scope("")
            .wrap(AuthMiddleware)
            .service(projects::create_project)
            .service(projects::get_projects)
            .service(projects::update_project)
            .service(projects::delete_project)
            .service(projects::add_member)
            .service(tasks::create_task)
            .service(tasks::get_tasks)
            .service(tasks::update_task)
            .service(tasks::delete_task)
            .service(subtasks::create_subtask)
            .service(subtasks::get_subtasks)
            .service(subtasks::update_subtask)
            .service(subtasks::delete_subtask)
            .service(users::update_user)
            .default_service(web::to(not_found)),
    );
}

async fn not_found() -> Result<HttpResponse, AppError> {
    Err(AppError::NotFound("Resource not found".into()))
}

/// Decodes a raw JSON body.
///
/// Update handlers take the body as bytes so the resource lookup and the
/// ownership check run before the payload is looked at.
pub(crate) fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|e| AppError::InvalidInput(e.to_string()))
}
