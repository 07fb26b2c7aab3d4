use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use log::{error, info};
use sqlx::postgres::PgPoolOptions;

use taskboard::auth::{PasswordHasher, TokenCodec};
use taskboard::config::Config;
use taskboard::routes;
use taskboard::store::{PgStore, StoreState};

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    error!("{}: {}", context, err);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(|e| startup_error("invalid configuration", e))?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .map_err(|e| startup_error("failed to connect to database", e))?;

    sqlx::migrate!()
        .run(&pool)
        .await
        .map_err(|e| startup_error("failed to run migrations", e))?;

    let store: StoreState = Arc::new(PgStore::new(pool));
    let codec = TokenCodec::new(&config.jwt_secret);
    let hasher = PasswordHasher::new(config.bcrypt_cost)
        .map_err(|e| startup_error("invalid bcrypt cost", e))?;

    let store = web::Data::new(store);
    let codec = web::Data::new(codec);
    let hasher = web::Data::new(hasher);

    info!("Starting TaskBoard server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(store.clone())
            .app_data(codec.clone())
            .app_data(hasher.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
