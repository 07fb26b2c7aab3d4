#![doc = "The `taskboard` library crate."]
#![doc = ""]
#![doc = "Domain models, authentication, the ownership policy, persistence and the"]
#![doc = "HTTP routes of the TaskBoard API. The binary (`main.rs`) wires them to a"]
#![doc = "PostgreSQL pool and an `HttpServer`."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod policy;
pub mod routes;
pub mod store;

pub use crate::config::Config;
pub use crate::error::AppError;
