#![doc = "The `tasknest` library crate."]
#![doc = ""]
#![doc = "Authenticated task and profile API. Every request under `/api` carries a"]
#![doc = "bearer token; the verified subject scopes all data access, and every failure"]
#![doc = "leaves the service as a JSON `{message, code?}` body. The binary (`main.rs`)"]
#![doc = "wires these pieces into an `HttpServer`."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod security;
pub mod services;
pub mod store;
pub mod translate;

pub use crate::config::{AuthConfig, Config, Stage};
pub use crate::error::AppError;
