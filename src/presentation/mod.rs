//! HTTP presentation layer: routes, controllers, DTOs, error mapping

pub mod controllers;
pub mod error;
pub mod models;
pub mod routes;

pub use controllers::AppState;
pub use error::ApiError;
pub use routes::{ApiDoc, create_router};
