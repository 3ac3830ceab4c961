//! HTTP application wiring.
//!
//! - `services.rs`: role table, identity source and membership resolver
//! - `routes/`: handlers, one file per area
//! - `dto.rs`: response bodies
//! - `errors.rs`: the denial to response mapping

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs` and tests).
pub fn build_app(services: Arc<AppServices>) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/v1", routes::router(services.clone()))
        .layer(ServiceBuilder::new().layer(Extension(services)))
}
