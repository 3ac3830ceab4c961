use std::sync::Arc;

use axum::{middleware::from_fn_with_state, routing::get, Router};

use baro_auth::guard::authenticate_user;
use baro_auth::{Action, Pipeline};

use crate::app::services::AppServices;
use crate::middleware::{enforce, RouteGuard};

pub mod projects;
pub mod rbac;
pub mod system;
pub mod tenants;

/// Router for all `/v1` endpoints. Each route declares its own guard pipeline.
pub fn router(services: Arc<AppServices>) -> Router {
    let view_project = RouteGuard::new(services.clone(), Action::ViewProject.pipeline());
    let authenticated = RouteGuard::new(
        services,
        Pipeline::all([authenticate_user()]).named("authenticated"),
    );

    Router::new()
        .route(
            "/projects/:project_id/access",
            get(projects::access).route_layer(from_fn_with_state(view_project, enforce)),
        )
        .route("/projects/:project_id/actions/:action", get(projects::decide))
        .route("/tenants/:tenant_id/actions/:action", get(tenants::decide))
        .route(
            "/rbac/roles",
            get(rbac::list_roles).route_layer(from_fn_with_state(authenticated, enforce)),
        )
}
