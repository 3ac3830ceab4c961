use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use baro_auth::guard::ScopeKind;
use baro_auth::{Action, AuthContext};

use crate::app::dto::AccessView;
use crate::app::errors;
use crate::app::services::AppServices;
use crate::{authz, middleware};

/// GET /v1/projects/:project_id/access - caller's role and effective permissions.
pub async fn access(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
) -> Response {
    match AccessView::from_context(&ctx, &services.table) {
        Some(view) => (StatusCode::OK, Json(view)).into_response(),
        None => errors::json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "config_error",
            "route guard did not resolve a membership",
        ),
    }
}

/// GET /v1/projects/:project_id/actions/:action - decision only.
pub async fn decide(
    Extension(services): Extension<Arc<AppServices>>,
    Path(params): Path<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    decide_scoped(&services, ScopeKind::Project, &params, &headers).await
}

/// Shared by the project and tenant decision endpoints. An action that is
/// checked against the other scope kind is reported as unknown here.
pub(crate) async fn decide_scoped(
    services: &AppServices,
    scope: ScopeKind,
    params: &HashMap<String, String>,
    headers: &HeaderMap,
) -> Response {
    let raw = params.get("action").map(String::as_str).unwrap_or_default();
    let action = match raw.parse::<Action>() {
        Ok(action) if action.scope() == scope => action,
        Ok(action) => {
            return errors::json_error(
                StatusCode::NOT_FOUND,
                "unknown_action",
                format!("action '{action}' is not available for this scope"),
            );
        }
        Err(e) => return errors::json_error(StatusCode::NOT_FOUND, "unknown_action", e.to_string()),
    };

    let request = match middleware::auth_request(headers, params) {
        Ok(request) => request,
        Err(response) => return response,
    };

    authz::decide(services, &action.pipeline(), request).await
}
