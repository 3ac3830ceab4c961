use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use baro_auth::{AuthRequest, Pipeline};
use baro_core::{ProjectId, TenantId};

use crate::app::errors;
use crate::app::services::AppServices;
use crate::authz;

/// Per-route guard: the shared services plus the pipeline the route declares.
#[derive(Clone)]
pub struct RouteGuard {
    pub services: Arc<AppServices>,
    pub pipeline: Arc<Pipeline>,
}

impl RouteGuard {
    pub fn new(services: Arc<AppServices>, pipeline: Pipeline) -> Self {
        Self {
            services,
            pipeline: Arc::new(pipeline),
        }
    }
}

/// Enforce the route's pipeline; on success the `AuthContext` is put in the
/// request extensions for the handler.
pub async fn enforce(
    State(guard): State<RouteGuard>,
    params: Option<Path<HashMap<String, String>>>,
    mut req: Request,
    next: Next,
) -> Response {
    let params = params.map(|Path(p)| p).unwrap_or_default();
    let request = match auth_request(req.headers(), &params) {
        Ok(request) => request,
        Err(response) => return response,
    };

    match authz::authorize(&guard.services, &guard.pipeline, request).await {
        Ok(ctx) => {
            req.extensions_mut().insert(ctx);
            next.run(req).await
        }
        Err(response) => response,
    }
}

/// Collect what the guards may look at: bearer token and scope ids from the path.
pub fn auth_request(
    headers: &HeaderMap,
    params: &HashMap<String, String>,
) -> Result<AuthRequest, Response> {
    let mut request = AuthRequest::new();

    if let Some(token) = extract_bearer(headers) {
        request = request.with_bearer_token(token);
    }
    if let Some(raw) = params.get("project_id") {
        let id: ProjectId = raw.parse().map_err(|e: baro_core::DomainError| {
            errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", e.to_string())
        })?;
        request = request.with_project(id);
    }
    if let Some(raw) = params.get("tenant_id") {
        let id: TenantId = raw.parse().map_err(|e: baro_core::DomainError| {
            errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", e.to_string())
        })?;
        request = request.with_tenant(id);
    }

    Ok(request)
}

/// A missing or malformed header yields `None`; the identity source then
/// answers `Unauthenticated`.
fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let header = header.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}
