use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::HeaderMap,
    response::Response,
};

use baro_auth::guard::ScopeKind;

use crate::app::routes::projects::decide_scoped;
use crate::app::services::AppServices;

/// GET /v1/tenants/:tenant_id/actions/:action - decision only.
pub async fn decide(
    Extension(services): Extension<Arc<AppServices>>,
    Path(params): Path<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    decide_scoped(&services, ScopeKind::Tenant, &params, &headers).await
}
