//! Role table introspection.

use std::sync::Arc;

use axum::{extract::Extension, Json};

use crate::app::dto::RolesView;
use crate::app::services::AppServices;

/// GET /v1/rbac/roles - the loaded table, highest rank first.
pub async fn list_roles(
    Extension(services): Extension<Arc<AppServices>>,
) -> Json<serde_json::Value> {
    Json(serde_json::json!(RolesView::from_table(&services.table)))
}
