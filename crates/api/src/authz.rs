//! Run a guard pipeline for one request.

use axum::http::StatusCode;
use axum::response::IntoResponse;

use baro_auth::{AuthContext, AuthRequest, Guard, Pipeline, PipelineOutcome};

use crate::app::errors;
use crate::app::services::AppServices;

/// Build a fresh context for `request`, run `pipeline`, and map a denial.
///
/// On success the populated context is handed to the handler.
pub async fn authorize(
    services: &AppServices,
    pipeline: &Pipeline,
    request: AuthRequest,
) -> Result<AuthContext, axum::response::Response> {
    match pipeline.run(AuthContext::new(request), &services.guards).await {
        PipelineOutcome::Allowed(ctx) => Ok(ctx),
        PipelineOutcome::Denied(denial) => {
            Err(errors::denial_to_response(denial, services.strict_guards))
        }
    }
}

/// Decision-only form: 204 when the pipeline allows, the mapped denial otherwise.
pub async fn decide(
    services: &AppServices,
    pipeline: &Pipeline,
    request: AuthRequest,
) -> axum::response::Response {
    match authorize(services, pipeline, request).await {
        Ok(ctx) => {
            tracing::debug!(
                pipeline = pipeline.name(),
                user_id = ?ctx.identity().map(|i| i.user_id),
                "decision: allow"
            );
            StatusCode::NO_CONTENT.into_response()
        }
        Err(response) => response,
    }
}
