//! Caller identity and the collaborator that resolves it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use baro_core::{ProjectId, TenantId, UserId};

use crate::membership::LookupError;

/// Authenticated caller.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub tenant_id: TenantId,
}

/// Transport-agnostic view of the incoming request.
///
/// The HTTP layer fills in whatever it extracted (bearer token, path ids);
/// guards only ever read it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthRequest {
    bearer_token: Option<String>,
    project_id: Option<ProjectId>,
    tenant_id: Option<TenantId>,
}

impl AuthRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn with_project(mut self, project_id: ProjectId) -> Self {
        self.project_id = Some(project_id);
        self
    }

    pub fn with_tenant(mut self, tenant_id: TenantId) -> Self {
        self.tenant_id = Some(tenant_id);
        self
    }

    pub fn bearer_token(&self) -> Option<&str> {
        self.bearer_token.as_deref()
    }

    pub fn project_id(&self) -> Option<ProjectId> {
        self.project_id
    }

    pub fn tenant_id(&self) -> Option<TenantId> {
        self.tenant_id
    }
}

/// Resolves who is calling.
///
/// `Ok(None)` means the request carries no usable credentials and maps to
/// `Unauthenticated`. `Err` is reserved for backend failures.
#[async_trait]
pub trait IdentitySource: Send + Sync {
    async fn resolve_identity(&self, request: &AuthRequest) -> Result<Option<Identity>, LookupError>;
}
