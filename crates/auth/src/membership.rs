//! Membership records and the resolver the guards consult.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use baro_core::{ProjectId, TenantId, UserId};

use crate::Role;

/// What a membership is attached to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum MembershipScope {
    Project(ProjectId),
    Tenant(TenantId),
}

impl MembershipScope {
    pub fn kind(&self) -> &'static str {
        match self {
            MembershipScope::Project(_) => "project",
            MembershipScope::Tenant(_) => "tenant",
        }
    }
}

impl core::fmt::Display for MembershipScope {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MembershipScope::Project(id) => write!(f, "project:{id}"),
            MembershipScope::Tenant(id) => write!(f, "tenant:{id}"),
        }
    }
}

/// A user's membership in a project or tenant, carrying exactly one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub scope: MembershipScope,
    pub user_id: UserId,
    pub role: Role,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("lookup backend unavailable: {0}")]
    Unavailable(String),

    #[error("lookup timed out")]
    Timeout,
}

/// Looks up memberships. Implementations own caching, timeouts and retries.
#[async_trait]
pub trait MembershipResolver: Send + Sync {
    async fn find_membership(
        &self,
        scope: MembershipScope,
        user_id: UserId,
    ) -> Result<Option<Membership>, LookupError>;
}
