//! Response bodies.

use serde::Serialize;

use baro_auth::{AuthContext, MembershipScope, Permission, Role, RoleDefinition, RoleTable};
use baro_core::{TenantId, UserId};

/// What the caller may do in the scope the request was authorized against.
#[derive(Debug, Clone, Serialize)]
pub struct AccessView {
    pub user_id: UserId,
    pub tenant_id: TenantId,
    pub scope: MembershipScope,
    pub role: Role,
    pub permissions: Vec<Permission>,
}

impl AccessView {
    /// `None` when the context was not populated by a membership guard.
    pub fn from_context(ctx: &AuthContext, table: &RoleTable) -> Option<Self> {
        let identity = ctx.identity()?;
        let membership = ctx.membership()?;
        let permissions = table
            .get(&membership.role)
            .map(|def| def.permissions.iter().cloned().collect())
            .unwrap_or_default();

        Some(Self {
            user_id: identity.user_id,
            tenant_id: identity.tenant_id,
            scope: membership.scope,
            role: membership.role.clone(),
            permissions,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RolesView<'a> {
    /// Highest rank first.
    pub roles: Vec<&'a RoleDefinition>,
}

impl<'a> RolesView<'a> {
    pub fn from_table(table: &'a RoleTable) -> Self {
        Self {
            roles: table.definitions().iter().collect(),
        }
    }
}
