use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error};

use crate::context::{AuthContext, ContextFacts};
use crate::error::{AuthzError, Denial, ErrorKind, Verdict};
use crate::membership::MembershipScope;
use crate::{Permission, Role};

use super::{Guard, GuardEnv, GuardRef};

fn current_role(ctx: &AuthContext) -> Result<&Role, Denial> {
    ctx.role().ok_or_else(Denial::role_missing)
}

/// Resolves the caller from the identity source and records it.
#[derive(Debug, Default, Clone, Copy)]
pub struct AuthenticateUser;

#[async_trait]
impl Guard for AuthenticateUser {
    fn name(&self) -> &str {
        "authenticate_user"
    }

    fn provides(&self) -> ContextFacts {
        ContextFacts::IDENTITY
    }

    async fn check(&self, ctx: &mut AuthContext, env: &GuardEnv) -> Verdict {
        if ctx.identity().is_some() {
            return Verdict::Allow;
        }

        match env.identities.resolve_identity(ctx.request()).await {
            Ok(Some(identity)) => {
                debug!(user_id = %identity.user_id, tenant_id = %identity.tenant_id, "identity resolved");
                ctx.set_identity(identity);
                Verdict::Allow
            }
            Ok(None) => Verdict::deny(
                ErrorKind::Unauthenticated,
                "invalid or missing authentication token",
            ),
            Err(err) => {
                error!(error = %err, "identity lookup failed");
                Verdict::deny(
                    ErrorKind::UpstreamLookupFailure,
                    "failed to resolve caller identity",
                )
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Project,
    Tenant,
}

/// Resolves the caller's membership in the request's project or tenant.
///
/// The tenant variant falls back to the caller's own tenant when the request
/// names none.
#[derive(Debug, Clone, Copy)]
pub struct RequireMembership {
    kind: ScopeKind,
}

impl RequireMembership {
    pub fn new(kind: ScopeKind) -> Self {
        Self { kind }
    }

    fn scope(&self, ctx: &AuthContext) -> Option<MembershipScope> {
        match self.kind {
            ScopeKind::Project => ctx.request().project_id().map(MembershipScope::Project),
            ScopeKind::Tenant => ctx
                .request()
                .tenant_id()
                .or_else(|| ctx.identity().map(|i| i.tenant_id))
                .map(MembershipScope::Tenant),
        }
    }
}

#[async_trait]
impl Guard for RequireMembership {
    fn name(&self) -> &str {
        match self.kind {
            ScopeKind::Project => "require_project_membership",
            ScopeKind::Tenant => "require_tenant_membership",
        }
    }

    fn requires(&self) -> ContextFacts {
        ContextFacts::IDENTITY
    }

    fn provides(&self) -> ContextFacts {
        ContextFacts::ROLE
    }

    async fn check(&self, ctx: &mut AuthContext, env: &GuardEnv) -> Verdict {
        let Some(user_id) = ctx.identity().map(|i| i.user_id) else {
            return Verdict::deny(ErrorKind::Unauthenticated, "user not authenticated");
        };

        let Some(scope) = self.scope(ctx) else {
            return Verdict::Deny(Denial::config(format!(
                "{} used on a request that carries no {:?} id",
                self.name(),
                self.kind
            )));
        };

        // Already resolved earlier in this request: never ask twice.
        if ctx.activate(scope) {
            return Verdict::Allow;
        }

        match env.memberships.find_membership(scope, user_id).await {
            Ok(Some(membership)) if membership.scope == scope && membership.user_id == user_id => {
                debug!(%scope, %user_id, role = %membership.role, "membership resolved");
                ctx.record_membership(membership);
                Verdict::Allow
            }
            Ok(Some(other)) => {
                error!(%scope, %user_id, returned = %other.scope, "resolver returned a foreign membership");
                Verdict::deny(
                    ErrorKind::UpstreamLookupFailure,
                    format!("failed to verify {} membership", scope.kind()),
                )
            }
            Ok(None) => Verdict::deny(
                ErrorKind::NotAMember,
                format!("user is not a member of this {}", scope.kind()),
            ),
            Err(err) => {
                error!(%scope, %user_id, error = %err, "membership lookup failed");
                Verdict::deny(
                    ErrorKind::UpstreamLookupFailure,
                    format!("failed to verify {} membership", scope.kind()),
                )
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionRequirement {
    One(Permission),
    /// Satisfied by any listed permission; an empty list is never satisfied.
    AnyOf(Vec<Permission>),
}

#[derive(Debug, Clone)]
pub struct RequirePermission {
    requirement: PermissionRequirement,
}

impl RequirePermission {
    pub fn new(requirement: PermissionRequirement) -> Self {
        Self { requirement }
    }

    fn decide(&self, ctx: &AuthContext, env: &GuardEnv) -> Result<(), Denial> {
        let role = current_role(ctx)?;
        let granted = match &self.requirement {
            PermissionRequirement::One(p) => env.checker.has_permission(role, p)?,
            PermissionRequirement::AnyOf(ps) => env.checker.has_any_permission(role, ps)?,
        };

        if granted {
            Ok(())
        } else {
            Err(Denial::new(
                ErrorKind::InsufficientPermission,
                "insufficient permissions for this operation",
            ))
        }
    }
}

#[async_trait]
impl Guard for RequirePermission {
    fn name(&self) -> &str {
        "require_permission"
    }

    fn requires(&self) -> ContextFacts {
        ContextFacts::ROLE
    }

    async fn check(&self, ctx: &mut AuthContext, env: &GuardEnv) -> Verdict {
        self.decide(ctx, env).into()
    }
}

/// Threshold check: the caller's role must rank at or above `minimum`.
#[derive(Debug, Clone)]
pub struct RequireRole {
    minimum: Role,
}

impl RequireRole {
    pub fn new(minimum: Role) -> Self {
        Self { minimum }
    }

    fn decide(&self, ctx: &AuthContext, env: &GuardEnv) -> Result<(), Denial> {
        let role = current_role(ctx)?;
        if env.checker.is_at_least(role, &self.minimum)? {
            Ok(())
        } else {
            Err(Denial::new(
                ErrorKind::InsufficientRole,
                format!("role '{}' or higher required for this operation", self.minimum),
            ))
        }
    }
}

#[async_trait]
impl Guard for RequireRole {
    fn name(&self) -> &str {
        "require_role"
    }

    fn requires(&self) -> ContextFacts {
        ContextFacts::ROLE
    }

    async fn check(&self, ctx: &mut AuthContext, env: &GuardEnv) -> Verdict {
        self.decide(ctx, env).into()
    }
}

/// Exact match on Owner; not a threshold.
#[derive(Debug, Default, Clone, Copy)]
pub struct RequireProjectOwner;

#[async_trait]
impl Guard for RequireProjectOwner {
    fn name(&self) -> &str {
        "require_project_owner"
    }

    fn requires(&self) -> ContextFacts {
        ContextFacts::ROLE
    }

    async fn check(&self, ctx: &mut AuthContext, _env: &GuardEnv) -> Verdict {
        let decision = current_role(ctx).and_then(|role| {
            if *role == Role::OWNER {
                Ok(())
            } else {
                Err(Denial::new(
                    ErrorKind::InsufficientRole,
                    "only project owners can perform this operation",
                ))
            }
        });
        decision.into()
    }
}

/// Passes for Owner and Editor only.
#[derive(Debug, Default, Clone, Copy)]
pub struct RequireEditorOrHigher;

#[async_trait]
impl Guard for RequireEditorOrHigher {
    fn name(&self) -> &str {
        "require_editor_or_higher"
    }

    fn requires(&self) -> ContextFacts {
        ContextFacts::ROLE
    }

    async fn check(&self, ctx: &mut AuthContext, _env: &GuardEnv) -> Verdict {
        let decision = current_role(ctx).and_then(|role| {
            if *role == Role::OWNER || *role == Role::EDITOR {
                Ok(())
            } else {
                Err(Denial::new(
                    ErrorKind::InsufficientRole,
                    "editor or higher role required for this operation",
                ))
            }
        });
        decision.into()
    }
}

/// Viewer is the lowest built-in tier, so every known role passes today.
///
/// The role must still be present and known to the table; a table that adds
/// a tier below Viewer makes this guard start denying it. A table without a
/// Viewer tier uses its lowest role as the threshold.
#[derive(Debug, Default, Clone, Copy)]
pub struct RequireViewerOrHigher;

#[async_trait]
impl Guard for RequireViewerOrHigher {
    fn name(&self) -> &str {
        "require_viewer_or_higher"
    }

    fn requires(&self) -> ContextFacts {
        ContextFacts::ROLE
    }

    async fn check(&self, ctx: &mut AuthContext, env: &GuardEnv) -> Verdict {
        let table = env.checker.table();
        let threshold = if table.contains(&Role::VIEWER) {
            Some(&Role::VIEWER)
        } else {
            table.lowest()
        };

        let decision = current_role(ctx).and_then(|role| {
            let Some(threshold) = threshold else {
                return Err(AuthzError::InvalidRole(role.as_str().to_string()).into());
            };
            if env.checker.is_at_least(role, threshold)? {
                Ok(())
            } else {
                Err(Denial::new(
                    ErrorKind::InsufficientRole,
                    "viewer or higher role required for this operation",
                ))
            }
        });
        decision.into()
    }
}

pub fn authenticate_user() -> GuardRef {
    Arc::new(AuthenticateUser)
}

pub fn require_project_membership() -> GuardRef {
    Arc::new(RequireMembership::new(ScopeKind::Project))
}

pub fn require_tenant_membership() -> GuardRef {
    Arc::new(RequireMembership::new(ScopeKind::Tenant))
}

pub fn require_permission(permission: Permission) -> GuardRef {
    Arc::new(RequirePermission::new(PermissionRequirement::One(permission)))
}

pub fn require_any_permission(permissions: impl IntoIterator<Item = Permission>) -> GuardRef {
    Arc::new(RequirePermission::new(PermissionRequirement::AnyOf(
        permissions.into_iter().collect(),
    )))
}

pub fn require_role(minimum: Role) -> GuardRef {
    Arc::new(RequireRole::new(minimum))
}

pub fn require_project_owner() -> GuardRef {
    Arc::new(RequireProjectOwner)
}

pub fn require_editor_or_higher() -> GuardRef {
    Arc::new(RequireEditorOrHigher)
}

pub fn require_viewer_or_higher() -> GuardRef {
    Arc::new(RequireViewerOrHigher)
}
