//! Guard contract and the services guards are allowed to consult.
//!
//! A guard looks at the [`AuthContext`], may extend it, and returns a
//! [`Verdict`]. Guards never build transport responses and only write to the
//! context when they allow.

use std::sync::Arc;

use async_trait::async_trait;

use crate::context::{AuthContext, ContextFacts};
use crate::error::{Denial, Verdict};
use crate::identity::IdentitySource;
use crate::membership::MembershipResolver;
use crate::PermissionChecker;

pub mod builtin;

pub use builtin::{
    authenticate_user, require_any_permission, require_editor_or_higher, require_permission,
    require_project_membership, require_project_owner, require_role, require_tenant_membership,
    require_viewer_or_higher, AuthenticateUser, PermissionRequirement, RequireEditorOrHigher,
    RequireMembership, RequirePermission, RequireProjectOwner, RequireRole,
    RequireViewerOrHigher, ScopeKind,
};

/// Shared, read-only collaborators for a guard run.
#[derive(Clone)]
pub struct GuardEnv {
    pub checker: PermissionChecker,
    pub identities: Arc<dyn IdentitySource>,
    pub memberships: Arc<dyn MembershipResolver>,
}

impl GuardEnv {
    pub fn new(
        checker: PermissionChecker,
        identities: Arc<dyn IdentitySource>,
        memberships: Arc<dyn MembershipResolver>,
    ) -> Self {
        Self {
            checker,
            identities,
            memberships,
        }
    }
}

#[async_trait]
pub trait Guard: Send + Sync {
    /// Stable name used in logs and ordering errors.
    fn name(&self) -> &str;

    /// Context facts that must be established before this guard runs.
    fn requires(&self) -> ContextFacts {
        ContextFacts::NONE
    }

    /// Context facts this guard establishes when it allows.
    fn provides(&self) -> ContextFacts {
        ContextFacts::NONE
    }

    /// Check the declared order: everything this guard needs must already be available.
    fn validate(&self, available: ContextFacts) -> Result<(), Denial> {
        let missing = self.requires().missing_from(available);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Denial::config(format!(
                "guard '{}' needs {missing} but no guard declared before it provides it",
                self.name()
            )))
        }
    }

    async fn check(&self, ctx: &mut AuthContext, env: &GuardEnv) -> Verdict;
}

pub type GuardRef = Arc<dyn Guard>;
