//! Stubs shared by the unit tests of this crate.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use baro_core::{ProjectId, TenantId, UserId};

use crate::context::{AuthContext, ContextFacts};
use crate::error::Verdict;
use crate::guard::{Guard, GuardEnv};
use crate::identity::{AuthRequest, Identity, IdentitySource};
use crate::membership::{LookupError, Membership, MembershipResolver, MembershipScope};
use crate::{PermissionChecker, Role};

pub struct StaticIdentity(pub Option<Identity>);

#[async_trait]
impl IdentitySource for StaticIdentity {
    async fn resolve_identity(&self, _request: &AuthRequest) -> Result<Option<Identity>, LookupError> {
        Ok(self.0)
    }
}

/// Membership table with a call counter; `failing` makes every lookup error.
#[derive(Default)]
pub struct StubResolver {
    entries: HashMap<(MembershipScope, UserId), Role>,
    failing: bool,
    calls: AtomicUsize,
}

impl StubResolver {
    pub fn with(mut self, scope: MembershipScope, user_id: UserId, role: Role) -> Self {
        self.entries.insert((scope, user_id), role);
        self
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MembershipResolver for StubResolver {
    async fn find_membership(
        &self,
        scope: MembershipScope,
        user_id: UserId,
    ) -> Result<Option<Membership>, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(LookupError::Unavailable("connection refused".to_string()));
        }
        Ok(self.entries.get(&(scope, user_id)).map(|role| Membership {
            scope,
            user_id,
            role: role.clone(),
        }))
    }
}

/// Guard with a fixed verdict that counts its invocations.
pub struct CountingGuard {
    name: &'static str,
    verdict: Verdict,
    requires: ContextFacts,
    provides: ContextFacts,
    calls: AtomicUsize,
}

impl CountingGuard {
    pub fn new(name: &'static str, verdict: Verdict) -> Arc<Self> {
        Arc::new(Self {
            name,
            verdict,
            requires: ContextFacts::NONE,
            provides: ContextFacts::NONE,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn needing(name: &'static str, requires: ContextFacts) -> Arc<Self> {
        Arc::new(Self {
            name,
            verdict: Verdict::Allow,
            requires,
            provides: ContextFacts::NONE,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Guard for CountingGuard {
    fn name(&self) -> &str {
        self.name
    }

    fn requires(&self) -> ContextFacts {
        self.requires
    }

    fn provides(&self) -> ContextFacts {
        self.provides
    }

    async fn check(&self, _ctx: &mut AuthContext, _env: &GuardEnv) -> Verdict {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.verdict.clone()
    }
}

pub struct Fixture {
    pub user_id: UserId,
    pub tenant_id: TenantId,
    pub project_id: ProjectId,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            user_id: UserId::new(),
            tenant_id: TenantId::new(),
            project_id: ProjectId::new(),
        }
    }

    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.user_id,
            tenant_id: self.tenant_id,
        }
    }

    pub fn project_scope(&self) -> MembershipScope {
        MembershipScope::Project(self.project_id)
    }

    pub fn request(&self) -> AuthRequest {
        AuthRequest::new().with_project(self.project_id)
    }

    /// Resolver where the fixture user holds `role` in the fixture project.
    pub fn resolver_with_role(&self, role: Role) -> Arc<StubResolver> {
        Arc::new(StubResolver::default().with(self.project_scope(), self.user_id, role))
    }

    pub fn env(&self, resolver: Arc<StubResolver>) -> GuardEnv {
        GuardEnv::new(
            PermissionChecker::default(),
            Arc::new(StaticIdentity(Some(self.identity()))),
            resolver,
        )
    }

    /// Context that already went through authentication and membership.
    pub fn context_with_role(&self, role: Role) -> AuthContext {
        AuthContext::new(self.request())
            .with_identity(self.identity())
            .with_membership(Membership {
                scope: self.project_scope(),
                user_id: self.user_id,
                role,
            })
    }
}
