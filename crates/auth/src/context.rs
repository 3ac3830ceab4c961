use std::collections::HashMap;

use crate::identity::{AuthRequest, Identity};
use crate::membership::{Membership, MembershipScope};
use crate::Role;

/// Which context fields are known to be populated.
///
/// Guards declare what they need and what they add; the composer checks the
/// declared order against these before running anything.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct ContextFacts {
    pub identity: bool,
    pub role: bool,
}

impl ContextFacts {
    pub const NONE: ContextFacts = ContextFacts {
        identity: false,
        role: false,
    };
    pub const IDENTITY: ContextFacts = ContextFacts {
        identity: true,
        role: false,
    };
    pub const ROLE: ContextFacts = ContextFacts {
        identity: false,
        role: true,
    };

    pub fn union(self, other: ContextFacts) -> ContextFacts {
        ContextFacts {
            identity: self.identity || other.identity,
            role: self.role || other.role,
        }
    }

    pub fn intersection(self, other: ContextFacts) -> ContextFacts {
        ContextFacts {
            identity: self.identity && other.identity,
            role: self.role && other.role,
        }
    }

    /// Facts in `self` that `available` does not cover.
    pub fn missing_from(self, available: ContextFacts) -> ContextFacts {
        ContextFacts {
            identity: self.identity && !available.identity,
            role: self.role && !available.role,
        }
    }

    pub fn is_empty(self) -> bool {
        !self.identity && !self.role
    }
}

impl core::fmt::Display for ContextFacts {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match (self.identity, self.role) {
            (true, true) => f.write_str("identity, role"),
            (true, false) => f.write_str("identity"),
            (false, true) => f.write_str("role"),
            (false, false) => f.write_str("nothing"),
        }
    }
}

/// Per-request accumulator of what the guards have established.
///
/// Built empty by the transport for every request and dropped when the
/// request ends. Memberships are remembered per scope so a second lookup for
/// the same scope in the same request reuses the first answer.
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    request: AuthRequest,
    identity: Option<Identity>,
    memberships: HashMap<MembershipScope, Membership>,
    active: Option<MembershipScope>,
}

impl AuthContext {
    pub fn new(request: AuthRequest) -> Self {
        Self {
            request,
            ..Self::default()
        }
    }

    pub fn request(&self) -> &AuthRequest {
        &self.request
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// The membership whose role currently drives role/permission guards.
    pub fn membership(&self) -> Option<&Membership> {
        self.active.and_then(|scope| self.memberships.get(&scope))
    }

    pub fn role(&self) -> Option<&Role> {
        self.membership().map(|m| &m.role)
    }

    pub fn membership_for(&self, scope: MembershipScope) -> Option<&Membership> {
        self.memberships.get(&scope)
    }

    pub fn facts(&self) -> ContextFacts {
        ContextFacts {
            identity: self.identity.is_some(),
            role: self.role().is_some(),
        }
    }

    pub fn set_identity(&mut self, identity: Identity) {
        self.identity = Some(identity);
    }

    /// Record a resolved membership and make its role the active one.
    pub fn record_membership(&mut self, membership: Membership) {
        let scope = membership.scope;
        self.memberships.insert(scope, membership);
        self.active = Some(scope);
    }

    /// Re-activate a membership already resolved in this request.
    ///
    /// Returns `false` if nothing was recorded for `scope`.
    pub fn activate(&mut self, scope: MembershipScope) -> bool {
        if self.memberships.contains_key(&scope) {
            self.active = Some(scope);
            true
        } else {
            false
        }
    }

    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.set_identity(identity);
        self
    }

    pub fn with_membership(mut self, membership: Membership) -> Self {
        self.record_membership(membership);
        self
    }
}
