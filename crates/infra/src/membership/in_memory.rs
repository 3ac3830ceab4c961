use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use baro_auth::{LookupError, Membership, MembershipResolver, MembershipScope};
use baro_core::UserId;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
struct MemberKey {
    scope: MembershipScope,
    user_id: UserId,
}

/// In-memory membership table.
///
/// Intended for tests/dev. One membership per (scope, user); inserting again
/// replaces the role.
#[derive(Debug, Default)]
pub struct InMemoryMembershipStore {
    memberships: RwLock<HashMap<MemberKey, Membership>>,
}

impl InMemoryMembershipStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_memberships(memberships: impl IntoIterator<Item = Membership>) -> Self {
        let map = memberships
            .into_iter()
            .map(|m| {
                let key = MemberKey {
                    scope: m.scope,
                    user_id: m.user_id,
                };
                (key, m)
            })
            .collect();
        Self {
            memberships: RwLock::new(map),
        }
    }

    /// Insert or replace; returns the previous membership for the same scope/user.
    pub fn upsert(&self, membership: Membership) -> Result<Option<Membership>, LookupError> {
        let key = MemberKey {
            scope: membership.scope,
            user_id: membership.user_id,
        };
        let mut map = self
            .memberships
            .write()
            .map_err(|_| LookupError::Unavailable("lock poisoned".to_string()))?;
        Ok(map.insert(key, membership))
    }

    pub fn remove(
        &self,
        scope: MembershipScope,
        user_id: UserId,
    ) -> Result<Option<Membership>, LookupError> {
        let mut map = self
            .memberships
            .write()
            .map_err(|_| LookupError::Unavailable("lock poisoned".to_string()))?;
        Ok(map.remove(&MemberKey { scope, user_id }))
    }

    pub fn len(&self) -> usize {
        self.memberships.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl MembershipResolver for InMemoryMembershipStore {
    async fn find_membership(
        &self,
        scope: MembershipScope,
        user_id: UserId,
    ) -> Result<Option<Membership>, LookupError> {
        let map = self
            .memberships
            .read()
            .map_err(|_| LookupError::Unavailable("lock poisoned".to_string()))?;
        Ok(map.get(&MemberKey { scope, user_id }).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use baro_auth::Role;
    use baro_core::{ProjectId, TenantId};

    #[tokio::test]
    async fn lookup_is_keyed_by_scope_and_user() {
        let user = UserId::new();
        let project = MembershipScope::Project(ProjectId::new());
        let tenant = MembershipScope::Tenant(TenantId::new());
        let store = InMemoryMembershipStore::from_memberships([Membership {
            scope: project,
            user_id: user,
            role: Role::EDITOR,
        }]);

        let found = store.find_membership(project, user).await.unwrap().unwrap();
        assert_eq!(found.role, Role::EDITOR);
        assert_eq!(store.find_membership(tenant, user).await, Ok(None));
        assert_eq!(store.find_membership(project, UserId::new()).await, Ok(None));
    }

    #[tokio::test]
    async fn upsert_replaces_and_remove_forgets() {
        let user = UserId::new();
        let project = MembershipScope::Project(ProjectId::new());
        let store = InMemoryMembershipStore::new();
        assert!(store.is_empty());

        let member = |role| Membership {
            scope: project,
            user_id: user,
            role,
        };
        assert_eq!(store.upsert(member(Role::VIEWER)), Ok(None));
        assert_eq!(store.upsert(member(Role::OWNER)), Ok(Some(member(Role::VIEWER))));
        assert_eq!(store.len(), 1);

        assert_eq!(store.remove(project, user), Ok(Some(member(Role::OWNER))));
        assert_eq!(store.find_membership(project, user).await, Ok(None));
    }
}
