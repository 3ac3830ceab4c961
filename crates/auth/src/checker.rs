use std::cmp::Ordering;
use std::sync::Arc;

use crate::error::AuthzError;
use crate::{Permission, Role, RoleTable, RoleDefinition};

/// Pure queries over an injected [`RoleTable`].
///
/// - No IO
/// - No panics
/// - Unknown roles are an error, never a silent `false`
#[derive(Debug, Clone)]
pub struct PermissionChecker {
    table: Arc<RoleTable>,
}

impl PermissionChecker {
    pub fn new(table: Arc<RoleTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &RoleTable {
        &self.table
    }

    fn definition(&self, role: &Role) -> Result<&RoleDefinition, AuthzError> {
        self.table
            .get(role)
            .ok_or_else(|| AuthzError::InvalidRole(role.as_str().to_string()))
    }

    pub fn has_permission(&self, role: &Role, permission: &Permission) -> Result<bool, AuthzError> {
        Ok(self.definition(role)?.permissions.contains(permission))
    }

    /// `true` if the role holds at least one of `permissions`; an empty slice is `false`.
    pub fn has_any_permission(
        &self,
        role: &Role,
        permissions: &[Permission],
    ) -> Result<bool, AuthzError> {
        let granted = &self.definition(role)?.permissions;
        Ok(permissions.iter().any(|p| granted.contains(p)))
    }

    /// Compare two roles by rank. `Greater` means `a` outranks `b`.
    pub fn compare_role_level(&self, a: &Role, b: &Role) -> Result<Ordering, AuthzError> {
        let rank_a = self.definition(a)?.rank;
        let rank_b = self.definition(b)?.rank;
        Ok(rank_a.cmp(&rank_b))
    }

    pub fn is_at_least(&self, role: &Role, minimum: &Role) -> Result<bool, AuthzError> {
        Ok(self.compare_role_level(role, minimum)? != Ordering::Less)
    }
}

impl Default for PermissionChecker {
    fn default() -> Self {
        Self::new(Arc::new(RoleTable::standard()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::project;
    use proptest::prelude::*;

    fn checker() -> PermissionChecker {
        PermissionChecker::default()
    }

    fn standard_role() -> impl Strategy<Value = Role> {
        prop_oneof![Just(Role::OWNER), Just(Role::EDITOR), Just(Role::VIEWER)]
    }

    #[test]
    fn viewer_cannot_invite_but_owner_can() {
        let c = checker();
        assert!(!c.has_permission(&Role::VIEWER, &project::INVITE_MEMBERS).unwrap());
        assert!(c.has_permission(&Role::OWNER, &project::INVITE_MEMBERS).unwrap());
    }

    #[test]
    fn unknown_role_is_invalid_everywhere() {
        let c = checker();
        let ghost = Role::new("Ghost");
        let expected = Err(AuthzError::InvalidRole("Ghost".to_string()));

        assert_eq!(c.has_permission(&ghost, &project::VIEW_PROJECT), expected);
        assert_eq!(c.has_any_permission(&ghost, &[]), expected);
        assert_eq!(
            c.compare_role_level(&Role::OWNER, &ghost).map(|_| ()),
            Err(AuthzError::InvalidRole("Ghost".to_string()))
        );
    }

    #[test]
    fn any_permission_is_or_and_empty_is_false() {
        let c = checker();
        assert!(!c.has_any_permission(&Role::OWNER, &[]).unwrap());
        assert!(
            c.has_any_permission(
                &Role::VIEWER,
                &[project::DELETE_PROJECT, project::VIEW_MEMBERS]
            )
            .unwrap()
        );
        assert!(
            !c.has_any_permission(
                &Role::VIEWER,
                &[project::DELETE_PROJECT, project::REMOVE_MEMBERS]
            )
            .unwrap()
        );
    }

    #[test]
    fn standard_order_is_owner_editor_viewer() {
        let c = checker();
        assert_eq!(c.compare_role_level(&Role::OWNER, &Role::EDITOR), Ok(Ordering::Greater));
        assert_eq!(c.compare_role_level(&Role::EDITOR, &Role::VIEWER), Ok(Ordering::Greater));
        assert_eq!(c.compare_role_level(&Role::VIEWER, &Role::OWNER), Ok(Ordering::Less));
        assert!(c.is_at_least(&Role::EDITOR, &Role::EDITOR).unwrap());
        assert!(!c.is_at_least(&Role::VIEWER, &Role::EDITOR).unwrap());
    }

    #[test]
    fn custom_table_is_honoured() {
        let table = RoleTable::from_json_str(
            r#"{"roles": [{"name": "Lead", "permissions": ["ship"]}, {"name": "Intern"}]}"#,
        )
        .unwrap();
        let c = PermissionChecker::new(Arc::new(table));
        assert!(c.has_permission(&Role::new("Lead"), &Permission::new("ship")).unwrap());
        assert!(!c.has_permission(&Role::new("Intern"), &Permission::new("ship")).unwrap());
        assert!(c.has_permission(&Role::OWNER, &Permission::new("ship")).is_err());
    }

    proptest! {
        #[test]
        fn comparison_is_reflexive(r in standard_role()) {
            prop_assert_eq!(checker().compare_role_level(&r, &r), Ok(Ordering::Equal));
        }

        #[test]
        fn comparison_is_antisymmetric(a in standard_role(), b in standard_role()) {
            let c = checker();
            let ab = c.compare_role_level(&a, &b).unwrap();
            let ba = c.compare_role_level(&b, &a).unwrap();
            prop_assert_eq!(ab, ba.reverse());
            if ab == Ordering::Equal {
                prop_assert_eq!(a, b);
            }
        }

        #[test]
        fn comparison_is_transitive(
            a in standard_role(),
            b in standard_role(),
            d in standard_role(),
        ) {
            let c = checker();
            let ab = c.compare_role_level(&a, &b).unwrap();
            let bd = c.compare_role_level(&b, &d).unwrap();
            if ab != Ordering::Less && bd != Ordering::Less {
                prop_assert_ne!(c.compare_role_level(&a, &d).unwrap(), Ordering::Less);
            }
        }
    }
}
