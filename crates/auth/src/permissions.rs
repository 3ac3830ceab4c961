use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Permission identifier.
///
/// Permissions are opaque strings (e.g. "canInviteMembers"). Which roles hold
/// which permissions is decided by the role table, never by the permission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Project-scoped permissions used by the built-in table and endpoint policies.
pub mod project {
    use super::Permission;

    pub const VIEW_PROJECT: Permission = Permission::from_static("canViewProject");
    pub const EDIT_PROJECT: Permission = Permission::from_static("canEditProject");
    pub const DELETE_PROJECT: Permission = Permission::from_static("canDeleteProject");
    pub const VIEW_MEMBERS: Permission = Permission::from_static("canViewMembers");
    pub const INVITE_MEMBERS: Permission = Permission::from_static("canInviteMembers");
    pub const CHANGE_MEMBER_ROLES: Permission = Permission::from_static("canChangeMemberRoles");
    pub const REMOVE_MEMBERS: Permission = Permission::from_static("canRemoveMembers");
}
