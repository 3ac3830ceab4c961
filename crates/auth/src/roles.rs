use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role identifier held by a membership.
///
/// Roles are names at this layer; their rank and permission set come from the
/// loaded [`RoleTable`](crate::RoleTable). A name the table does not know is
/// reported as `InvalidRole` by the checker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub const OWNER: Role = Role(Cow::Borrowed("Owner"));
    pub const EDITOR: Role = Role(Cow::Borrowed("Editor"));
    pub const VIEWER: Role = Role(Cow::Borrowed("Viewer"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
