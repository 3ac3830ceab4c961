//! Named endpoint policies.
//!
//! Each [`Action`] is the guard list one project/member endpoint declares.
//! The HTTP layer can enforce them on its own routes or expose them as
//! decision endpoints for other services.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::guard::{
    authenticate_user, require_editor_or_higher, require_permission, require_project_membership,
    require_project_owner, require_tenant_membership, require_viewer_or_higher, ScopeKind,
};
use crate::permissions::project;
use crate::pipeline::Pipeline;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    CreateProject,
    ViewProject,
    UpdateProject,
    DeleteProject,
    InviteMember,
    ListMembers,
    ChangeMemberRole,
    RemoveMember,
}

impl Action {
    pub const ALL: [Action; 8] = [
        Action::CreateProject,
        Action::ViewProject,
        Action::UpdateProject,
        Action::DeleteProject,
        Action::InviteMember,
        Action::ListMembers,
        Action::ChangeMemberRole,
        Action::RemoveMember,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Action::CreateProject => "create_project",
            Action::ViewProject => "view_project",
            Action::UpdateProject => "update_project",
            Action::DeleteProject => "delete_project",
            Action::InviteMember => "invite_member",
            Action::ListMembers => "list_members",
            Action::ChangeMemberRole => "change_member_role",
            Action::RemoveMember => "remove_member",
        }
    }

    /// Whether the action is checked against a tenant or a project membership.
    pub fn scope(self) -> ScopeKind {
        match self {
            Action::CreateProject => ScopeKind::Tenant,
            _ => ScopeKind::Project,
        }
    }

    pub fn pipeline(self) -> Pipeline {
        let membership = match self.scope() {
            ScopeKind::Tenant => require_tenant_membership(),
            ScopeKind::Project => require_project_membership(),
        };

        let mut guards = vec![authenticate_user(), membership];
        match self {
            Action::CreateProject => {}
            Action::ViewProject | Action::ListMembers => guards.push(require_viewer_or_higher()),
            Action::UpdateProject => guards.push(require_editor_or_higher()),
            Action::DeleteProject => guards.push(require_project_owner()),
            Action::InviteMember => guards.push(require_permission(project::INVITE_MEMBERS)),
            Action::ChangeMemberRole => {
                guards.push(require_permission(project::CHANGE_MEMBER_ROLES))
            }
            Action::RemoveMember => guards.push(require_permission(project::REMOVE_MEMBERS)),
        }

        Pipeline::all(guards).named(self.as_str())
    }
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action '{0}'")]
pub struct UnknownAction(pub String);

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}
