//! Role/permission table: the immutable catalog every decision is made against.
//!
//! The table is built once at process start (built-in default or a JSON
//! document) and then shared behind an `Arc`. Roles are listed highest rank
//! first; the position in that list is the total order used for threshold
//! checks.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::permissions::project;
use crate::{Permission, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoleTableError {
    #[error("role table must define at least one role")]
    Empty,

    #[error("role name must not be blank")]
    BlankRoleName,

    #[error("role '{0}' is defined more than once")]
    DuplicateRole(String),

    #[error("invalid role table document: {0}")]
    Parse(String),
}

/// Serialized form of the table (e.g. a JSON config file).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleTableConfig {
    /// Highest rank first.
    pub roles: Vec<RoleConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleConfig {
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One role of the table with its fixed permission set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleDefinition {
    pub role: Role,
    /// Position in the total order; larger is more privileged.
    pub rank: usize,
    pub permissions: BTreeSet<Permission>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleTable {
    definitions: Vec<RoleDefinition>,
    index: HashMap<Role, usize>,
}

impl RoleTable {
    /// Built-in Owner > Editor > Viewer table.
    pub fn standard() -> Self {
        let owner = [
            project::VIEW_PROJECT,
            project::EDIT_PROJECT,
            project::DELETE_PROJECT,
            project::VIEW_MEMBERS,
            project::INVITE_MEMBERS,
            project::CHANGE_MEMBER_ROLES,
            project::REMOVE_MEMBERS,
        ];
        let editor = [
            project::VIEW_PROJECT,
            project::EDIT_PROJECT,
            project::VIEW_MEMBERS,
            project::INVITE_MEMBERS,
        ];
        let viewer = [project::VIEW_PROJECT, project::VIEW_MEMBERS];

        Self::build(vec![
            (Role::OWNER, owner.to_vec(), Some("Full control of the project and its members")),
            (Role::EDITOR, editor.to_vec(), Some("Can edit the project and invite members")),
            (Role::VIEWER, viewer.to_vec(), Some("Read-only access")),
        ])
    }

    pub fn from_config(config: RoleTableConfig) -> Result<Self, RoleTableError> {
        if config.roles.is_empty() {
            return Err(RoleTableError::Empty);
        }

        let mut seen = BTreeSet::new();
        let mut rows = Vec::with_capacity(config.roles.len());
        for role in config.roles {
            let name = role.name.trim().to_string();
            if name.is_empty() {
                return Err(RoleTableError::BlankRoleName);
            }
            if !seen.insert(name.clone()) {
                return Err(RoleTableError::DuplicateRole(name));
            }
            let permissions = role.permissions.into_iter().map(Permission::new).collect();
            rows.push((Role::new(name), permissions, role.description));
        }

        Ok(Self::build(rows))
    }

    pub fn from_json_str(json: &str) -> Result<Self, RoleTableError> {
        let config: RoleTableConfig =
            serde_json::from_str(json).map_err(|e| RoleTableError::Parse(e.to_string()))?;
        Self::from_config(config)
    }

    fn build<D: Into<String>>(rows: Vec<(Role, Vec<Permission>, Option<D>)>) -> Self {
        let count = rows.len();
        let mut definitions = Vec::with_capacity(count);
        let mut index = HashMap::with_capacity(count);

        for (position, (role, permissions, description)) in rows.into_iter().enumerate() {
            index.insert(role.clone(), position);
            definitions.push(RoleDefinition {
                role,
                rank: count - position,
                permissions: permissions.into_iter().collect(),
                description: description.map(Into::into),
            });
        }

        Self { definitions, index }
    }

    pub fn get(&self, role: &Role) -> Option<&RoleDefinition> {
        self.index.get(role).map(|&i| &self.definitions[i])
    }

    pub fn rank(&self, role: &Role) -> Option<usize> {
        self.get(role).map(|d| d.rank)
    }

    pub fn contains(&self, role: &Role) -> bool {
        self.index.contains_key(role)
    }

    /// Definitions, highest rank first.
    pub fn definitions(&self) -> &[RoleDefinition] {
        &self.definitions
    }

    pub fn roles(&self) -> impl Iterator<Item = &Role> {
        self.definitions.iter().map(|d| &d.role)
    }

    pub fn lowest(&self) -> Option<&Role> {
        self.definitions.last().map(|d| &d.role)
    }

    pub fn to_config(&self) -> RoleTableConfig {
        RoleTableConfig {
            roles: self
                .definitions
                .iter()
                .map(|d| RoleConfig {
                    name: d.role.as_str().to_string(),
                    permissions: d.permissions.iter().map(|p| p.as_str().to_string()).collect(),
                    description: d.description.clone(),
                })
                .collect(),
        }
    }
}

impl Default for RoleTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_is_ranked_owner_editor_viewer() {
        let table = RoleTable::standard();
        let order: Vec<_> = table.roles().map(|r| r.as_str()).collect();
        assert_eq!(order, vec!["Owner", "Editor", "Viewer"]);
        assert!(table.rank(&Role::OWNER) > table.rank(&Role::EDITOR));
        assert!(table.rank(&Role::EDITOR) > table.rank(&Role::VIEWER));
        assert_eq!(table.lowest(), Some(&Role::VIEWER));
    }

    #[test]
    fn loads_from_json_highest_first() {
        let json = r#"{
            "roles": [
                { "name": "Admin", "permissions": ["a", "b"] },
                { "name": "Guest", "permissions": ["a"], "description": "visitor" }
            ]
        }"#;
        let table = RoleTable::from_json_str(json).unwrap();
        assert_eq!(table.rank(&Role::new("Admin")), Some(2));
        assert_eq!(table.rank(&Role::new("Guest")), Some(1));
        assert!(!table.contains(&Role::OWNER));
        let guest = table.get(&Role::new("Guest")).unwrap();
        assert_eq!(guest.description.as_deref(), Some("visitor"));
        assert!(guest.permissions.contains(&Permission::new("a")));
    }

    #[test]
    fn rejects_empty_duplicate_and_blank() {
        assert_eq!(
            RoleTable::from_json_str(r#"{"roles": []}"#),
            Err(RoleTableError::Empty)
        );
        assert_eq!(
            RoleTable::from_json_str(r#"{"roles": [{"name": "A"}, {"name": " A "}]}"#),
            Err(RoleTableError::DuplicateRole("A".to_string()))
        );
        assert_eq!(
            RoleTable::from_json_str(r#"{"roles": [{"name": "  "}]}"#),
            Err(RoleTableError::BlankRoleName)
        );
        assert!(matches!(
            RoleTable::from_json_str("not json"),
            Err(RoleTableError::Parse(_))
        ));
    }

    #[test]
    fn config_round_trip_preserves_order() {
        let table = RoleTable::standard();
        let reloaded = RoleTable::from_config(table.to_config()).unwrap();
        assert_eq!(reloaded, table);
    }
}
