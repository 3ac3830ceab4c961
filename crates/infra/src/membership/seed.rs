//! Seed file for the in-memory store.
//!
//! ```json
//! {
//!   "memberships": [
//!     {
//!       "scope": { "kind": "project", "id": "0190..." },
//!       "user_id": "0190...",
//!       "role": "Owner"
//!     }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use baro_auth::{Membership, RoleTable};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read membership seed: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid membership seed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("membership seed uses role '{0}' which the role table does not define")]
    UnknownRole(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipSeed {
    #[serde(default)]
    pub memberships: Vec<Membership>,
}

impl MembershipSeed {
    /// Reject roles the loaded table does not know, so bad seed data fails at startup.
    pub fn validate(&self, table: &RoleTable) -> Result<(), SeedError> {
        match self.memberships.iter().find(|m| !table.contains(&m.role)) {
            Some(m) => Err(SeedError::UnknownRole(m.role.as_str().to_string())),
            None => Ok(()),
        }
    }
}

pub fn load_seed(path: impl AsRef<Path>) -> Result<MembershipSeed, SeedError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}
