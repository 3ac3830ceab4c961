//! Service wiring: role table, identity source, membership resolver.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use baro_auth::{
    GuardEnv, Hs256IdentitySource, IdentitySource, MembershipResolver, PermissionChecker,
    RoleTable, RoleTableError,
};
use baro_infra::{load_seed, CachingMembershipResolver, InMemoryMembershipStore, SeedError};

use crate::config::ApiConfig;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    RoleTable(#[from] RoleTableError),

    #[error(transparent)]
    Seed(#[from] SeedError),
}

/// Everything request handling needs, shared across all requests.
#[derive(Clone)]
pub struct AppServices {
    pub guards: GuardEnv,
    pub table: Arc<RoleTable>,
    pub strict_guards: bool,
}

impl AppServices {
    pub fn new(
        table: Arc<RoleTable>,
        identities: Arc<dyn IdentitySource>,
        memberships: Arc<dyn MembershipResolver>,
        strict_guards: bool,
    ) -> Self {
        let checker = PermissionChecker::new(table.clone());
        Self {
            guards: GuardEnv::new(checker, identities, memberships),
            table,
            strict_guards,
        }
    }
}

fn load_role_table(path: Option<&Path>) -> Result<RoleTable, StartupError> {
    let Some(path) = path else {
        return Ok(RoleTable::standard());
    };
    let raw = std::fs::read_to_string(path).map_err(|source| StartupError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(RoleTable::from_json_str(&raw)?)
}

pub fn build_services(config: &ApiConfig) -> Result<AppServices, StartupError> {
    let table = Arc::new(load_role_table(config.role_table_path.as_deref())?);
    tracing::info!(roles = table.definitions().len(), "role table loaded");

    let store = match &config.membership_seed_path {
        Some(path) => {
            let seed = load_seed(path)?;
            seed.validate(&table)?;
            tracing::info!(memberships = seed.memberships.len(), "membership seed loaded");
            InMemoryMembershipStore::from_memberships(seed.memberships)
        }
        None => InMemoryMembershipStore::new(),
    };

    let memberships: Arc<dyn MembershipResolver> = match config.membership_cache_ttl {
        Some(ttl) => Arc::new(CachingMembershipResolver::new(Arc::new(store), ttl)),
        None => Arc::new(store),
    };

    let identities = Arc::new(Hs256IdentitySource::new(config.jwt_secret.as_bytes()));

    Ok(AppServices::new(
        table,
        identities,
        memberships,
        config.strict_guards,
    ))
}
