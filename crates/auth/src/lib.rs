//! `baro-auth` — the access-control pipeline.
//!
//! Role/permission table, checker, per-request context, guards and their
//! composition. Decoupled from HTTP and storage: identity and membership
//! lookups come in through the [`IdentitySource`] and [`MembershipResolver`]
//! traits, and denials go out as values for the transport to map.

pub mod checker;
pub mod claims;
pub mod context;
pub mod error;
pub mod guard;
pub mod identity;
pub mod jwt;
pub mod membership;
pub mod permissions;
pub mod pipeline;
pub mod policy;
pub mod roles;
pub mod table;

#[cfg(test)]
pub(crate) mod test_support;

pub use checker::PermissionChecker;
pub use claims::{validate_claims, JwtClaims, TokenValidationError};
pub use context::{AuthContext, ContextFacts};
pub use error::{AuthzError, Denial, ErrorKind, Verdict};
pub use guard::{Guard, GuardEnv, GuardRef};
pub use identity::{AuthRequest, Identity, IdentitySource};
pub use jwt::{Hs256IdentitySource, TokenError};
pub use membership::{LookupError, Membership, MembershipResolver, MembershipScope};
pub use permissions::Permission;
pub use pipeline::{run_pipeline, Composition, Pipeline, PipelineOutcome};
pub use policy::{Action, UnknownAction};
pub use roles::Role;
pub use table::{RoleConfig, RoleDefinition, RoleTable, RoleTableConfig, RoleTableError};
