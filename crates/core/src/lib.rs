//! `baro-core` — identifiers and error types shared by every Baro crate.
//!
//! Nothing in here knows about HTTP, storage or authorization policy.

pub mod error;
pub mod id;

pub use error::DomainError;
pub use id::{ProjectId, TenantId, UserId};
