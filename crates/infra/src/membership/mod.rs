//! Membership resolvers.
//!
//! - `in_memory`: lock-protected map, for tests/dev and seeded deployments
//! - `seed`: JSON seed file loading
//! - `cache`: TTL cache in front of any resolver

pub mod cache;
pub mod in_memory;
pub mod seed;

pub use cache::CachingMembershipResolver;
pub use in_memory::InMemoryMembershipStore;
pub use seed::{load_seed, MembershipSeed, SeedError};
