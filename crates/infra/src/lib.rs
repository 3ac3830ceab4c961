//! Infrastructure layer: membership lookups backing the guards.

pub mod membership;

pub use membership::{
    load_seed, CachingMembershipResolver, InMemoryMembershipStore, MembershipSeed, SeedError,
};
