use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use baro_auth::{LookupError, Membership, MembershipResolver, MembershipScope};
use baro_core::UserId;

type CacheKey = (MembershipScope, UserId);

/// Map size at which expired answers are swept out on the next insert.
pub const DEFAULT_PRUNE_THRESHOLD: usize = 1024;

#[derive(Debug, Clone)]
struct CachedAnswer {
    membership: Option<Membership>,
    fetched_at: DateTime<Utc>,
}

struct Entries {
    answers: HashMap<CacheKey, CachedAnswer>,
    /// Next size that triggers a sweep; doubles while the live set keeps growing.
    prune_at: usize,
}

/// TTL cache in front of another resolver.
///
/// Both hits and "not a member" answers are cached; lookup errors are not, so
/// an outage is retried on the next request instead of being remembered.
/// Expired answers are dropped once the map reaches the prune threshold.
pub struct CachingMembershipResolver {
    inner: Arc<dyn MembershipResolver>,
    ttl: Duration,
    prune_threshold: usize,
    entries: RwLock<Entries>,
}

impl CachingMembershipResolver {
    pub fn new(inner: Arc<dyn MembershipResolver>, ttl: Duration) -> Self {
        Self::with_prune_threshold(inner, ttl, DEFAULT_PRUNE_THRESHOLD)
    }

    pub fn with_prune_threshold(
        inner: Arc<dyn MembershipResolver>,
        ttl: Duration,
        prune_threshold: usize,
    ) -> Self {
        let prune_threshold = prune_threshold.max(1);
        Self {
            inner,
            ttl,
            prune_threshold,
            entries: RwLock::new(Entries {
                answers: HashMap::new(),
                prune_at: prune_threshold,
            }),
        }
    }

    /// Cached answers, expired ones included until the next sweep.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.answers.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_fresh(&self, answer: &CachedAnswer, now: DateTime<Utc>) -> bool {
        now - answer.fetched_at < self.ttl
    }

    fn cached(&self, key: &CacheKey, now: DateTime<Utc>) -> Option<Option<Membership>> {
        let entries = self.entries.read().ok()?;
        entries
            .answers
            .get(key)
            .filter(|answer| self.is_fresh(answer, now))
            .map(|answer| answer.membership.clone())
    }

    /// Drop the cached answer for one user in one scope (e.g. after a role change).
    pub fn invalidate(&self, scope: MembershipScope, user_id: UserId) {
        if let Ok(mut entries) = self.entries.write() {
            entries.answers.remove(&(scope, user_id));
        }
    }

    pub(crate) async fn find_at(
        &self,
        scope: MembershipScope,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<Option<Membership>, LookupError> {
        let key = (scope, user_id);
        if let Some(answer) = self.cached(&key, now) {
            debug!(%scope, %user_id, "membership cache hit");
            return Ok(answer);
        }

        let membership = self.inner.find_membership(scope, user_id).await?;
        if let Ok(mut entries) = self.entries.write() {
            if entries.answers.len() >= entries.prune_at {
                let before = entries.answers.len();
                entries.answers.retain(|_, answer| self.is_fresh(answer, now));
                let live = entries.answers.len();
                entries.prune_at = self.prune_threshold.max(live.saturating_mul(2));
                debug!(swept = before - live, live, "membership cache pruned");
            }
            entries.answers.insert(
                key,
                CachedAnswer {
                    membership: membership.clone(),
                    fetched_at: now,
                },
            );
        }
        Ok(membership)
    }
}

#[async_trait]
impl MembershipResolver for CachingMembershipResolver {
    async fn find_membership(
        &self,
        scope: MembershipScope,
        user_id: UserId,
    ) -> Result<Option<Membership>, LookupError> {
        self.find_at(scope, user_id, Utc::now()).await
    }
}
