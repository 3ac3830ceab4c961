//! Guard composition: `all` (every guard must allow) and `any` (one is enough).
//!
//! Guards run strictly in declared order and never concurrently. Before a
//! composition runs, its declared order is checked against the facts already
//! in the context; a guard whose prerequisite nothing provides is a
//! `ConfigError`, reported before any guard executes.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, warn};

use crate::context::{AuthContext, ContextFacts};
use crate::error::{Denial, ErrorKind, Verdict};
use crate::guard::{Guard, GuardEnv, GuardRef};

/// Message of the aggregated `any` denial.
pub const NO_ALTERNATIVE_SATISFIED: &str = "none of the required permissions are satisfied";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Composition {
    All,
    Any,
}

#[derive(Clone)]
pub struct Pipeline {
    name: String,
    composition: Composition,
    guards: Vec<GuardRef>,
}

/// Result handed back to the transport layer.
#[derive(Debug)]
pub enum PipelineOutcome {
    Allowed(AuthContext),
    Denied(Denial),
}

impl PipelineOutcome {
    pub fn is_allowed(&self) -> bool {
        matches!(self, PipelineOutcome::Allowed(_))
    }

    pub fn into_result(self) -> Result<AuthContext, Denial> {
        match self {
            PipelineOutcome::Allowed(ctx) => Ok(ctx),
            PipelineOutcome::Denied(denial) => Err(denial),
        }
    }
}

impl Pipeline {
    /// Every guard must allow. An empty `all` allows.
    pub fn all(guards: impl IntoIterator<Item = GuardRef>) -> Self {
        Self {
            name: "all".to_string(),
            composition: Composition::All,
            guards: guards.into_iter().collect(),
        }
    }

    /// The first allowing guard wins. An empty `any` denies.
    ///
    /// When every alternative denies for a caller-related reason the result is
    /// a single `Forbidden` that does not say which alternative was closest;
    /// callers must not learn which permission combination was probed. Server
    /// faults (`UpstreamLookupFailure`, `ConfigError`, `InvalidRole`) are not
    /// folded into that: if nothing allowed, the first fault is returned so
    /// infrastructure trouble never looks like an access decision.
    pub fn any(guards: impl IntoIterator<Item = GuardRef>) -> Self {
        Self {
            name: "any".to_string(),
            composition: Composition::Any,
            guards: guards.into_iter().collect(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn composition(&self) -> Composition {
        self.composition
    }

    pub fn len(&self) -> usize {
        self.guards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }

    pub fn into_guard(self) -> GuardRef {
        Arc::new(self)
    }

    /// Run the pipeline against a fresh per-request context.
    pub async fn run(&self, mut ctx: AuthContext, env: &GuardEnv) -> PipelineOutcome {
        match self.check(&mut ctx, env).await {
            Verdict::Allow => {
                debug!(pipeline = %self.name, "pipeline allowed");
                PipelineOutcome::Allowed(ctx)
            }
            Verdict::Deny(denial) => PipelineOutcome::Denied(denial),
        }
    }

    async fn check_all(&self, ctx: &mut AuthContext, env: &GuardEnv) -> Verdict {
        for guard in &self.guards {
            match guard.check(ctx, env).await {
                Verdict::Allow => debug!(pipeline = %self.name, guard = guard.name(), "guard allowed"),
                Verdict::Deny(denial) => {
                    log_denial(&self.name, guard.name(), &denial);
                    return Verdict::Deny(denial);
                }
            }
        }
        Verdict::Allow
    }

    async fn check_any(&self, ctx: &mut AuthContext, env: &GuardEnv) -> Verdict {
        let mut first_fault: Option<Denial> = None;

        for guard in &self.guards {
            // Alternatives work on a scratch copy so a failed branch leaves nothing behind.
            let mut scratch = ctx.clone();
            match guard.check(&mut scratch, env).await {
                Verdict::Allow => {
                    debug!(pipeline = %self.name, guard = guard.name(), "alternative allowed");
                    *ctx = scratch;
                    return Verdict::Allow;
                }
                Verdict::Deny(denial) => {
                    debug!(
                        pipeline = %self.name,
                        guard = guard.name(),
                        kind = %denial.kind,
                        "alternative denied"
                    );
                    if denial.kind.is_server_fault() && first_fault.is_none() {
                        first_fault = Some(denial);
                    }
                }
            }
        }

        let denial = first_fault
            .unwrap_or_else(|| Denial::new(ErrorKind::Forbidden, NO_ALTERNATIVE_SATISFIED));
        log_denial(&self.name, "any", &denial);
        Verdict::Deny(denial)
    }
}

fn log_denial(pipeline: &str, guard: &str, denial: &Denial) {
    if denial.kind.is_server_fault() {
        error!(pipeline, guard, kind = %denial.kind, message = %denial.message, "guard failed");
    } else {
        warn!(pipeline, guard, kind = %denial.kind, message = %denial.message, "guard denied");
    }
}

#[async_trait]
impl Guard for Pipeline {
    fn name(&self) -> &str {
        &self.name
    }

    fn requires(&self) -> ContextFacts {
        match self.composition {
            Composition::All => {
                let mut have = ContextFacts::NONE;
                let mut needed = ContextFacts::NONE;
                for guard in &self.guards {
                    needed = needed.union(guard.requires().missing_from(have));
                    have = have.union(guard.provides());
                }
                needed
            }
            Composition::Any => self
                .guards
                .iter()
                .fold(ContextFacts::NONE, |acc, g| acc.union(g.requires())),
        }
    }

    fn provides(&self) -> ContextFacts {
        match self.composition {
            Composition::All => self
                .guards
                .iter()
                .fold(ContextFacts::NONE, |acc, g| acc.union(g.provides())),
            // Only what every alternative guarantees.
            Composition::Any => {
                let mut iter = self.guards.iter();
                match iter.next() {
                    Some(first) => iter.fold(first.provides(), |acc, g| acc.intersection(g.provides())),
                    None => ContextFacts::NONE,
                }
            }
        }
    }

    fn validate(&self, available: ContextFacts) -> Result<(), Denial> {
        match self.composition {
            Composition::All => {
                let mut have = available;
                for guard in &self.guards {
                    guard.validate(have)?;
                    have = have.union(guard.provides());
                }
                Ok(())
            }
            Composition::Any => self.guards.iter().try_for_each(|g| g.validate(available)),
        }
    }

    async fn check(&self, ctx: &mut AuthContext, env: &GuardEnv) -> Verdict {
        if let Err(denial) = self.validate(ctx.facts()) {
            log_denial(&self.name, "validate", &denial);
            return Verdict::Deny(denial);
        }

        match self.composition {
            Composition::All => self.check_all(ctx, env).await,
            Composition::Any => self.check_any(ctx, env).await,
        }
    }
}

/// Run `pipeline` on `ctx`.
pub async fn run_pipeline(pipeline: &Pipeline, ctx: AuthContext, env: &GuardEnv) -> PipelineOutcome {
    pipeline.run(ctx, env).await
}
