use std::sync::Arc;

use async_trait::async_trait;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use baro_auth::permissions::project;
use baro_auth::{
    Action, AuthContext, AuthRequest, GuardEnv, Identity, IdentitySource, LookupError,
    Membership, MembershipResolver, MembershipScope, PermissionChecker, Role,
};
use baro_core::{ProjectId, TenantId, UserId};

/// Every lookup succeeds with the same identity/role; measures guard overhead only.
struct Fixed {
    identity: Identity,
    role: Role,
}

#[async_trait]
impl IdentitySource for Fixed {
    async fn resolve_identity(&self, _request: &AuthRequest) -> Result<Option<Identity>, LookupError> {
        Ok(Some(self.identity))
    }
}

#[async_trait]
impl MembershipResolver for Fixed {
    async fn find_membership(
        &self,
        scope: MembershipScope,
        user_id: UserId,
    ) -> Result<Option<Membership>, LookupError> {
        Ok(Some(Membership {
            scope,
            user_id,
            role: self.role.clone(),
        }))
    }
}

fn bench_checker(c: &mut Criterion) {
    let checker = PermissionChecker::default();
    let wanted = [project::DELETE_PROJECT, project::REMOVE_MEMBERS, project::VIEW_MEMBERS];

    c.bench_function("checker/has_permission", |b| {
        b.iter(|| checker.has_permission(black_box(&Role::EDITOR), black_box(&project::INVITE_MEMBERS)))
    });
    c.bench_function("checker/has_any_permission", |b| {
        b.iter(|| checker.has_any_permission(black_box(&Role::VIEWER), black_box(&wanted)))
    });
    c.bench_function("checker/compare_role_level", |b| {
        b.iter(|| checker.compare_role_level(black_box(&Role::OWNER), black_box(&Role::VIEWER)))
    });
}

fn bench_policies(c: &mut Criterion) {
    let rt = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let fixed = Arc::new(Fixed {
        identity: Identity {
            user_id: UserId::new(),
            tenant_id: TenantId::new(),
        },
        role: Role::OWNER,
    });
    let env = GuardEnv::new(PermissionChecker::default(), fixed.clone(), fixed);
    let request = AuthRequest::new().with_project(ProjectId::new());

    let mut group = c.benchmark_group("policy");
    for action in [Action::ViewProject, Action::DeleteProject, Action::InviteMember] {
        let pipeline = action.pipeline();
        group.bench_with_input(BenchmarkId::from_parameter(action), &pipeline, |b, pipeline| {
            b.iter(|| rt.block_on(pipeline.run(AuthContext::new(request.clone()), &env)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_checker, bench_policies);
criterion_main!(benches);
