//! End-to-end organization lifecycle tests against the service facade.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use tenant_events::{BusinessEventPublisher, MemoryEventBus};
use tenant_org::{MemberRole, OrgMember, OrganizationPatch};
use tenant_service::store::{MemberPage, MembershipStore, StoreError, StoreResult};
use tenant_service::{
    MemoryBlobStore, MemoryMembershipStore, MemoryOrganizationRegistry, OrgError, OrgService,
    RequestContext, RetryConfig, StaticDatasourceCatalog,
};

fn service() -> (OrgService, Arc<MemoryEventBus>) {
    let bus = Arc::new(MemoryEventBus::new());
    let svc = OrgService::new(
        Arc::new(MemoryOrganizationRegistry::new()),
        Arc::new(MemoryMembershipStore::new()),
        Arc::new(MemoryBlobStore::new()),
        Arc::new(StaticDatasourceCatalog::default()),
        BusinessEventPublisher::new(bus.clone()),
    )
    .with_retry(RetryConfig {
        retry_delay: std::time::Duration::from_millis(1),
    });
    (svc, bus)
}

#[tokio::test]
async fn test_acme_full_lifecycle() {
    let (svc, bus) = service();
    let mut events = bus.subscribe("org.*").await.unwrap();

    let alice = RequestContext::new(Uuid::now_v7());
    let bob = RequestContext::new(Uuid::now_v7());
    let carol = RequestContext::new(Uuid::now_v7());

    // Alice founds Acme and becomes its admin
    let acme = svc.create(&alice, "Acme").await.unwrap();
    assert_eq!(events.recv().await.unwrap().event_type, "org.created");

    // Bob and Carol join as plain members
    svc.add_member(&alice, acme.org_id, bob.user_id, MemberRole::Member)
        .await
        .unwrap();
    svc.add_member(&alice, acme.org_id, carol.user_id, MemberRole::Member)
        .await
        .unwrap();
    assert_eq!(events.recv().await.unwrap().event_type, "org.member_added");
    assert_eq!(events.recv().await.unwrap().event_type, "org.member_added");

    // Bob is promoted; Alice can now step down
    svc.update_role_for_member(&alice, acme.org_id, bob.user_id, MemberRole::Admin)
        .await
        .unwrap();
    svc.update_role_for_member(&bob, acme.org_id, alice.user_id, MemberRole::Member)
        .await
        .unwrap();
    assert_eq!(
        events.recv().await.unwrap().event_type,
        "org.member_role_changed"
    );
    assert_eq!(
        events.recv().await.unwrap().event_type,
        "org.member_role_changed"
    );

    // Carol leaves on her own; Bob removes Alice
    svc.leave_organization(&carol, acme.org_id).await.unwrap();
    svc.remove_user_from_org(&bob, acme.org_id, alice.user_id)
        .await
        .unwrap();
    assert_eq!(events.recv().await.unwrap().event_type, "org.member_left");
    assert_eq!(
        events.recv().await.unwrap().event_type,
        "org.member_removed"
    );

    // Bob, the sole remaining member and admin, tears Acme down
    svc.remove_org(&bob, acme.org_id).await.unwrap();
    assert_eq!(events.recv().await.unwrap().event_type, "org.removed");

    let err = svc.list_members(&bob, acme.org_id, 0, None).await.unwrap_err();
    assert!(matches!(err, OrgError::NotFound));
}

#[tokio::test]
async fn test_pagination_is_exhaustive_and_stable() {
    let (svc, _bus) = service();
    let admin = RequestContext::new(Uuid::now_v7());
    let org = svc.create(&admin, "Big Org").await.unwrap();

    let mut expected = vec![admin.user_id];
    for _ in 0..24 {
        let user_id = Uuid::now_v7();
        svc.add_member(&admin, org.org_id, user_id, MemberRole::Member)
            .await
            .unwrap();
        expected.push(user_id);
    }

    // Walk the list in pages of 7; the union must be exactly the members, in
    // join order, with no duplicates
    let mut seen = Vec::new();
    let mut page = 0;
    loop {
        let view = svc
            .list_members(&admin, org.org_id, page, Some(7))
            .await
            .unwrap();
        assert_eq!(view.total, 25);
        if view.members.is_empty() {
            break;
        }
        seen.extend(view.members.iter().map(|m| m.user_id));
        page += 1;
    }
    assert_eq!(seen, expected);
}

#[tokio::test]
async fn test_remove_org_cascades() {
    let (svc, _bus) = service();
    let admin = RequestContext::new(Uuid::now_v7());
    let member = RequestContext::new(Uuid::now_v7());

    let org = svc.create(&admin, "Doomed").await.unwrap();
    svc.add_member(&admin, org.org_id, member.user_id, MemberRole::Member)
        .await
        .unwrap();
    let patch = OrganizationPatch {
        name: None,
        domains: Some(vec!["doomed.example.com".into()]),
    };
    svc.update(&admin, org.org_id, patch).await.unwrap();
    svc.switch_current_organization(&member, org.org_id, None)
        .await
        .unwrap();

    svc.remove_org(&admin, org.org_id).await.unwrap();

    // Memberships, session pointers, and summaries are all gone
    assert_eq!(svc.current_organization(&member).await, None);
    assert!(svc.my_organizations(&member).await.is_empty());
    let err = svc
        .get_org_common_settings(&admin, org.org_id)
        .await
        .unwrap_err();
    assert!(matches!(err, OrgError::NotFound));
}

#[tokio::test]
async fn test_last_admin_matrix() {
    let (svc, _bus) = service();
    let admin = RequestContext::new(Uuid::now_v7());
    let member = RequestContext::new(Uuid::now_v7());

    let org = svc.create(&admin, "Guarded").await.unwrap();
    svc.add_member(&admin, org.org_id, member.user_id, MemberRole::Member)
        .await
        .unwrap();

    // Downgrade of the only admin is blocked, even self-inflicted
    let err = svc
        .update_role_for_member(&admin, org.org_id, admin.user_id, MemberRole::Member)
        .await
        .unwrap_err();
    assert!(matches!(err, OrgError::LastAdminViolation));

    // Removing the only admin is blocked
    let err = svc
        .remove_user_from_org(&admin, org.org_id, admin.user_id)
        .await
        .unwrap_err();
    assert!(matches!(err, OrgError::LastAdminViolation));

    // A no-op role write on the only admin is fine
    svc.update_role_for_member(&admin, org.org_id, admin.user_id, MemberRole::Admin)
        .await
        .unwrap();

    // With a second admin every blocked operation unblocks
    svc.update_role_for_member(&admin, org.org_id, member.user_id, MemberRole::Admin)
        .await
        .unwrap();
    svc.update_role_for_member(&member, org.org_id, admin.user_id, MemberRole::Member)
        .await
        .unwrap();
}

/// Deterministic linear congruential generator for the invariant sweep.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0 >> 33
    }
}

#[tokio::test]
async fn test_random_membership_ops_never_drop_last_admin() {
    let store = MemoryMembershipStore::new();
    let org_id = Uuid::now_v7();
    let users: Vec<Uuid> = (0..8).map(|_| Uuid::now_v7()).collect();

    store
        .add_member(OrgMember::new(org_id, users[0], MemberRole::Admin))
        .await
        .unwrap();

    let mut rng = Lcg(0x5eed_cafe);
    for _ in 0..500 {
        let user = users[(rng.next() % users.len() as u64) as usize];
        match rng.next() % 3 {
            0 => {
                let role = if rng.next() % 2 == 0 {
                    MemberRole::Admin
                } else {
                    MemberRole::Member
                };
                let _ = store.add_member(OrgMember::new(org_id, user, role)).await;
            }
            1 => {
                let role = if rng.next() % 2 == 0 {
                    MemberRole::Admin
                } else {
                    MemberRole::Member
                };
                let _ = store.set_role(org_id, user, role).await;
            }
            _ => {
                let _ = store.remove(org_id, user).await;
            }
        }

        // Whatever sequence of accepted and rejected operations ran, a
        // populated organization always retains an admin
        let members = store.member_count(org_id).await;
        let admins = store.admin_count(org_id).await;
        assert!(
            members == 0 || admins >= 1,
            "invariant broken: {members} members, {admins} admins"
        );
    }
}

/// Membership store that fails `set_role` with a conflict a configured
/// number of times before delegating.
struct FlakyMembershipStore {
    inner: MemoryMembershipStore,
    conflicts_left: AtomicU32,
    set_role_calls: AtomicU32,
}

impl FlakyMembershipStore {
    fn new(conflicts: u32) -> Self {
        Self {
            inner: MemoryMembershipStore::new(),
            conflicts_left: AtomicU32::new(conflicts),
            set_role_calls: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl MembershipStore for FlakyMembershipStore {
    async fn add_member(&self, member: OrgMember) -> StoreResult<()> {
        self.inner.add_member(member).await
    }

    async fn set_role(&self, org_id: Uuid, user_id: Uuid, role: MemberRole) -> StoreResult<()> {
        self.set_role_calls.fetch_add(1, Ordering::SeqCst);
        if self
            .conflicts_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(StoreError::Conflict("simulated write conflict".into()));
        }
        self.inner.set_role(org_id, user_id, role).await
    }

    async fn remove(&self, org_id: Uuid, user_id: Uuid) -> StoreResult<()> {
        self.inner.remove(org_id, user_id).await
    }

    async fn list_members(
        &self,
        org_id: Uuid,
        page: usize,
        page_size: usize,
    ) -> StoreResult<MemberPage> {
        self.inner.list_members(org_id, page, page_size).await
    }

    async fn role_of(&self, org_id: Uuid, user_id: Uuid) -> StoreResult<MemberRole> {
        self.inner.role_of(org_id, user_id).await
    }

    async fn members_of(&self, org_id: Uuid) -> Vec<OrgMember> {
        self.inner.members_of(org_id).await
    }

    async fn admin_count(&self, org_id: Uuid) -> usize {
        self.inner.admin_count(org_id).await
    }

    async fn member_count(&self, org_id: Uuid) -> usize {
        self.inner.member_count(org_id).await
    }

    async fn orgs_of_user(&self, user_id: Uuid) -> Vec<(Uuid, MemberRole)> {
        self.inner.orgs_of_user(user_id).await
    }

    async fn purge_org(&self, org_id: Uuid) -> usize {
        self.inner.purge_org(org_id).await
    }
}

fn flaky_service(conflicts: u32) -> (OrgService, Arc<FlakyMembershipStore>) {
    let membership = Arc::new(FlakyMembershipStore::new(conflicts));
    let svc = OrgService::new(
        Arc::new(MemoryOrganizationRegistry::new()),
        membership.clone(),
        Arc::new(MemoryBlobStore::new()),
        Arc::new(StaticDatasourceCatalog::default()),
        BusinessEventPublisher::new(Arc::new(MemoryEventBus::new())),
    )
    .with_retry(RetryConfig {
        retry_delay: std::time::Duration::from_millis(1),
    });
    (svc, membership)
}

#[tokio::test]
async fn test_role_update_retries_single_conflict() {
    let (svc, membership) = flaky_service(1);
    let admin = RequestContext::new(Uuid::now_v7());
    let member = RequestContext::new(Uuid::now_v7());

    let org = svc.create(&admin, "Flaky").await.unwrap();
    svc.add_member(&admin, org.org_id, member.user_id, MemberRole::Member)
        .await
        .unwrap();

    svc.update_role_for_member(&admin, org.org_id, member.user_id, MemberRole::Admin)
        .await
        .unwrap();
    assert_eq!(membership.set_role_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_role_update_gives_up_after_second_conflict() {
    let (svc, membership) = flaky_service(2);
    let admin = RequestContext::new(Uuid::now_v7());
    let member = RequestContext::new(Uuid::now_v7());

    let org = svc.create(&admin, "Flakier").await.unwrap();
    svc.add_member(&admin, org.org_id, member.user_id, MemberRole::Member)
        .await
        .unwrap();

    let err = svc
        .update_role_for_member(&admin, org.org_id, member.user_id, MemberRole::Admin)
        .await
        .unwrap_err();
    assert!(matches!(err, OrgError::Transient(_)));
    assert_eq!(membership.set_role_calls.load(Ordering::SeqCst), 2);
    assert_eq!(
        membership.role_of(org.org_id, member.user_id).await.unwrap(),
        MemberRole::Member
    );
}
