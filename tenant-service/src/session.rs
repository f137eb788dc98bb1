//! Session context management and the organization switch protocol
//!
//! Each user has a session-scoped [`UserContext`] holding their
//! current-organization pointer. Switching organizations is a short ordered
//! pipeline with external side effects:
//!
//! 1. publish the logout event for the old session context — must be accepted
//!    before anything else happens;
//! 2. verify membership and atomically overwrite the pointer — the only
//!    irreversible transition; a failure here leaves the pointer unchanged
//!    and suppresses the login event;
//! 3. publish the login event for the new context — initiated before the
//!    switch is reported, but its own failure does not undo the switch;
//! 4. check the request's referrer domain — a binding to a *different*
//!    organization yields an informational mismatch view.
//!
//! Each step is a single `.await`, so cancellation can only land between
//! steps; the pointer write itself runs inside one lock acquisition with no
//! suspension point after the membership check commits the decision.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domains::DomainResolver;
use crate::error::{OrgError, OrgResult};
use crate::store::MembershipStore;
use crate::views::DomainCheckView;
use tenant_events::BusinessEventPublisher;
use tenant_org::UserContext;

/// Phase of an in-flight switch, for tracing. This is per-request state,
/// not a persisted machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchPhase {
    /// No switch in flight
    Idle,
    /// Publishing the logout event for the old context
    LoggingOut,
    /// Verifying membership and moving the pointer
    Switching,
    /// Publishing the login event for the new context
    LoggingIn,
}

/// Outcome of a successful organization switch.
#[derive(Debug, Clone)]
pub enum SwitchOutcome {
    /// Pointer updated; the referrer domain was absent, unbound, or bound to
    /// the same organization.
    Switched { org_id: Uuid },

    /// Pointer updated, but the referrer domain is bound to a different
    /// organization. Informational only.
    DomainMismatch {
        org_id: Uuid,
        suggested: DomainCheckView,
    },
}

impl SwitchOutcome {
    /// The organization that is now current, regardless of the domain hint.
    pub fn org_id(&self) -> Uuid {
        match self {
            SwitchOutcome::Switched { org_id } => *org_id,
            SwitchOutcome::DomainMismatch { org_id, .. } => *org_id,
        }
    }
}

/// Tracks each user's current-organization pointer and runs the switch
/// protocol.
pub struct SessionContextManager {
    contexts: RwLock<HashMap<Uuid, UserContext>>,
    membership: Arc<dyn MembershipStore>,
    resolver: DomainResolver,
    publisher: BusinessEventPublisher,
}

impl std::fmt::Debug for SessionContextManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContextManager").finish()
    }
}

impl SessionContextManager {
    /// Create a manager over a membership store, domain resolver, and event
    /// publisher.
    pub fn new(
        membership: Arc<dyn MembershipStore>,
        resolver: DomainResolver,
        publisher: BusinessEventPublisher,
    ) -> Self {
        Self {
            contexts: RwLock::new(HashMap::new()),
            membership,
            resolver,
            publisher,
        }
    }

    /// Switch the user's current organization.
    ///
    /// On failure the pointer retains its prior value and no login event is
    /// published; the logout from step 1 may already have been delivered.
    pub async fn switch_current_organization(
        &self,
        user_id: Uuid,
        org_id: Uuid,
        referer_domain: Option<&str>,
    ) -> OrgResult<SwitchOutcome> {
        let mut phase = SwitchPhase::LoggingOut;
        tracing::debug!(%user_id, %org_id, ?phase, "switch started");

        // Step 1: tear down the old session context. Listeners depend on
        // stale-session cleanup happening before the pointer changes, so a
        // rejected publish aborts the whole switch.
        self.publisher.publish_user_logout_event(user_id).await?;

        phase = SwitchPhase::Switching;
        tracing::debug!(%user_id, %org_id, ?phase, "logout accepted");

        // Step 2: membership gate, then the pointer move. Switching into an
        // organization the user does not belong to is forbidden and leaves
        // the pointer untouched.
        self.membership
            .role_of(org_id, user_id)
            .await
            .map_err(|_| OrgError::NotAMember)?;
        {
            let mut contexts = self.contexts.write().await;
            contexts
                .entry(user_id)
                .or_insert_with(|| UserContext::new(user_id))
                .switch_organization(org_id);
        }

        phase = SwitchPhase::LoggingIn;
        tracing::debug!(%user_id, %org_id, ?phase, "pointer updated");

        // Step 3: announce the new context. The pointer update is the
        // operation's primary effect; a failed login publish is logged but
        // does not fail the switch.
        if let Err(err) = self.publisher.publish_user_login_event(user_id, org_id).await {
            tracing::warn!(%user_id, %org_id, %err, "login event publish failed");
        }

        // Step 4: domain hint for custom-domain/SSO UX.
        let outcome = match self.resolver.check(referer_domain, org_id).await {
            Some(suggested) => SwitchOutcome::DomainMismatch { org_id, suggested },
            None => SwitchOutcome::Switched { org_id },
        };

        tracing::debug!(%user_id, %org_id, phase = ?SwitchPhase::Idle, "switch completed");
        Ok(outcome)
    }

    /// The user's current organization, if any.
    pub async fn current_organization(&self, user_id: Uuid) -> Option<Uuid> {
        self.contexts
            .read()
            .await
            .get(&user_id)
            .and_then(|ctx| ctx.current_organization_id)
    }

    /// Snapshot of the user's full context, if one exists.
    pub async fn context_of(&self, user_id: Uuid) -> Option<UserContext> {
        self.contexts.read().await.get(&user_id).cloned()
    }

    /// Clear the user's pointer (logout hook).
    pub async fn clear(&self, user_id: Uuid) {
        if let Some(ctx) = self.contexts.write().await.get_mut(&user_id) {
            ctx.clear_context();
        }
    }

    /// Drop one user's references to an organization (membership ended).
    pub async fn forget_for_user(&self, user_id: Uuid, org_id: Uuid) {
        if let Some(ctx) = self.contexts.write().await.get_mut(&user_id) {
            ctx.forget_organization(org_id);
        }
    }

    /// Drop every user's references to an organization (organization
    /// removed).
    pub async fn forget_organization(&self, org_id: Uuid) {
        for ctx in self.contexts.write().await.values_mut() {
            ctx.forget_organization(org_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryMembershipStore, MemoryOrganizationRegistry, OrganizationRegistry};
    use tenant_events::MemoryEventBus;
    use tenant_org::{MemberRole, Organization, OrgMember};

    struct Fixture {
        manager: SessionContextManager,
        bus: Arc<MemoryEventBus>,
        org: Organization,
        user_id: Uuid,
    }

    async fn fixture() -> Fixture {
        let membership = Arc::new(MemoryMembershipStore::new());
        let registry = Arc::new(MemoryOrganizationRegistry::new());
        let bus = Arc::new(MemoryEventBus::new());

        let user_id = Uuid::now_v7();
        let org = Organization::new("Acme", user_id);
        registry.create(org.clone()).await.unwrap();
        membership
            .add_member(OrgMember::new(org.id, user_id, MemberRole::Admin))
            .await
            .unwrap();

        let manager = SessionContextManager::new(
            membership,
            DomainResolver::new(registry),
            BusinessEventPublisher::new(bus.clone()),
        );
        Fixture {
            manager,
            bus,
            org,
            user_id,
        }
    }

    #[tokio::test]
    async fn test_switch_success() {
        let f = fixture().await;

        let outcome = f
            .manager
            .switch_current_organization(f.user_id, f.org.id, None)
            .await
            .unwrap();

        assert!(matches!(outcome, SwitchOutcome::Switched { .. }));
        assert_eq!(outcome.org_id(), f.org.id);
        assert_eq!(
            f.manager.current_organization(f.user_id).await,
            Some(f.org.id)
        );
    }

    #[tokio::test]
    async fn test_switch_non_member_leaves_pointer() {
        let f = fixture().await;
        f.manager
            .switch_current_organization(f.user_id, f.org.id, None)
            .await
            .unwrap();

        let stranger_org = Uuid::now_v7();
        let err = f
            .manager
            .switch_current_organization(f.user_id, stranger_org, None)
            .await
            .unwrap_err();

        assert!(matches!(err, OrgError::NotAMember));
        assert_eq!(
            f.manager.current_organization(f.user_id).await,
            Some(f.org.id)
        );
    }

    #[tokio::test]
    async fn test_logout_precedes_login() {
        let f = fixture().await;
        let mut sub = f.bus.subscribe("session.*").await.unwrap();

        f.manager
            .switch_current_organization(f.user_id, f.org.id, None)
            .await
            .unwrap();

        let first = sub.recv().await.unwrap();
        let second = sub.recv().await.unwrap();
        assert_eq!(first.event_type, "session.user_logged_out");
        assert_eq!(second.event_type, "session.user_logged_in");
    }

    #[tokio::test]
    async fn test_failed_switch_publishes_no_login() {
        let f = fixture().await;
        let mut sub = f.bus.subscribe("session.*").await.unwrap();

        let _ = f
            .manager
            .switch_current_organization(f.user_id, Uuid::now_v7(), None)
            .await
            .unwrap_err();

        // Only the logout from step 1 was published
        let first = sub.recv().await.unwrap();
        assert_eq!(first.event_type, "session.user_logged_out");
        let next =
            tokio::time::timeout(std::time::Duration::from_millis(50), sub.recv()).await;
        assert!(next.is_err());
    }

    #[tokio::test]
    async fn test_clear_and_forget() {
        let f = fixture().await;
        f.manager
            .switch_current_organization(f.user_id, f.org.id, None)
            .await
            .unwrap();

        f.manager.clear(f.user_id).await;
        assert_eq!(f.manager.current_organization(f.user_id).await, None);

        f.manager
            .switch_current_organization(f.user_id, f.org.id, None)
            .await
            .unwrap();
        f.manager.forget_organization(f.org.id).await;
        assert_eq!(f.manager.current_organization(f.user_id).await, None);
        let ctx = f.manager.context_of(f.user_id).await.unwrap();
        assert!(ctx.recent_organizations.is_empty());
    }
}
