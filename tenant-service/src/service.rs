//! Organization service facade
//!
//! [`OrgService`] is the single entry point an HTTP or RPC layer calls into.
//! Every operation takes a [`RequestContext`] identifying the caller,
//! enforces role policy before touching storage, and publishes lifecycle
//! events after state changes commit. Lifecycle event publishes are
//! best-effort: a failed publish is logged, not surfaced, because the state
//! change has already happened.

use std::sync::Arc;

use uuid::Uuid;

use crate::domains::DomainResolver;
use crate::error::{OrgError, OrgResult};
use crate::external::{BlobStore, DatasourceMetaCatalog, DatasourceMetaInfo};
use crate::groups::GroupResolver;
use crate::retry::{retry_once, RetryConfig};
use crate::session::{SessionContextManager, SwitchOutcome};
use crate::store::{MembershipStore, MemberPage, OrganizationRegistry, MAX_PAGE_SIZE};
use crate::views::{
    role_descriptions, GroupView, OrgMemberListView, OrgView, RequestContext, RoleDescription,
};
use tenant_events::{BusinessEventPublisher, OrgEvent};
use tenant_org::{
    CommonSettings, MemberRole, OrgMember, Organization, OrganizationPatch, OrganizationSummary,
};
use tenant_policy::{authorize, can_change_role, can_remove_member, OrgAction};

/// Facade over the stores, session manager, and event publisher.
pub struct OrgService {
    registry: Arc<dyn OrganizationRegistry>,
    membership: Arc<dyn MembershipStore>,
    sessions: Arc<SessionContextManager>,
    groups: GroupResolver,
    blobs: Arc<dyn BlobStore>,
    catalog: Arc<dyn DatasourceMetaCatalog>,
    publisher: BusinessEventPublisher,
    retry: RetryConfig,
}

impl std::fmt::Debug for OrgService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrgService").finish()
    }
}

impl OrgService {
    pub fn new(
        registry: Arc<dyn OrganizationRegistry>,
        membership: Arc<dyn MembershipStore>,
        blobs: Arc<dyn BlobStore>,
        catalog: Arc<dyn DatasourceMetaCatalog>,
        publisher: BusinessEventPublisher,
    ) -> Self {
        let sessions = Arc::new(SessionContextManager::new(
            membership.clone(),
            DomainResolver::new(registry.clone()),
            publisher.clone(),
        ));
        Self {
            groups: GroupResolver::new(membership.clone()),
            registry,
            membership,
            sessions,
            blobs,
            catalog,
            publisher,
            retry: RetryConfig::default(),
        }
    }

    /// Override the conflict-retry configuration.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Session manager handle, for logout hooks and tests.
    pub fn sessions(&self) -> &Arc<SessionContextManager> {
        &self.sessions
    }

    /// Fetch the organization and the caller's role in it, then check the
    /// action against that role. NotFound is reported before NotAMember so
    /// probing never distinguishes "exists but not yours" from "missing".
    async fn require_role(
        &self,
        ctx: &RequestContext,
        org_id: Uuid,
        action: OrgAction,
    ) -> OrgResult<(Organization, MemberRole)> {
        let org = self.registry.get(org_id).await?;
        let role = self
            .membership
            .role_of(org_id, ctx.user_id)
            .await
            .map_err(|_| OrgError::NotAMember)?;
        authorize(role, action)?;
        Ok((org, role))
    }

    async fn publish_lifecycle(&self, event: OrgEvent) {
        if let Err(err) = self.publisher.publish_org_event(event).await {
            tracing::warn!(%err, "lifecycle event publish failed");
        }
    }

    // ---- lifecycle ----

    /// Create an organization with the caller as its first member, an Admin.
    ///
    /// If the founding membership cannot be recorded the registry entry is
    /// rolled back so no orphaned organization survives.
    pub async fn create(&self, ctx: &RequestContext, name: &str) -> OrgResult<OrgView> {
        let org = Organization::new(name, ctx.user_id);
        let org_id = org.id;
        self.registry.create(org.clone()).await?;

        let founder = OrgMember::new(org_id, ctx.user_id, MemberRole::Admin);
        if let Err(err) = self.membership.add_member(founder).await {
            if let Err(rollback_err) = self.registry.remove(org_id).await {
                tracing::error!(%org_id, %rollback_err, "rollback of orphaned organization failed");
            }
            return Err(err.into());
        }

        tracing::info!(%org_id, name, "organization created");
        self.publish_lifecycle(OrgEvent::Created {
            org_id,
            name: name.to_string(),
        })
        .await;
        Ok(OrgView::from_org(&org, MemberRole::Admin))
    }

    /// Update the organization profile. Admin only.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        org_id: Uuid,
        patch: OrganizationPatch,
    ) -> OrgResult<OrgView> {
        let (_, role) = self
            .require_role(ctx, org_id, OrgAction::UpdateProfile)
            .await?;
        let updated = self.registry.update(org_id, patch).await?;
        Ok(OrgView::from_org(&updated, role))
    }

    /// Remove an organization: registry entry, memberships, domain bindings,
    /// and every user's session references to it. Admin only.
    pub async fn remove_org(&self, ctx: &RequestContext, org_id: Uuid) -> OrgResult<()> {
        self.require_role(ctx, org_id, OrgAction::RemoveOrganization)
            .await?;

        let removed = self.registry.remove(org_id).await?;
        let purged = self.membership.purge_org(org_id).await;
        self.sessions.forget_organization(org_id).await;

        if let Some(logo_ref) = removed.logo_ref {
            if let Err(err) = self.blobs.delete(&logo_ref).await {
                tracing::warn!(%org_id, %err, "logo cleanup failed during removal");
            }
        }

        tracing::info!(%org_id, purged, "organization removed");
        self.publish_lifecycle(OrgEvent::Removed { org_id }).await;
        Ok(())
    }

    // ---- logo ----

    /// Store a new logo and record its reference, deleting the previous blob
    /// if one existed. Admin only.
    pub async fn upload_logo(
        &self,
        ctx: &RequestContext,
        org_id: Uuid,
        bytes: Vec<u8>,
    ) -> OrgResult<String> {
        self.require_role(ctx, org_id, OrgAction::UpdateProfile)
            .await?;

        let blob_ref = self
            .blobs
            .store(bytes)
            .await
            .map_err(|e| OrgError::Blob(e.to_string()))?;
        let previous = self
            .registry
            .set_logo(org_id, Some(blob_ref.clone()))
            .await?;

        // Old blob is unreachable once the reference is swapped; failing to
        // delete it only leaks storage.
        if let Some(old_ref) = previous {
            if let Err(err) = self.blobs.delete(&old_ref).await {
                tracing::warn!(%org_id, old_ref, %err, "previous logo delete failed");
            }
        }
        Ok(blob_ref)
    }

    /// Delete the organization's logo. Admin only. NotFound when no logo is
    /// set.
    pub async fn delete_logo(&self, ctx: &RequestContext, org_id: Uuid) -> OrgResult<()> {
        self.require_role(ctx, org_id, OrgAction::UpdateProfile)
            .await?;

        let previous = self.registry.set_logo(org_id, None).await?;
        let old_ref = previous.ok_or(OrgError::NotFound)?;
        if let Err(err) = self.blobs.delete(&old_ref).await {
            tracing::warn!(%org_id, old_ref, %err, "logo blob delete failed");
        }
        Ok(())
    }

    // ---- membership ----

    /// Page through the organization's members in join order. Any member may
    /// call this. `page` is zero-based; `page_size` of `None` means the
    /// maximum (1000).
    pub async fn list_members(
        &self,
        ctx: &RequestContext,
        org_id: Uuid,
        page: usize,
        page_size: Option<usize>,
    ) -> OrgResult<OrgMemberListView> {
        self.require_role(ctx, org_id, OrgAction::ViewMembers)
            .await?;

        let page_size = page_size.unwrap_or(MAX_PAGE_SIZE);
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(OrgError::PageSizeOutOfRange(page_size));
        }
        let page: MemberPage = self.membership.list_members(org_id, page, page_size).await?;
        Ok(OrgMemberListView::from(page))
    }

    /// Add a user to the organization with an explicit role. Admin only.
    pub async fn add_member(
        &self,
        ctx: &RequestContext,
        org_id: Uuid,
        user_id: Uuid,
        role: MemberRole,
    ) -> OrgResult<()> {
        self.require_role(ctx, org_id, OrgAction::ManageMembers)
            .await?;

        let member = OrgMember::new(org_id, user_id, role).with_inviter(ctx.user_id);
        self.membership.add_member(member).await?;

        self.publish_lifecycle(OrgEvent::MemberAdded {
            org_id,
            member_id: user_id,
            role,
        })
        .await;
        Ok(())
    }

    /// Change a member's role. Admin only; a downgrade that would leave the
    /// organization without an admin is rejected. Retries once on a
    /// write-write conflict.
    pub async fn update_role_for_member(
        &self,
        ctx: &RequestContext,
        org_id: Uuid,
        user_id: Uuid,
        new_role: MemberRole,
    ) -> OrgResult<()> {
        let (_, actor_role) = self
            .require_role(ctx, org_id, OrgAction::ManageMembers)
            .await?;
        let current = self
            .membership
            .role_of(org_id, user_id)
            .await
            .map_err(|_| OrgError::NotAMember)?;
        can_change_role(actor_role, current, new_role)?;

        retry_once(&self.retry, || {
            self.membership.set_role(org_id, user_id, new_role)
        })
        .await?;

        self.publish_lifecycle(OrgEvent::MemberRoleChanged {
            org_id,
            member_id: user_id,
            role: new_role,
        })
        .await;
        Ok(())
    }

    /// Leave an organization voluntarily. Open to any member, admins
    /// included, but the last admin of a multi-member organization cannot
    /// leave.
    pub async fn leave_organization(&self, ctx: &RequestContext, org_id: Uuid) -> OrgResult<()> {
        self.registry.get(org_id).await?;
        let role = self
            .membership
            .role_of(org_id, ctx.user_id)
            .await
            .map_err(|_| OrgError::NotAMember)?;
        can_remove_member(role, true)?;

        self.membership.remove(org_id, ctx.user_id).await?;
        self.sessions.forget_for_user(ctx.user_id, org_id).await;

        self.publish_lifecycle(OrgEvent::MemberLeft {
            org_id,
            member_id: ctx.user_id,
        })
        .await;
        Ok(())
    }

    /// Remove another user from the organization. Admin only, subject to the
    /// last-admin check.
    pub async fn remove_user_from_org(
        &self,
        ctx: &RequestContext,
        org_id: Uuid,
        user_id: Uuid,
    ) -> OrgResult<()> {
        let (_, actor_role) = self
            .require_role(ctx, org_id, OrgAction::ManageMembers)
            .await?;
        can_remove_member(actor_role, user_id == ctx.user_id)?;

        self.membership.remove(org_id, user_id).await?;
        self.sessions.forget_for_user(user_id, org_id).await;

        self.publish_lifecycle(OrgEvent::MemberRemoved {
            org_id,
            member_id: user_id,
        })
        .await;
        Ok(())
    }

    // ---- session ----

    /// Switch the caller's current organization. See
    /// [`SessionContextManager::switch_current_organization`] for the
    /// protocol.
    pub async fn switch_current_organization(
        &self,
        ctx: &RequestContext,
        org_id: Uuid,
        referer_domain: Option<&str>,
    ) -> OrgResult<SwitchOutcome> {
        self.sessions
            .switch_current_organization(ctx.user_id, org_id, referer_domain)
            .await
    }

    /// The caller's current organization, if any.
    pub async fn current_organization(&self, ctx: &RequestContext) -> Option<Uuid> {
        self.sessions.current_organization(ctx.user_id).await
    }

    /// Every organization the caller belongs to, marking the current one.
    pub async fn my_organizations(&self, ctx: &RequestContext) -> Vec<OrganizationSummary> {
        let current = self.sessions.current_organization(ctx.user_id).await;
        let mut summaries = Vec::new();
        for (org_id, role) in self.membership.orgs_of_user(ctx.user_id).await {
            // Skip memberships whose organization vanished mid-iteration
            let Ok(org) = self.registry.get(org_id).await else {
                continue;
            };
            summaries.push(OrganizationSummary {
                id: org_id,
                name: org.name,
                logo_ref: org.logo_ref,
                user_role: role,
                member_count: self.membership.member_count(org_id).await as u32,
                is_current: current == Some(org_id),
            });
        }
        summaries
    }

    // ---- settings ----

    /// All common settings of the organization. Any member may read them.
    pub async fn get_org_common_settings(
        &self,
        ctx: &RequestContext,
        org_id: Uuid,
    ) -> OrgResult<CommonSettings> {
        let (org, _) = self
            .require_role(ctx, org_id, OrgAction::ViewMembers)
            .await?;
        Ok(org.common_settings)
    }

    /// A single common setting by key.
    pub async fn get_common_setting(
        &self,
        ctx: &RequestContext,
        org_id: Uuid,
        key: &str,
    ) -> OrgResult<Option<serde_json::Value>> {
        self.require_role(ctx, org_id, OrgAction::ViewMembers)
            .await?;
        Ok(self.registry.get_common_setting(org_id, key).await?)
    }

    /// Write a common setting. Admin only.
    pub async fn update_org_common_settings(
        &self,
        ctx: &RequestContext,
        org_id: Uuid,
        key: &str,
        value: serde_json::Value,
    ) -> OrgResult<()> {
        self.require_role(ctx, org_id, OrgAction::ManageSettings)
            .await?;
        self.registry.set_common_setting(org_id, key, value).await?;
        Ok(())
    }

    // ---- groups and metadata ----

    /// The implicit all-members group, with a live member count.
    pub async fn all_members_group(
        &self,
        ctx: &RequestContext,
        org_id: Uuid,
    ) -> OrgResult<GroupView> {
        self.require_role(ctx, org_id, OrgAction::ViewMembers)
            .await?;
        Ok(self.groups.all_members_group(org_id, ctx.locale).await)
    }

    /// The implicit developer group (the admins), with a live count.
    pub async fn dev_group(&self, ctx: &RequestContext, org_id: Uuid) -> OrgResult<GroupView> {
        self.require_role(ctx, org_id, OrgAction::ViewMembers)
            .await?;
        Ok(self.groups.dev_group(org_id, ctx.locale).await)
    }

    /// The assignable roles, localized for the caller.
    pub fn org_role_descriptions(&self, ctx: &RequestContext) -> Vec<RoleDescription> {
        role_descriptions(ctx.locale)
    }

    /// Datasource types this deployment supports. Deployment-wide, not per
    /// organization.
    pub fn supported_datasource_types(&self) -> Vec<DatasourceMetaInfo> {
        self.catalog.list_supported_datasource_types()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::{MemoryBlobStore, StaticDatasourceCatalog};
    use crate::store::{MemoryMembershipStore, MemoryOrganizationRegistry};
    use tenant_events::MemoryEventBus;
    use tenant_org::Locale;

    fn service() -> OrgService {
        OrgService::new(
            Arc::new(MemoryOrganizationRegistry::new()),
            Arc::new(MemoryMembershipStore::new()),
            Arc::new(MemoryBlobStore::new()),
            Arc::new(StaticDatasourceCatalog::default()),
            BusinessEventPublisher::new(Arc::new(MemoryEventBus::new())),
        )
    }

    #[tokio::test]
    async fn test_create_makes_caller_admin() {
        let svc = service();
        let ctx = RequestContext::new(Uuid::now_v7());

        let view = svc.create(&ctx, "Acme").await.unwrap();
        assert_eq!(view.org_name, "Acme");
        assert_eq!(view.caller_role, MemberRole::Admin);

        let members = svc
            .list_members(&ctx, view.org_id, 0, None)
            .await
            .unwrap();
        assert_eq!(members.total, 1);
    }

    #[tokio::test]
    async fn test_member_cannot_update_profile() {
        let svc = service();
        let admin = RequestContext::new(Uuid::now_v7());
        let member = RequestContext::new(Uuid::now_v7());

        let view = svc.create(&admin, "Acme").await.unwrap();
        svc.add_member(&admin, view.org_id, member.user_id, MemberRole::Member)
            .await
            .unwrap();

        let patch = OrganizationPatch {
            name: Some("Evil Corp".into()),
            domains: None,
        };
        let err = svc.update(&member, view.org_id, patch).await.unwrap_err();
        assert!(matches!(err, OrgError::Forbidden));
    }

    #[tokio::test]
    async fn test_page_size_validation() {
        let svc = service();
        let ctx = RequestContext::new(Uuid::now_v7());
        let view = svc.create(&ctx, "Acme").await.unwrap();

        let err = svc
            .list_members(&ctx, view.org_id, 0, Some(0))
            .await
            .unwrap_err();
        assert!(matches!(err, OrgError::PageSizeOutOfRange(0)));

        let err = svc
            .list_members(&ctx, view.org_id, 0, Some(1001))
            .await
            .unwrap_err();
        assert!(matches!(err, OrgError::PageSizeOutOfRange(1001)));

        svc.list_members(&ctx, view.org_id, 0, Some(1000))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_logo_replace_deletes_old_blob() {
        let blobs = Arc::new(MemoryBlobStore::new());
        let svc = OrgService::new(
            Arc::new(MemoryOrganizationRegistry::new()),
            Arc::new(MemoryMembershipStore::new()),
            blobs.clone(),
            Arc::new(StaticDatasourceCatalog::default()),
            BusinessEventPublisher::new(Arc::new(MemoryEventBus::new())),
        );
        let ctx = RequestContext::new(Uuid::now_v7());
        let view = svc.create(&ctx, "Acme").await.unwrap();

        let first = svc.upload_logo(&ctx, view.org_id, vec![1]).await.unwrap();
        let second = svc.upload_logo(&ctx, view.org_id, vec![2]).await.unwrap();
        assert_ne!(first, second);
        assert_eq!(blobs.len().await, 1);

        svc.delete_logo(&ctx, view.org_id).await.unwrap();
        assert_eq!(blobs.len().await, 0);

        let err = svc.delete_logo(&ctx, view.org_id).await.unwrap_err();
        assert!(matches!(err, OrgError::NotFound));
    }

    #[tokio::test]
    async fn test_last_admin_cannot_leave_populated_org() {
        let svc = service();
        let admin = RequestContext::new(Uuid::now_v7());
        let member = RequestContext::new(Uuid::now_v7());

        let view = svc.create(&admin, "Acme").await.unwrap();
        svc.add_member(&admin, view.org_id, member.user_id, MemberRole::Member)
            .await
            .unwrap();

        let err = svc.leave_organization(&admin, view.org_id).await.unwrap_err();
        assert!(matches!(err, OrgError::LastAdminViolation));

        // Promote, then the original admin may leave
        svc.update_role_for_member(&admin, view.org_id, member.user_id, MemberRole::Admin)
            .await
            .unwrap();
        svc.leave_organization(&admin, view.org_id).await.unwrap();
    }

    #[tokio::test]
    async fn test_sole_member_can_leave() {
        let svc = service();
        let ctx = RequestContext::new(Uuid::now_v7());
        let view = svc.create(&ctx, "Solo").await.unwrap();

        svc.leave_organization(&ctx, view.org_id).await.unwrap();
        let err = svc
            .list_members(&ctx, view.org_id, 0, None)
            .await
            .unwrap_err();
        assert!(matches!(err, OrgError::NotAMember));
    }

    #[tokio::test]
    async fn test_group_views() {
        let svc = service();
        let admin = RequestContext::new(Uuid::now_v7()).with_locale(Locale::ZhCn);
        let member = RequestContext::new(Uuid::now_v7());

        let view = svc.create(&admin, "Acme").await.unwrap();
        svc.add_member(&admin, view.org_id, member.user_id, MemberRole::Member)
            .await
            .unwrap();

        let all = svc.all_members_group(&admin, view.org_id).await.unwrap();
        assert!(all.all_members_group);
        assert_eq!(all.member_count, 2);
        assert_eq!(all.group_name, "所有成员");

        let dev = svc.dev_group(&member, view.org_id).await.unwrap();
        assert!(dev.dev_group);
        assert_eq!(dev.member_count, 1);
    }

    #[tokio::test]
    async fn test_common_settings_rbac() {
        let svc = service();
        let admin = RequestContext::new(Uuid::now_v7());
        let member = RequestContext::new(Uuid::now_v7());

        let view = svc.create(&admin, "Acme").await.unwrap();
        svc.add_member(&admin, view.org_id, member.user_id, MemberRole::Member)
            .await
            .unwrap();

        let err = svc
            .update_org_common_settings(&member, view.org_id, "theme", "dark".into())
            .await
            .unwrap_err();
        assert!(matches!(err, OrgError::Forbidden));

        svc.update_org_common_settings(&admin, view.org_id, "theme", "dark".into())
            .await
            .unwrap();
        let value = svc
            .get_common_setting(&member, view.org_id, "theme")
            .await
            .unwrap();
        assert_eq!(value, Some("dark".into()));
    }

    #[tokio::test]
    async fn test_my_organizations_marks_current() {
        let svc = service();
        let ctx = RequestContext::new(Uuid::now_v7());

        let a = svc.create(&ctx, "Alpha").await.unwrap();
        let b = svc.create(&ctx, "Beta").await.unwrap();

        svc.switch_current_organization(&ctx, b.org_id, None)
            .await
            .unwrap();

        let summaries = svc.my_organizations(&ctx).await;
        assert_eq!(summaries.len(), 2);
        let alpha = summaries.iter().find(|s| s.id == a.org_id).unwrap();
        let beta = summaries.iter().find(|s| s.id == b.org_id).unwrap();
        assert!(!alpha.is_current);
        assert!(beta.is_current);
        assert_eq!(beta.member_count, 1);
    }

    #[tokio::test]
    async fn test_datasource_catalog_exposed() {
        let svc = service();
        let types = svc.supported_datasource_types();
        assert!(!types.is_empty());
    }
}
