//! In-memory membership store
//!
//! Memberships are kept as a join-ordered `Vec` per organization behind a
//! per-organization lock, so pagination is stable and the last-admin
//! invariant is always checked against a consistent view. The last-admin
//! arithmetic itself lives in `tenant-policy` so store and policy agree on
//! one definition.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use tenant_org::{MemberRole, OrgMember};
use tenant_policy::{downgrade_breaks_last_admin, removal_breaks_last_admin};

use super::{MemberPage, MembershipStore, StoreError, StoreResult, MAX_PAGE_SIZE};

/// In-memory implementation of [`MembershipStore`].
///
/// The outer map holds one lock per organization; mutations on a given
/// organization are serialized while cross-organization operations proceed
/// in parallel.
pub struct MemoryMembershipStore {
    orgs: RwLock<HashMap<Uuid, Arc<RwLock<Vec<OrgMember>>>>>,
}

impl std::fmt::Debug for MemoryMembershipStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryMembershipStore").finish()
    }
}

impl MemoryMembershipStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            orgs: RwLock::new(HashMap::new()),
        }
    }

    async fn slot(&self, org_id: Uuid) -> Option<Arc<RwLock<Vec<OrgMember>>>> {
        self.orgs.read().await.get(&org_id).cloned()
    }

    async fn slot_or_create(&self, org_id: Uuid) -> Arc<RwLock<Vec<OrgMember>>> {
        let mut orgs = self.orgs.write().await;
        orgs.entry(org_id)
            .or_insert_with(|| Arc::new(RwLock::new(Vec::new())))
            .clone()
    }
}

impl Default for MemoryMembershipStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MembershipStore for MemoryMembershipStore {
    async fn add_member(&self, member: OrgMember) -> StoreResult<()> {
        let slot = self.slot_or_create(member.organization_id).await;
        let mut members = slot.write().await;

        if members.iter().any(|m| m.user_id == member.user_id) {
            return Err(StoreError::AlreadyMember);
        }
        members.push(member);
        Ok(())
    }

    async fn set_role(&self, org_id: Uuid, user_id: Uuid, role: MemberRole) -> StoreResult<()> {
        let slot = self.slot(org_id).await.ok_or(StoreError::NotAMember)?;
        let mut members = slot.write().await;

        let admin_count = members.iter().filter(|m| m.is_admin()).count();
        let member = members
            .iter_mut()
            .find(|m| m.user_id == user_id)
            .ok_or(StoreError::NotAMember)?;

        if downgrade_breaks_last_admin(admin_count, member.is_admin(), role) {
            return Err(StoreError::LastAdminViolation);
        }
        member.role = role;
        Ok(())
    }

    async fn remove(&self, org_id: Uuid, user_id: Uuid) -> StoreResult<()> {
        let slot = self.slot(org_id).await.ok_or(StoreError::NotAMember)?;
        let mut members = slot.write().await;

        let target = members
            .iter()
            .find(|m| m.user_id == user_id)
            .ok_or(StoreError::NotAMember)?;

        let admin_count = members.iter().filter(|m| m.is_admin()).count();
        if removal_breaks_last_admin(admin_count, members.len(), target.is_admin()) {
            return Err(StoreError::LastAdminViolation);
        }
        members.retain(|m| m.user_id != user_id);
        Ok(())
    }

    async fn list_members(
        &self,
        org_id: Uuid,
        page: usize,
        page_size: usize,
    ) -> StoreResult<MemberPage> {
        let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        let members = self.members_of(org_id).await;
        let total = members.len();

        let start = page.saturating_mul(page_size).min(total);
        let end = start.saturating_add(page_size).min(total);

        Ok(MemberPage {
            members: members[start..end].to_vec(),
            total,
            page,
            page_size,
        })
    }

    async fn role_of(&self, org_id: Uuid, user_id: Uuid) -> StoreResult<MemberRole> {
        let slot = self.slot(org_id).await.ok_or(StoreError::NotAMember)?;
        let members = slot.read().await;
        members
            .iter()
            .find(|m| m.user_id == user_id)
            .map(|m| m.role)
            .ok_or(StoreError::NotAMember)
    }

    async fn members_of(&self, org_id: Uuid) -> Vec<OrgMember> {
        match self.slot(org_id).await {
            Some(slot) => slot.read().await.clone(),
            None => Vec::new(),
        }
    }

    async fn admin_count(&self, org_id: Uuid) -> usize {
        self.members_of(org_id)
            .await
            .iter()
            .filter(|m| m.is_admin())
            .count()
    }

    async fn member_count(&self, org_id: Uuid) -> usize {
        match self.slot(org_id).await {
            Some(slot) => slot.read().await.len(),
            None => 0,
        }
    }

    async fn orgs_of_user(&self, user_id: Uuid) -> Vec<(Uuid, MemberRole)> {
        let slots: Vec<(Uuid, Arc<RwLock<Vec<OrgMember>>>)> = self
            .orgs
            .read()
            .await
            .iter()
            .map(|(id, slot)| (*id, slot.clone()))
            .collect();

        let mut result = Vec::new();
        for (org_id, slot) in slots {
            let members = slot.read().await;
            if let Some(member) = members.iter().find(|m| m.user_id == user_id) {
                result.push((org_id, member.role));
            }
        }
        result
    }

    async fn purge_org(&self, org_id: Uuid) -> usize {
        let slot = self.orgs.write().await.remove(&org_id);
        match slot {
            Some(slot) => slot.read().await.len(),
            None => 0,
        }
    }
}
