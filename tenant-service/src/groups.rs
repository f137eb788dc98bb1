//! Group resolution
//!
//! Groups are read-only projections over the membership store. Every call
//! re-derives the projection from current store contents; nothing is cached,
//! so group membership always reflects the latest role assignments.

use std::sync::Arc;
use uuid::Uuid;

use crate::store::MembershipStore;
use crate::views::GroupView;
use tenant_org::{Group, Locale};

/// Derives the all-members and dev groups from live membership data.
#[derive(Clone)]
pub struct GroupResolver {
    membership: Arc<dyn MembershipStore>,
}

impl std::fmt::Debug for GroupResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupResolver").finish()
    }
}

impl GroupResolver {
    /// Create a resolver over a membership store.
    pub fn new(membership: Arc<dyn MembershipStore>) -> Self {
        Self { membership }
    }

    /// The implicit all-members group, counted from the live member set.
    pub async fn all_members_group(&self, org_id: Uuid, locale: Locale) -> GroupView {
        let count = self.membership.member_count(org_id).await;
        GroupView::from_group(&Group::all_members(org_id), count, locale)
    }

    /// The dev group, counted from the live admin subset.
    pub async fn dev_group(&self, org_id: Uuid, locale: Locale) -> GroupView {
        let count = self.membership.admin_count(org_id).await;
        GroupView::from_group(&Group::dev(org_id), count, locale)
    }
}
