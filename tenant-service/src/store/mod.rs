//! Durable stores for memberships and organization records
//!
//! The store traits are the seam between the service layer and persistence.
//! The in-memory implementations here serialize mutations per organization
//! (an outer map of per-organization locks), so invariant checks always run
//! against a consistent view while cross-organization operations proceed in
//! parallel.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use tenant_org::{MemberRole, Organization, OrganizationPatch, OrgMember};

pub mod membership;
pub mod registry;

pub use membership::MemoryMembershipStore;
pub use registry::MemoryOrganizationRegistry;

/// Upper bound on `list_members` page size.
pub const MAX_PAGE_SIZE: usize = 1000;

/// Storage-layer error types.
///
/// `Conflict` models a transient write conflict (retried once at the service
/// boundary); everything else is deterministic and surfaced immediately.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Organization record unknown
    #[error("organization not found")]
    NotFound,

    /// No membership for the (organization, user) pair
    #[error("no membership for the user in this organization")]
    NotAMember,

    /// A membership for the pair already exists
    #[error("membership already exists")]
    AlreadyMember,

    /// Mutation would leave a non-empty organization without an admin
    #[error("organization would be left without an admin")]
    LastAdminViolation,

    /// Domain already bound to another organization
    #[error("domain {0} already bound")]
    DomainTaken(String),

    /// Transient write conflict
    #[error("write conflict: {0}")]
    Conflict(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// One page of an organization's member list.
#[derive(Debug, Clone, Serialize)]
pub struct MemberPage {
    /// Members on this page, in join order
    pub members: Vec<OrgMember>,
    /// Total membership count of the organization
    pub total: usize,
    /// Zero-based page index
    pub page: usize,
    /// Effective page size after clamping
    pub page_size: usize,
}

/// Durable mapping of (organization, user) to role.
///
/// Implementations must serialize mutations per organization so the
/// last-admin invariant is checked against a consistent view.
#[async_trait]
pub trait MembershipStore: Send + Sync {
    /// Insert a membership. Fails with `AlreadyMember` if the
    /// (organization, user) pair exists.
    async fn add_member(&self, member: OrgMember) -> StoreResult<()>;

    /// Overwrite a member's role. Fails with `NotAMember` if absent and
    /// `LastAdminViolation` if this would leave the organization with zero
    /// admins.
    async fn set_role(&self, org_id: Uuid, user_id: Uuid, role: MemberRole) -> StoreResult<()>;

    /// Remove a membership. Fails with `NotAMember` if absent, and with
    /// `LastAdminViolation` when removing the sole admin while other members
    /// remain. Removing the sole member leaves the organization member-less.
    async fn remove(&self, org_id: Uuid, user_id: Uuid) -> StoreResult<()>;

    /// A stable, join-ordered page of members with the total count.
    /// `page` is zero-based; `page_size` is clamped to `1..=MAX_PAGE_SIZE`.
    async fn list_members(
        &self,
        org_id: Uuid,
        page: usize,
        page_size: usize,
    ) -> StoreResult<MemberPage>;

    /// The member's role, or `NotAMember`.
    async fn role_of(&self, org_id: Uuid, user_id: Uuid) -> StoreResult<MemberRole>;

    /// Snapshot of the full membership set, in join order.
    async fn members_of(&self, org_id: Uuid) -> Vec<OrgMember>;

    /// Number of members holding the admin role.
    async fn admin_count(&self, org_id: Uuid) -> usize;

    /// Total member count.
    async fn member_count(&self, org_id: Uuid) -> usize;

    /// Organizations the user belongs to, with their role in each.
    async fn orgs_of_user(&self, user_id: Uuid) -> Vec<(Uuid, MemberRole)>;

    /// Remove every membership of an organization (cascade hook for
    /// organization removal). Returns the number removed.
    async fn purge_org(&self, org_id: Uuid) -> usize;
}

/// Durable organization records plus domain bindings and common settings.
#[async_trait]
pub trait OrganizationRegistry: Send + Sync {
    /// Insert a new organization record.
    async fn create(&self, org: Organization) -> StoreResult<()>;

    /// Snapshot of an organization record.
    async fn get(&self, org_id: Uuid) -> StoreResult<Organization>;

    /// Apply a partial update, re-indexing domain bindings when the patch
    /// replaces them. Returns the updated snapshot.
    async fn update(&self, org_id: Uuid, patch: OrganizationPatch) -> StoreResult<Organization>;

    /// Replace or clear the logo reference, returning the previous one.
    async fn set_logo(&self, org_id: Uuid, logo_ref: Option<String>)
        -> StoreResult<Option<String>>;

    /// Remove the organization and all of its domain bindings, returning the
    /// removed snapshot. Irreversible.
    async fn remove(&self, org_id: Uuid) -> StoreResult<Organization>;

    /// Read a common setting; `None` when absent (not an error).
    async fn get_common_setting(
        &self,
        org_id: Uuid,
        key: &str,
    ) -> StoreResult<Option<serde_json::Value>>;

    /// Write a common setting.
    async fn set_common_setting(
        &self,
        org_id: Uuid,
        key: &str,
        value: serde_json::Value,
    ) -> StoreResult<()>;

    /// Bind a domain to the organization. Fails with `DomainTaken` when the
    /// domain is bound to a different organization.
    async fn bind_domain(&self, org_id: Uuid, domain: &str) -> StoreResult<()>;

    /// Remove a domain binding if it belongs to the organization.
    async fn unbind_domain(&self, org_id: Uuid, domain: &str) -> StoreResult<()>;

    /// Resolve a domain to its bound organization; `None` when unbound.
    /// O(1) amortized, this runs on the login hot path.
    async fn resolve_domain(&self, domain: &str) -> Option<Uuid>;
}
