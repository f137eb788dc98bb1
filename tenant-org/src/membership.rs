//! Membership domain models
//!
//! This module provides the membership entity linking users to organizations.
//! A membership records a user's role and when they joined; at most one
//! membership may exist per (organization, user) pair.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::roles::MemberRole;

/// Organization membership linking a user to an organization.
///
/// The (organization_id, user_id) pair is unique; the membership store
/// rejects duplicate inserts.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use tenant_org::{MemberRole, OrgMember};
///
/// let org_id = Uuid::now_v7();
/// let user_id = Uuid::now_v7();
/// let member = OrgMember::new(org_id, user_id, MemberRole::Admin);
/// assert!(member.role.is_admin());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrgMember {
    /// Unique membership ID
    pub id: Uuid,

    /// Organization ID
    pub organization_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// Role within the organization
    pub role: MemberRole,

    /// When the user joined
    pub joined_at: DateTime<Utc>,

    /// Who invited this user (if applicable)
    pub invited_by: Option<Uuid>,
}

impl OrgMember {
    /// Creates a new membership with the current timestamp.
    ///
    /// # Arguments
    ///
    /// * `organization_id` - The organization ID
    /// * `user_id` - The user ID
    /// * `role` - The user's role in the organization
    pub fn new(organization_id: Uuid, user_id: Uuid, role: MemberRole) -> Self {
        Self {
            id: Uuid::now_v7(),
            organization_id,
            user_id,
            role,
            joined_at: Utc::now(),
            invited_by: None,
        }
    }

    /// Set who invited this user.
    pub fn with_inviter(mut self, inviter_id: Uuid) -> Self {
        self.invited_by = Some(inviter_id);
        self
    }

    /// Check if this member holds admin privileges.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
