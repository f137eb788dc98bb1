//! # Policy decisions
//!
//! Pure decision functions for membership mutations. Rejections are typed
//! values so the service facade can translate them into precise caller-facing
//! errors; nothing here touches storage or performs I/O.
//!
//! The last-admin arithmetic lives here as well and is consumed by the
//! membership store, so both sides agree on one definition of the invariant:
//! every organization with at least one member retains at least one admin.

use serde::{Deserialize, Serialize};
use tenant_org::MemberRole;

/// Why a policy check rejected an operation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// The actor's role is below the required role.
    RequiresAdmin,

    /// Non-admin actors may only remove themselves (leave).
    SelfRemovalOnly,

    /// The operation would leave a non-empty organization without an admin.
    WouldDropLastAdmin,
}

impl DenyReason {
    /// Stable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            DenyReason::RequiresAdmin => "REQUIRES_ADMIN",
            DenyReason::SelfRemovalOnly => "SELF_REMOVAL_ONLY",
            DenyReason::WouldDropLastAdmin => "LAST_ADMIN",
        }
    }
}

/// Can `actor` change a member's role from `target_current` to `target_new`?
///
/// Only admins may change roles. The last-admin consequence of a downgrade is
/// checked separately against live membership counts (see
/// [`downgrade_breaks_last_admin`]); this function decides role authority
/// alone. A no-op change (same role) is allowed for idempotent callers.
///
/// # Examples
///
/// ```
/// use tenant_org::MemberRole;
/// use tenant_policy::{can_change_role, DenyReason};
///
/// assert!(can_change_role(MemberRole::Admin, MemberRole::Member, MemberRole::Admin).is_ok());
/// assert_eq!(
///     can_change_role(MemberRole::Member, MemberRole::Member, MemberRole::Admin),
///     Err(DenyReason::RequiresAdmin)
/// );
/// ```
pub fn can_change_role(
    actor_role: MemberRole,
    _target_current: MemberRole,
    _target_new: MemberRole,
) -> Result<(), DenyReason> {
    if actor_role.is_admin() {
        Ok(())
    } else {
        Err(DenyReason::RequiresAdmin)
    }
}

/// Can `actor` remove a member from the organization?
///
/// Admins may remove anyone; a non-admin may remove only themselves (leave).
/// Whether the removal breaks the last-admin invariant is a separate check
/// against live counts (see [`removal_breaks_last_admin`]).
pub fn can_remove_member(actor_role: MemberRole, is_self_removal: bool) -> Result<(), DenyReason> {
    if actor_role.is_admin() || is_self_removal {
        Ok(())
    } else {
        Err(DenyReason::SelfRemovalOnly)
    }
}

/// Would changing the target's role to `new_role` leave the organization
/// without an admin?
///
/// `admin_count` is the current number of admins; `target_is_admin` tells
/// whether the member being changed is one of them.
pub fn downgrade_breaks_last_admin(
    admin_count: usize,
    target_is_admin: bool,
    new_role: MemberRole,
) -> bool {
    target_is_admin && !new_role.is_admin() && admin_count <= 1
}

/// Would removing the target leave a non-empty organization without an admin?
///
/// Removing the sole admin is allowed only when they are also the sole
/// member, in which case the organization becomes empty.
pub fn removal_breaks_last_admin(
    admin_count: usize,
    member_count: usize,
    target_is_admin: bool,
) -> bool {
    target_is_admin && admin_count <= 1 && member_count > 1
}
