//! # Organization actions
//!
//! Defines the operations callers can perform against an organization and the
//! minimum role each one requires.

use serde::{Deserialize, Serialize};
use tenant_org::MemberRole;

use crate::decision::DenyReason;

/// Operations performed against an organization.
///
/// Each action maps to a minimum required role; `authorize` checks an actor's
/// role against it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OrgAction {
    /// View the member list and derived groups.
    ViewMembers,

    /// Update the organization profile (name, logo, domains).
    UpdateProfile,

    /// Add, remove, or change the role of members.
    ManageMembers,

    /// Read or write the organization's common settings.
    ManageSettings,

    /// Remove the organization entirely.
    RemoveOrganization,
}

impl OrgAction {
    /// The minimum role required to perform this action.
    ///
    /// Viewing members is open to every member; everything mutating requires
    /// admin.
    pub fn required_role(&self) -> MemberRole {
        match self {
            OrgAction::ViewMembers => MemberRole::Member,
            OrgAction::UpdateProfile
            | OrgAction::ManageMembers
            | OrgAction::ManageSettings
            | OrgAction::RemoveOrganization => MemberRole::Admin,
        }
    }

    /// Get the string representation of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrgAction::ViewMembers => "view_members",
            OrgAction::UpdateProfile => "update_profile",
            OrgAction::ManageMembers => "manage_members",
            OrgAction::ManageSettings => "manage_settings",
            OrgAction::RemoveOrganization => "remove_organization",
        }
    }
}

/// Check that an actor's role suffices for an action.
///
/// # Examples
///
/// ```
/// use tenant_org::MemberRole;
/// use tenant_policy::{authorize, OrgAction};
///
/// assert!(authorize(MemberRole::Admin, OrgAction::ManageMembers).is_ok());
/// assert!(authorize(MemberRole::Member, OrgAction::ManageMembers).is_err());
/// assert!(authorize(MemberRole::Member, OrgAction::ViewMembers).is_ok());
/// ```
pub fn authorize(actor_role: MemberRole, action: OrgAction) -> Result<(), DenyReason> {
    if actor_role >= action.required_role() {
        Ok(())
    } else {
        Err(DenyReason::RequiresAdmin)
    }
}
