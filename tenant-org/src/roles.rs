//! Member roles
//!
//! This module defines the organization role hierarchy. The platform uses a
//! strictly ordered two-level model: every member holds exactly one role, and
//! `Admin` is a superset of `Member` privileges.

use serde::{Deserialize, Serialize};

use crate::group::Locale;

/// A user's role within an organization.
///
/// Roles are hierarchical: `Member < Admin`. `Admin` carries every `Member`
/// privilege plus member management, settings, and organization removal.
///
/// # Examples
///
/// ```
/// use tenant_org::MemberRole;
///
/// assert!(MemberRole::Admin > MemberRole::Member);
/// assert!(MemberRole::Admin.is_admin());
/// assert!(!MemberRole::Member.is_admin());
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    /// Regular organization member
    Member = 0,

    /// Organization administrator
    Admin = 1,
}

impl MemberRole {
    /// Check if this role carries admin privileges.
    pub fn is_admin(&self) -> bool {
        *self >= MemberRole::Admin
    }

    /// Parse a role from its string representation (case-insensitive).
    ///
    /// # Examples
    ///
    /// ```
    /// use tenant_org::MemberRole;
    ///
    /// assert_eq!(MemberRole::parse("admin"), Some(MemberRole::Admin));
    /// assert_eq!(MemberRole::parse("MEMBER"), Some(MemberRole::Member));
    /// assert_eq!(MemberRole::parse("owner"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "member" => Some(Self::Member),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Get the wire string representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Admin => "admin",
        }
    }

    /// Get a human-readable display name for the role in the given locale.
    ///
    /// # Examples
    ///
    /// ```
    /// use tenant_org::{Locale, MemberRole};
    ///
    /// assert_eq!(MemberRole::Admin.display_name(Locale::En), "Organization Admin");
    /// assert_eq!(MemberRole::Member.display_name(Locale::ZhCn), "企业成员");
    /// ```
    pub fn display_name(&self, locale: Locale) -> &'static str {
        match (self, locale) {
            (Self::Member, Locale::En) => "Organization Member",
            (Self::Member, Locale::ZhCn) => "企业成员",
            (Self::Admin, Locale::En) => "Organization Admin",
            (Self::Admin, Locale::ZhCn) => "企业管理员",
        }
    }
}

impl Default for MemberRole {
    fn default() -> Self {
        Self::Member
    }
}
