//! Caller-facing views
//!
//! Views are built from domain models plus the request-scoped context
//! (locale, acting user). That context is always passed explicitly into view
//! construction rather than read from ambient state.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::store::MemberPage;
use tenant_org::{Group, Locale, MemberRole, Organization, OrgMember};

/// Request-scoped caller context.
///
/// Carries the authenticated user identity and locale through every call
/// boundary. This core does not authenticate; it trusts the identity the
/// transport layer resolved.
#[derive(Debug, Clone, Copy)]
pub struct RequestContext {
    /// The authenticated acting user
    pub user_id: Uuid,

    /// Locale for localized display strings
    pub locale: Locale,
}

impl RequestContext {
    /// Context with the default locale.
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            locale: Locale::default(),
        }
    }

    /// Override the locale.
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }
}

/// Organization view returned to callers.
#[derive(Debug, Clone, Serialize)]
pub struct OrgView {
    /// Organization ID
    pub org_id: Uuid,
    /// Organization name
    pub org_name: String,
    /// Logo reference, if set
    pub logo_ref: Option<String>,
    /// The caller's role in the organization
    pub caller_role: MemberRole,
}

impl OrgView {
    /// Build from an organization snapshot and the caller's role.
    pub fn from_org(org: &Organization, caller_role: MemberRole) -> Self {
        Self {
            org_id: org.id,
            org_name: org.name.clone(),
            logo_ref: org.logo_ref.clone(),
            caller_role,
        }
    }
}

/// One member in a member list.
#[derive(Debug, Clone, Serialize)]
pub struct OrgMemberView {
    /// User ID
    pub user_id: Uuid,
    /// Member role
    pub role: MemberRole,
    /// When the user joined
    pub joined_at: DateTime<Utc>,
}

impl From<&OrgMember> for OrgMemberView {
    fn from(member: &OrgMember) -> Self {
        Self {
            user_id: member.user_id,
            role: member.role,
            joined_at: member.joined_at,
        }
    }
}

/// A page of an organization's member list with the total count.
#[derive(Debug, Clone, Serialize)]
pub struct OrgMemberListView {
    /// Members on this page, in join order
    pub members: Vec<OrgMemberView>,
    /// Total membership count for client-side pagination
    pub total: usize,
    /// Zero-based page index
    pub page: usize,
    /// Effective page size
    pub page_size: usize,
}

impl From<MemberPage> for OrgMemberListView {
    fn from(page: MemberPage) -> Self {
        Self {
            members: page.members.iter().map(OrgMemberView::from).collect(),
            total: page.total,
            page: page.page,
            page_size: page.page_size,
        }
    }
}

/// A derived group with its live member count.
#[derive(Debug, Clone, Serialize)]
pub struct GroupView {
    /// Well-known sentinel id, org-scoped
    pub group_id: String,
    /// Localized group name
    pub group_name: String,
    /// Whether this is the implicit all-members group
    pub all_members_group: bool,
    /// Whether this is the dev group
    pub dev_group: bool,
    /// Live member count at resolution time
    pub member_count: usize,
}

impl GroupView {
    /// Build from a derived group, its live count, and the request locale.
    pub fn from_group(group: &Group, member_count: usize, locale: Locale) -> Self {
        Self {
            group_id: group.id(),
            group_name: group.name(locale).to_string(),
            all_members_group: group.is_all_members(),
            dev_group: group.is_dev(),
            member_count,
        }
    }
}

/// Informational result when a referrer domain resolves to a different
/// organization than the one just switched into.
///
/// This is a UX nudge toward the domain-bound organization, never an
/// authorization decision.
#[derive(Debug, Clone, Serialize)]
pub struct DomainCheckView {
    /// The referrer domain that was checked
    pub domain: String,
    /// The organization the domain is bound to
    pub organization_id: Uuid,
    /// That organization's display name
    pub organization_name: String,
}

/// One entry of the static role catalog.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RoleDescription {
    /// Wire value of the role
    pub key: &'static str,
    /// Localized display name
    pub value: &'static str,
}

/// The static role catalog in the given locale.
pub fn role_descriptions(locale: Locale) -> Vec<RoleDescription> {
    [MemberRole::Member, MemberRole::Admin]
        .iter()
        .map(|role| RoleDescription {
            key: role.as_str(),
            value: role.display_name(locale),
        })
        .collect()
}
