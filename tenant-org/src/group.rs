//! Derived member groups
//!
//! Groups are read-only projections over the membership set, never stored
//! entities. Two groups exist per organization: the implicit "all members"
//! group and the privileged "dev" group (the admin subset). Group names are
//! locale-dependent, and the locale is always passed explicitly rather than
//! read from ambient state.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request-scoped locale for localized display strings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Locale {
    /// English
    En,
    /// Simplified Chinese
    ZhCn,
}

impl Default for Locale {
    fn default() -> Self {
        Self::En
    }
}

impl Locale {
    /// Parse a locale tag (BCP 47-ish, case-insensitive). Unknown tags fall
    /// back to English.
    pub fn parse(tag: &str) -> Self {
        match tag.to_lowercase().replace('-', "_").as_str() {
            "zh" | "zh_cn" => Self::ZhCn,
            _ => Self::En,
        }
    }
}

/// Which derived group a [`Group`] value denotes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    /// Every current member of the organization
    AllMembers,
    /// The elevated subset (currently the admin role set)
    Dev,
}

/// A derived group over an organization's membership.
///
/// Groups own no lifecycle: they are recomputed from live membership on every
/// read, so they always reflect the latest role assignments. The group id is
/// a well-known sentinel derived from the organization id.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use tenant_org::{Group, GroupKind, Locale};
///
/// let org_id = Uuid::now_v7();
/// let group = Group::all_members(org_id);
/// assert!(group.is_all_members());
/// assert_eq!(group.name(Locale::En), "All Members");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Group {
    /// Owning organization
    pub organization_id: Uuid,

    /// Which projection this group denotes
    pub kind: GroupKind,
}

impl Group {
    /// The implicit all-members group of an organization.
    pub fn all_members(organization_id: Uuid) -> Self {
        Self {
            organization_id,
            kind: GroupKind::AllMembers,
        }
    }

    /// The dev group (admin subset) of an organization.
    pub fn dev(organization_id: Uuid) -> Self {
        Self {
            organization_id,
            kind: GroupKind::Dev,
        }
    }

    /// Well-known sentinel id, org-scoped.
    pub fn id(&self) -> String {
        match self.kind {
            GroupKind::AllMembers => format!("all-members:{}", self.organization_id),
            GroupKind::Dev => format!("dev:{}", self.organization_id),
        }
    }

    /// Localized group name.
    pub fn name(&self, locale: Locale) -> &'static str {
        match (self.kind, locale) {
            (GroupKind::AllMembers, Locale::En) => "All Members",
            (GroupKind::AllMembers, Locale::ZhCn) => "所有成员",
            (GroupKind::Dev, Locale::En) => "Developers",
            (GroupKind::Dev, Locale::ZhCn) => "开发者",
        }
    }

    /// Whether this is the implicit all-members group.
    pub fn is_all_members(&self) -> bool {
        self.kind == GroupKind::AllMembers
    }

    /// Whether this is the dev group.
    pub fn is_dev(&self) -> bool {
        self.kind == GroupKind::Dev
    }
}
