//! Organization domain models
//!
//! This module provides the core Organization entity. Organizations are the
//! tenant boundary of the platform: they own members, common settings, an
//! optional logo, and zero or more bound custom domains.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::settings::CommonSettings;

/// An organization represents a tenant in the multi-tenant system.
///
/// Users can belong to multiple organizations with different roles. Each
/// organization has its own common settings, members, and custom domains.
/// An organization is never created member-less: the creating user becomes
/// its first admin.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use tenant_org::Organization;
///
/// let creator_id = Uuid::now_v7();
/// let org = Organization::new("Acme Corp", creator_id);
/// assert_eq!(org.name, "Acme Corp");
/// assert!(org.is_active);
/// assert!(org.domains.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    /// Unique identifier for the organization
    pub id: Uuid,

    /// Human-readable name
    pub name: String,

    /// Logo reference (externally stored blob id)
    pub logo_ref: Option<String>,

    /// Custom domains bound to this organization.
    ///
    /// Each domain string maps to at most one organization platform-wide;
    /// the registry enforces uniqueness. Bindings are a tenant-resolution
    /// hint for login flows, never an authorization source.
    #[serde(default)]
    pub domains: Vec<String>,

    /// Arbitrary key-value common settings (locale, branding flags, ...)
    #[serde(default)]
    pub common_settings: CommonSettings,

    /// The user who created the organization
    pub creator_id: Uuid,

    /// Whether the organization is active
    pub is_active: bool,

    /// When the organization was created
    pub created_at: DateTime<Utc>,

    /// When the organization was last updated
    pub updated_at: DateTime<Utc>,
}

impl Organization {
    /// Creates a new organization.
    ///
    /// The organization is created with a newly generated UUID v7 id, active
    /// status, empty settings and no bound domains. Callers are responsible
    /// for adding the creator as the first admin member.
    ///
    /// # Arguments
    ///
    /// * `name` - The organization name
    /// * `creator_id` - The user ID who created this organization
    pub fn new(name: impl Into<String>, creator_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            logo_ref: None,
            domains: Vec::new(),
            common_settings: CommonSettings::default(),
            creator_id,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update to the editable fields.
    ///
    /// Absent patch fields leave the current value untouched. Updates the
    /// `updated_at` timestamp when anything changed.
    ///
    /// # Examples
    ///
    /// ```
    /// use uuid::Uuid;
    /// use tenant_org::{Organization, OrganizationPatch};
    ///
    /// let mut org = Organization::new("Acme", Uuid::now_v7());
    /// org.apply_patch(OrganizationPatch {
    ///     name: Some("Acme Corp".to_string()),
    ///     ..Default::default()
    /// });
    /// assert_eq!(org.name, "Acme Corp");
    /// ```
    pub fn apply_patch(&mut self, patch: OrganizationPatch) -> bool {
        let mut changed = false;
        if let Some(name) = patch.name {
            self.name = name;
            changed = true;
        }
        if let Some(domains) = patch.domains {
            self.domains = domains;
            changed = true;
        }
        if changed {
            self.updated_at = Utc::now();
        }
        changed
    }

    /// Check whether a domain is bound to this organization.
    pub fn owns_domain(&self, domain: &str) -> bool {
        self.domains.iter().any(|d| d == domain)
    }
}

/// Partial update for an organization's editable fields.
///
/// `None` means "leave unchanged". Domains set through a patch replace the
/// full binding set; the registry re-indexes accordingly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrganizationPatch {
    /// New display name
    pub name: Option<String>,

    /// Replacement set of bound custom domains
    pub domains: Option<Vec<String>>,
}

/// Summary of an organization for list displays.
///
/// Lightweight representation carrying the viewing user's role and an
/// aggregated member count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationSummary {
    /// Organization ID
    pub id: Uuid,

    /// Organization name
    pub name: String,

    /// Logo reference
    pub logo_ref: Option<String>,

    /// The viewing user's role in this organization
    pub user_role: crate::roles::MemberRole,

    /// Number of members
    pub member_count: u32,

    /// Whether this is the user's current organization
    pub is_current: bool,
}
