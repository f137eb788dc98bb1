//! User context for organization switching
//!
//! This module provides the UserContext type that tracks which organization a
//! user's active session is scoped to, along with recent access history and a
//! default organization for new sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of recently accessed organizations kept per user.
const MAX_RECENT: usize = 10;

/// A user's current working context (selected organization).
///
/// This is session-scoped state: exactly one (or no) organization is active
/// per user at a time, and a switch overwrites the pointer atomically. The
/// type is serializable so callers may persist it as a user preference, but
/// it is not part of the durable organization or membership records.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use tenant_org::UserContext;
///
/// let user_id = Uuid::now_v7();
/// let mut ctx = UserContext::new(user_id);
///
/// let org_id = Uuid::now_v7();
/// ctx.switch_organization(org_id);
/// assert_eq!(ctx.current_organization_id, Some(org_id));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserContext {
    /// User ID
    pub user_id: Uuid,

    /// Currently selected organization
    pub current_organization_id: Option<Uuid>,

    /// Recently accessed organizations (most recent first)
    #[serde(default)]
    pub recent_organizations: Vec<Uuid>,

    /// Default organization for new sessions
    pub default_organization_id: Option<Uuid>,

    /// Last updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl UserContext {
    /// Creates a new user context with no selected organization.
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            current_organization_id: None,
            recent_organizations: Vec::new(),
            default_organization_id: None,
            updated_at: Utc::now(),
        }
    }

    /// Switch to a different organization.
    ///
    /// Overwrites the current pointer, records the organization in the recent
    /// history, and updates the timestamp. Membership validation happens
    /// before this call; the context itself holds no authorization state.
    pub fn switch_organization(&mut self, org_id: Uuid) {
        self.current_organization_id = Some(org_id);
        self.add_recent_organization(org_id);
        self.updated_at = Utc::now();
    }

    /// Set the default organization used when a new session starts.
    pub fn set_default_organization(&mut self, org_id: Uuid) {
        self.default_organization_id = Some(org_id);
        self.updated_at = Utc::now();
    }

    /// Clear the current organization pointer.
    ///
    /// Used on logout and when the active organization is removed.
    pub fn clear_context(&mut self) {
        self.current_organization_id = None;
        self.updated_at = Utc::now();
    }

    /// Drop every reference to an organization from this context.
    ///
    /// Called when an organization is removed so the pointer and history
    /// never name a dead tenant.
    pub fn forget_organization(&mut self, org_id: Uuid) {
        if self.current_organization_id == Some(org_id) {
            self.current_organization_id = None;
        }
        if self.default_organization_id == Some(org_id) {
            self.default_organization_id = None;
        }
        self.recent_organizations.retain(|id| *id != org_id);
        self.updated_at = Utc::now();
    }

    /// Get the most recent organizations, most recent first.
    pub fn get_recent_organizations(&self, limit: usize) -> &[Uuid] {
        let end = limit.min(self.recent_organizations.len());
        &self.recent_organizations[..end]
    }

    fn add_recent_organization(&mut self, org_id: Uuid) {
        self.recent_organizations.retain(|id| *id != org_id);
        self.recent_organizations.insert(0, org_id);
        self.recent_organizations.truncate(MAX_RECENT);
    }
}
