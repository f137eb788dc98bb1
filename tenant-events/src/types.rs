//! Business event types
//!
//! This module defines the event envelope and the typed session and
//! organization events the platform publishes. Listeners subscribe by topic
//! (the event type string).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tenant_org::MemberRole;
use uuid::Uuid;

/// Business event envelope.
///
/// All events are wrapped in this envelope which provides metadata for
/// routing, tracing, and processing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique event ID
    pub id: Uuid,

    /// Event type (e.g., "session.user_logged_out", "org.member_removed")
    pub event_type: String,

    /// Timestamp when event was created
    pub timestamp: DateTime<Utc>,

    /// Organization context
    pub org_id: Option<Uuid>,

    /// User who triggered the event
    pub user_id: Option<Uuid>,

    /// Event payload
    pub payload: serde_json::Value,

    /// Additional metadata
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Event {
    /// Create a new event.
    pub fn new(event_type: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::now_v7(),
            event_type: event_type.into(),
            timestamp: Utc::now(),
            org_id: None,
            user_id: None,
            payload,
            metadata: HashMap::new(),
        }
    }

    /// Set organization context.
    pub fn with_org(mut self, org_id: Uuid) -> Self {
        self.org_id = Some(org_id);
        self
    }

    /// Set user context.
    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Add metadata.
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// The topic this event is delivered on. Topics equal the event type.
    pub fn topic(&self) -> &str {
        &self.event_type
    }

    /// Parse the payload into a specific type.
    pub fn parse_payload<T: for<'de> Deserialize<'de>>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }
}

/// Session lifecycle events.
///
/// The organization switch protocol publishes a logout for the old context
/// strictly before the login for the new one, so listeners that clean up
/// stale session state always run first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// The user's session context was torn down.
    UserLoggedOut { user_id: Uuid },

    /// The user's session is now scoped to an organization.
    UserLoggedIn { user_id: Uuid, org_id: Uuid },
}

impl SessionEvent {
    /// Convert to the generic envelope.
    pub fn to_event(&self) -> Event {
        match self {
            SessionEvent::UserLoggedOut { user_id } => {
                Event::new("session.user_logged_out", payload_of(self)).with_user(*user_id)
            }
            SessionEvent::UserLoggedIn { user_id, org_id } => {
                Event::new("session.user_logged_in", payload_of(self))
                    .with_user(*user_id)
                    .with_org(*org_id)
            }
        }
    }
}

/// Organization lifecycle and membership events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrgEvent {
    /// Organization was created
    Created { org_id: Uuid, name: String },

    /// Organization was removed (memberships and domain bindings cascaded)
    Removed { org_id: Uuid },

    /// A member was added
    MemberAdded {
        org_id: Uuid,
        member_id: Uuid,
        role: MemberRole,
    },

    /// A member's role changed
    MemberRoleChanged {
        org_id: Uuid,
        member_id: Uuid,
        role: MemberRole,
    },

    /// A member was removed by an admin
    MemberRemoved { org_id: Uuid, member_id: Uuid },

    /// A member left of their own accord
    MemberLeft { org_id: Uuid, member_id: Uuid },
}

impl OrgEvent {
    /// Convert to the generic envelope.
    pub fn to_event(&self) -> Event {
        let (event_type, org_id) = match self {
            OrgEvent::Created { org_id, .. } => ("org.created", *org_id),
            OrgEvent::Removed { org_id } => ("org.removed", *org_id),
            OrgEvent::MemberAdded { org_id, .. } => ("org.member_added", *org_id),
            OrgEvent::MemberRoleChanged { org_id, .. } => ("org.member_role_changed", *org_id),
            OrgEvent::MemberRemoved { org_id, .. } => ("org.member_removed", *org_id),
            OrgEvent::MemberLeft { org_id, .. } => ("org.member_left", *org_id),
        };
        Event::new(event_type, payload_of(self)).with_org(org_id)
    }
}

fn payload_of<T: Serialize>(value: &T) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or(serde_json::Value::Null)
}
