//! # Tenant Events
//!
//! Business event publishing for the tenant platform.
//!
//! ## Overview
//!
//! The tenant-events crate handles:
//! - **Event Types**: A generic envelope plus typed session and organization
//!   events
//! - **Publisher**: The [`EventPublisher`] trait the core publishes through
//! - **Memory Bus**: An in-memory broadcast bus for single-process
//!   deployments and tests
//! - **Business Publisher**: The typed login/logout/org-event call surface
//!   consumed by the session switch protocol
//!
//! ## Ordering
//!
//! The organization switch protocol relies on publish outcomes for
//! sequencing: the logout event for the old session context must be accepted
//! before the current-organization pointer moves, and the login event for the
//! new context is initiated before the switch is reported successful. Any
//! [`EventPublisher`] implementation must therefore only return `Ok` once the
//! event has been accepted for delivery.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tenant_events::{BusinessEventPublisher, MemoryEventBus};
//! use uuid::Uuid;
//!
//! async fn example() {
//!     let bus = Arc::new(MemoryEventBus::new());
//!     let publisher = BusinessEventPublisher::new(bus);
//!
//!     let user_id = Uuid::now_v7();
//!     let org_id = Uuid::now_v7();
//!     publisher.publish_user_logout_event(user_id).await.unwrap();
//!     publisher.publish_user_login_event(user_id, org_id).await.unwrap();
//! }
//! ```

pub mod publisher;
pub mod types;

pub use publisher::{
    BusinessEventPublisher, EventPublisher, MemoryEventBus, PublishError, PublishResult,
    PublisherStats, Subscription,
};
pub use types::{Event, OrgEvent, SessionEvent};
