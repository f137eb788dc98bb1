//! Event publisher implementations
//!
//! This module provides the publisher abstraction the core publishes business
//! events through, an in-memory bus suitable for single-process deployments
//! and tests, and the [`BusinessEventPublisher`] convenience surface the
//! session switch protocol calls.

use crate::types::{Event, OrgEvent, SessionEvent};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

/// Event publishing error types.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Failed to publish event
    #[error("Failed to publish event: {0}")]
    Publish(String),

    /// Failed to subscribe
    #[error("Failed to subscribe: {0}")]
    Subscribe(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Channel closed
    #[error("Channel closed")]
    ChannelClosed,
}

/// Result type for publisher operations.
pub type PublishResult<T> = Result<T, PublishError>;

/// Event publisher trait.
///
/// The core only requires `publish`; delivery and retry semantics beyond the
/// returned outcome are the implementation's concern.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an event. The outcome must reflect whether the event was
    /// accepted for delivery, since the switch protocol sequences on it.
    async fn publish(&self, event: Event) -> PublishResult<()>;
}

/// Subscription handle for receiving events from the in-memory bus.
pub struct Subscription {
    /// Subscription ID
    pub id: String,
    /// Topic pattern
    pub topic: String,
    /// Event receiver
    pub receiver: broadcast::Receiver<Event>,
}

impl Subscription {
    /// Receive the next event.
    pub async fn recv(&mut self) -> PublishResult<Event> {
        self.receiver
            .recv()
            .await
            .map_err(|_| PublishError::ChannelClosed)
    }
}

/// Publisher statistics.
#[derive(Debug, Clone, Default)]
pub struct PublisherStats {
    /// Total events published
    pub events_published: u64,
    /// Active subscriptions
    pub active_subscriptions: usize,
}

/// In-memory event bus.
///
/// Suitable for single-process deployments and tests. Subscribers register a
/// topic pattern; a trailing `*` matches any suffix (`"session.*"` matches
/// both session events).
pub struct MemoryEventBus {
    /// Topic subscribers
    subscribers: Arc<RwLock<HashMap<String, broadcast::Sender<Event>>>>,
    /// Statistics
    stats: Arc<RwLock<PublisherStats>>,
    /// Channel capacity for new topics
    channel_capacity: usize,
}

impl std::fmt::Debug for MemoryEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryEventBus")
            .field("channel_capacity", &self.channel_capacity)
            .finish()
    }
}

impl MemoryEventBus {
    /// Create a new in-memory event bus.
    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    /// Create with custom channel capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            subscribers: Arc::new(RwLock::new(HashMap::new())),
            stats: Arc::new(RwLock::new(PublisherStats::default())),
            channel_capacity: capacity,
        }
    }

    /// Subscribe to a topic pattern.
    ///
    /// A pattern either names a topic exactly or ends in `*`, which matches
    /// any suffix.
    pub async fn subscribe(&self, topic: &str) -> PublishResult<Subscription> {
        let id = Uuid::now_v7().to_string();

        let receiver = {
            let mut subscribers = self.subscribers.write().await;
            if let Some(sender) = subscribers.get(topic) {
                sender.subscribe()
            } else {
                let (sender, receiver) = broadcast::channel(self.channel_capacity);
                subscribers.insert(topic.to_string(), sender);
                receiver
            }
        };

        {
            let mut stats = self.stats.write().await;
            stats.active_subscriptions += 1;
        }

        Ok(Subscription {
            id,
            topic: topic.to_string(),
            receiver,
        })
    }

    /// Get publisher stats.
    pub async fn stats(&self) -> PublisherStats {
        self.stats.read().await.clone()
    }

    fn topic_matches(pattern: &str, topic: &str) -> bool {
        match pattern.strip_suffix('*') {
            Some(prefix) => topic.starts_with(prefix),
            None => pattern == topic,
        }
    }
}

impl Default for MemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for MemoryEventBus {
    async fn publish(&self, event: Event) -> PublishResult<()> {
        {
            let mut stats = self.stats.write().await;
            stats.events_published += 1;
        }

        let subscribers = self.subscribers.read().await;
        for (pattern, sender) in subscribers.iter() {
            if Self::topic_matches(pattern, event.topic()) {
                // A send error only means no live receivers on this topic.
                let _ = sender.send(event.clone());
            }
        }

        tracing::debug!(topic = %event.topic(), event_id = %event.id, "event published");
        Ok(())
    }
}

/// Convenience surface for the business events the core emits.
///
/// Wraps any [`EventPublisher`] with the typed calls the session switch
/// protocol and the service facade make.
#[derive(Clone)]
pub struct BusinessEventPublisher {
    inner: Arc<dyn EventPublisher>,
}

impl std::fmt::Debug for BusinessEventPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BusinessEventPublisher").finish()
    }
}

impl BusinessEventPublisher {
    /// Wrap a publisher.
    pub fn new(inner: Arc<dyn EventPublisher>) -> Self {
        Self { inner }
    }

    /// Publish the logout event for a user's current session context.
    pub async fn publish_user_logout_event(&self, user_id: Uuid) -> PublishResult<()> {
        self.inner
            .publish(SessionEvent::UserLoggedOut { user_id }.to_event())
            .await
    }

    /// Publish the login event for a user's new session context.
    pub async fn publish_user_login_event(&self, user_id: Uuid, org_id: Uuid) -> PublishResult<()> {
        self.inner
            .publish(SessionEvent::UserLoggedIn { user_id, org_id }.to_event())
            .await
    }

    /// Publish an organization lifecycle or membership event.
    pub async fn publish_org_event(&self, event: OrgEvent) -> PublishResult<()> {
        self.inner.publish(event.to_event()).await
    }
}
