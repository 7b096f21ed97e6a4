//! Event Bus implementation.
//!
//! Provides the core EventBus struct. Instances are created by the
//! application and shared through [`crate::types::SharedBus`].

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

use super::events::{AppEvent, EventCategory};

/// Subscription handle for unsubscribing from events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    /// Create a new unique subscription ID
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", &self.0.to_string()[..8])
    }
}

/// Filter to receive only specific event types
#[derive(Debug, Clone, Default)]
pub enum EventFilter {
    /// Receive all events.
    #[default]
    All,
    /// Receive events matching any of these categories.
    Categories(Vec<EventCategory>),
}

impl EventFilter {
    /// Check if an event matches this filter
    pub fn matches(&self, event: &AppEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Categories(categories) => categories.contains(&event.category()),
        }
    }
}

type EventHandler = Arc<dyn Fn(AppEvent) + Send + Sync>;

/// Configuration for the event bus
#[derive(Debug, Clone)]
pub struct EventBusConfig {
    /// Channel capacity for broadcast.
    pub channel_capacity: usize,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 256,
        }
    }
}

/// Error types for event bus operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum EventBusError {
    /// No subscribers are listening
    #[error("No active subscribers")]
    NoSubscribers,
    /// Channel is closed
    #[error("Event channel is closed")]
    ChannelClosed,
}

/// Event bus for application-wide change notification
pub struct EventBus {
    sender: broadcast::Sender<AppEvent>,
    handlers: RwLock<HashMap<SubscriptionId, (EventFilter, EventHandler)>>,
    config: EventBusConfig,
}

impl EventBus {
    /// Create a new event bus with default configuration
    pub fn new() -> Self {
        Self::with_config(EventBusConfig::default())
    }

    /// Create a new event bus with custom configuration
    pub fn with_config(config: EventBusConfig) -> Self {
        let (sender, _) = broadcast::channel(config.channel_capacity);
        Self {
            sender,
            handlers: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Publish an event to all subscribers
    ///
    /// Synchronous handlers run on the calling thread before this returns.
    /// Handlers are invoked without the subscription table locked, so a
    /// handler may publish or subscribe itself.
    ///
    /// Returns the number of broadcast receivers that will see the event,
    /// or an error if nobody is listening at all.
    pub fn publish(&self, event: AppEvent) -> Result<usize, EventBusError> {
        let matching: Vec<EventHandler> = self
            .handlers
            .read()
            .values()
            .filter(|(filter, _)| filter.matches(&event))
            .map(|(_, handler)| handler.clone())
            .collect();
        let had_handlers = !matching.is_empty();

        tracing::trace!("Publishing {}", event.description());
        for handler in matching {
            handler(event.clone());
        }

        match self.sender.send(event) {
            Ok(count) => Ok(count),
            Err(_) if had_handlers => Ok(0),
            Err(_) => Err(EventBusError::NoSubscribers),
        }
    }

    /// Subscribe to events with a synchronous handler
    ///
    /// The handler will be called on the publishing thread, so it should
    /// return quickly to avoid blocking event dispatch.
    pub fn subscribe<F>(&self, filter: EventFilter, handler: F) -> SubscriptionId
    where
        F: Fn(AppEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId::new();
        self.handlers.write().insert(id, (filter, Arc::new(handler)));
        tracing::debug!("Subscription {} added", id);
        id
    }

    /// Get a receiver for manual event polling
    pub fn receiver(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    /// Unsubscribe from events
    ///
    /// Returns true if the subscription was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.handlers.write().remove(&id).is_some();
        if removed {
            tracing::debug!("Subscription {} removed", id);
        }
        removed
    }

    /// Get the number of active subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.handlers.read().len()
    }

    /// Get the current configuration
    pub fn config(&self) -> &EventBusConfig {
        &self.config
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_bus::events::{ContainerEvent, MaterialEvent};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn material_added(id: &str) -> AppEvent {
        AppEvent::Container(ContainerEvent::Added {
            id: id.to_string(),
            container_type: "material".to_string(),
        })
    }

    #[test]
    fn test_event_bus_creation() {
        let bus = EventBus::new();
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let bus = EventBus::new();

        let id = bus.subscribe(EventFilter::All, |_| {});
        assert_eq!(bus.subscriber_count(), 1);

        assert!(bus.unsubscribe(id));
        assert_eq!(bus.subscriber_count(), 0);

        // Double unsubscribe should return false
        assert!(!bus.unsubscribe(id));
    }

    #[test]
    fn test_event_delivery() {
        let bus = EventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();

        let _id = bus.subscribe(EventFilter::All, move |_| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        bus.publish(material_added("generic_pla"))
            .expect("Should publish");
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::new();
        let result = bus.publish(AppEvent::Material(MaterialEvent::MaterialsUpdated));
        assert!(matches!(result, Err(EventBusError::NoSubscribers)));
    }

    #[test]
    fn test_event_filtering() {
        let bus = EventBus::new();
        let container_count = Arc::new(AtomicUsize::new(0));
        let material_count = Arc::new(AtomicUsize::new(0));

        let cc = container_count.clone();
        bus.subscribe(
            EventFilter::Categories(vec![EventCategory::Container]),
            move |_| {
                cc.fetch_add(1, Ordering::SeqCst);
            },
        );

        let mc = material_count.clone();
        bus.subscribe(
            EventFilter::Categories(vec![EventCategory::Material]),
            move |_| {
                mc.fetch_add(1, Ordering::SeqCst);
            },
        );

        bus.publish(material_added("generic_pla")).ok();
        bus.publish(AppEvent::Material(MaterialEvent::MaterialsUpdated))
            .ok();

        assert_eq!(container_count.load(Ordering::SeqCst), 1);
        assert_eq!(material_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_handler_can_publish() {
        let bus = Arc::new(EventBus::new());
        let updates = Arc::new(AtomicUsize::new(0));

        let inner = bus.clone();
        bus.subscribe(
            EventFilter::Categories(vec![EventCategory::Container]),
            move |_| {
                inner
                    .publish(AppEvent::Material(MaterialEvent::MaterialsUpdated))
                    .ok();
            },
        );
        let u = updates.clone();
        bus.subscribe(
            EventFilter::Categories(vec![EventCategory::Material]),
            move |_| {
                u.fetch_add(1, Ordering::SeqCst);
            },
        );

        bus.publish(material_added("generic_pla")).ok();
        assert_eq!(updates.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_channel_capacity_from_config() {
        let bus = EventBus::with_config(EventBusConfig {
            channel_capacity: 2,
        });
        assert_eq!(bus.config().channel_capacity, 2);

        let mut receiver = bus.receiver();
        for i in 0..3 {
            bus.publish(material_added(&format!("material_{}", i))).ok();
        }
        assert!(matches!(
            receiver.try_recv(),
            Err(broadcast::error::TryRecvError::Lagged(1))
        ));
    }

    #[test]
    fn test_filter_matches() {
        let event = material_added("generic_pla");

        assert!(EventFilter::All.matches(&event));
        assert!(EventFilter::Categories(vec![EventCategory::Container]).matches(&event));
        assert!(!EventFilter::Categories(vec![EventCategory::Material]).matches(&event));
    }

    #[tokio::test]
    async fn test_async_receiver() {
        let bus = EventBus::new();
        let mut receiver = bus.receiver();

        bus.publish(AppEvent::Material(MaterialEvent::MaterialsUpdated))
            .ok();

        let received = receiver.try_recv();
        assert_eq!(
            received.ok(),
            Some(AppEvent::Material(MaterialEvent::MaterialsUpdated))
        );
    }
}
