use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;
use uuid::Uuid;

use super::{DomainEvent, EventEnvelope};

const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Process-local broadcast bus decoupling C5/C6/C7 mutations from the RBAC
/// cache invalidation listener in iam-rbac (spec §4.3 cache-invalidation
/// requirement). Grounded on `rustok_core::events::bus::EventBus`.
#[derive(Debug)]
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
    stats: Arc<EventBusStats>,
}

#[derive(Debug, Default)]
pub struct EventBusStats {
    published: AtomicUsize,
    subscribers: AtomicUsize,
}

impl EventBusStats {
    pub fn published(&self) -> usize {
        self.published.load(Ordering::Relaxed)
    }

    pub fn subscribers(&self) -> usize {
        self.subscribers.load(Ordering::Relaxed)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(DEFAULT_CHANNEL_CAPACITY);
        Self {
            sender,
            stats: Arc::new(EventBusStats::default()),
        }
    }

    pub fn stats(&self) -> Arc<EventBusStats> {
        Arc::clone(&self.stats)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        let receiver = self.sender.subscribe();
        self.stats
            .subscribers
            .store(self.sender.receiver_count(), Ordering::Relaxed);
        receiver
    }

    #[tracing::instrument(name = "event_bus.publish", skip(self, event), fields(event.type = %event.event_type()))]
    pub fn publish(&self, tenant_id: Uuid, actor_id: Option<Uuid>, event: DomainEvent) {
        let envelope = EventEnvelope::new(tenant_id, actor_id, event);
        // No subscribers is not an error: the bus is best-effort fan-out,
        // not a durable queue (that's C8's job).
        let _ = self.sender.send(envelope);
        self.stats.published.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscriber_receives_published_event() {
        let bus = EventBus::new();
        let mut receiver = bus.subscribe();

        let tenant_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        bus.publish(tenant_id, None, DomainEvent::MemberAdded { tenant_id, user_id });

        let envelope = receiver.recv().await.unwrap();
        assert_eq!(envelope.tenant_id, tenant_id);
        assert_eq!(envelope.event_type, "member.added");
        assert_eq!(bus.stats().published(), 1);
    }

    #[test]
    fn publish_without_subscribers_does_not_panic() {
        let bus = EventBus::new();
        let tenant_id = Uuid::new_v4();
        bus.publish(
            tenant_id,
            None,
            DomainEvent::TenantCreated { tenant_id },
        );
        assert_eq!(bus.stats().published(), 1);
    }
}
