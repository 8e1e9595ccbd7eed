//! The message bus: a type-indexed table of topics.

use crate::policy::{BusError, QueuePolicy};
use crate::stats::TopicStats;
use crate::subscription::Subscription;
use crate::topic::{Publisher, Topic, TopicInfo, TopicInner};
use indexmap::IndexMap;
use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tracing::debug;

/// One topic, stored twice: once for typed lookup and once for
/// type-independent introspection. Both point at the same allocation.
struct TopicEntry {
    topic: Rc<dyn Any>,
    info: Rc<dyn TopicInfo>,
}

struct BusInner {
    default_policy: QueuePolicy,
    /// Insertion order is topic creation order, which keeps `stats()`
    /// deterministic.
    topics: RefCell<IndexMap<TypeId, TopicEntry>>,
}

/// Registry holding exactly one [`Topic`] per message type.
///
/// The bus replaces a process-wide singleton: it is created by the setup
/// code and handed to every module constructor, so each simulation (and each
/// test) has its own isolated set of topics. Cloning a `MessageBus` yields
/// another handle to the same registry.
///
/// Topics are created lazily on first access and live as long as the bus or
/// any handle derived from it.
///
/// The bus is single-threaded (`!Send`). Running modules on separate threads
/// would need real channels in place of these shared queues.
#[derive(Clone)]
pub struct MessageBus {
    inner: Rc<BusInner>,
}

impl MessageBus {
    /// Create a bus whose subscriber queues are unbounded by default.
    pub fn new() -> Self {
        Self::from_policy(QueuePolicy::Unbounded)
    }

    /// Create a bus whose subscriptions use `policy` unless they ask for
    /// another one.
    pub fn with_default_policy(policy: QueuePolicy) -> Result<Self, BusError> {
        Ok(Self::from_policy(policy.validated()?))
    }

    fn from_policy(default_policy: QueuePolicy) -> Self {
        Self {
            inner: Rc::new(BusInner {
                default_policy,
                topics: RefCell::new(IndexMap::new()),
            }),
        }
    }

    /// The topic for messages of type `T`, created on first use.
    ///
    /// Every call with the same `T` returns a handle to the same topic.
    pub fn topic<T: Clone + 'static>(&self) -> Topic<T> {
        let mut topics = self.inner.topics.borrow_mut();
        let entry = topics.entry(TypeId::of::<T>()).or_insert_with(|| {
            let inner = Rc::new(TopicInner::<T>::new(self.inner.default_policy));
            debug!(topic = std::any::type_name::<T>(), "Created topic");
            TopicEntry {
                topic: inner.clone(),
                info: inner,
            }
        });

        match Rc::clone(&entry.topic).downcast::<TopicInner<T>>() {
            Ok(inner) => Topic::from_inner(inner),
            Err(_) => unreachable!("topic table is keyed by the message TypeId"),
        }
    }

    /// Subscribe to `T` using the bus default policy.
    pub fn subscribe<T: Clone + 'static>(&self) -> Subscription<T> {
        self.topic::<T>().subscribe()
    }

    /// Subscribe to `T` with an explicit bounding policy.
    pub fn subscribe_with<T: Clone + 'static>(
        &self,
        policy: QueuePolicy,
    ) -> Result<Subscription<T>, BusError> {
        self.topic::<T>().subscribe_with(policy)
    }

    /// A publish-only handle for `T`.
    pub fn publisher<T: Clone + 'static>(&self) -> Publisher<T> {
        self.topic::<T>().publisher()
    }

    /// Publish `message` to every current subscriber of `T`.
    pub fn publish<T: Clone + 'static>(&self, message: T) {
        self.topic::<T>().publish(message)
    }

    /// Whether a topic for `T` has been created.
    pub fn has_topic<T: 'static>(&self) -> bool {
        self.inner.topics.borrow().contains_key(&TypeId::of::<T>())
    }

    /// Number of topics created so far.
    pub fn topic_count(&self) -> usize {
        self.inner.topics.borrow().len()
    }

    pub fn default_policy(&self) -> QueuePolicy {
        self.inner.default_policy
    }

    /// Traffic counters for every topic, in creation order.
    pub fn stats(&self) -> Vec<TopicStats> {
        self.inner
            .topics
            .borrow()
            .values()
            .map(|entry| entry.info.stats())
            .collect()
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MessageBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageBus")
            .field("default_policy", &self.inner.default_policy)
            .field("topics", &self.topic_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[derive(Debug, Clone, PartialEq)]
    struct Ping(u32);

    #[derive(Debug, Clone, PartialEq)]
    struct Pong(u32);

    #[test]
    fn test_one_topic_per_type() {
        let bus = MessageBus::new();
        let a = bus.topic::<Ping>();
        let b = bus.topic::<Ping>();
        let other = bus.clone().topic::<Ping>();

        assert!(a.same_topic(&b));
        assert!(a.same_topic(&other));
        assert_eq!(bus.topic_count(), 1);
    }

    #[test]
    fn test_types_are_isolated() {
        let bus = MessageBus::new();
        let mut pings = bus.subscribe::<Ping>();
        let mut pongs = bus.subscribe::<Pong>();

        bus.publish(Ping(1));
        assert_eq!(pings.pop(), Some(Ping(1)));
        assert!(pongs.pop().is_none());
    }

    #[test]
    fn test_buses_are_isolated() {
        let first = MessageBus::new();
        let second = MessageBus::new();
        let sub = first.subscribe::<Ping>();

        second.publish(Ping(7));
        assert!(sub.is_empty());
        assert!(!second.topic::<Ping>().same_topic(&first.topic::<Ping>()));
    }

    #[test]
    fn test_delivery_order_per_subscriber() {
        let bus = MessageBus::new();
        let publisher = bus.publisher::<u32>();

        publisher.publish(0);
        let mut a = bus.subscribe::<u32>();
        publisher.publish(1);
        publisher.publish(2);
        let mut b = bus.subscribe::<u32>();
        publisher.publish(3);
        let mut c = bus.subscribe::<u32>();

        assert_eq!(a.drain(), vec![1, 2, 3]);
        assert_eq!(b.drain(), vec![3]);
        assert!(c.drain().is_empty());
    }

    #[test]
    fn test_lazy_creation() {
        let bus = MessageBus::new();
        assert!(!bus.has_topic::<Ping>());

        bus.publish(Ping(1));
        assert!(bus.has_topic::<Ping>());
        assert!(!bus.has_topic::<Pong>());
    }

    #[traced_test]
    #[test]
    fn test_default_policy_applies_to_subscribe() {
        let bus = MessageBus::with_default_policy(QueuePolicy::drop_oldest(1).unwrap()).unwrap();
        let mut sub = bus.subscribe::<u32>();
        let mut explicit = bus.subscribe_with::<u32>(QueuePolicy::Unbounded).unwrap();

        bus.publish(1u32);
        bus.publish(2u32);

        assert_eq!(sub.policy(), QueuePolicy::DropOldest { capacity: 1 });
        assert_eq!(sub.drain(), vec![2]);
        assert_eq!(explicit.drain(), vec![1, 2]);
        assert!(logs_contain("Created topic"));
    }

    #[test]
    fn test_zero_capacity_default_rejected() {
        let result = MessageBus::with_default_policy(QueuePolicy::DropOldest { capacity: 0 });
        assert_eq!(result.unwrap_err(), BusError::ZeroCapacity);
    }

    #[test]
    fn test_stats_in_creation_order() {
        let bus = MessageBus::new();
        let _pong_sub = bus.subscribe::<Pong>();
        bus.publish(Ping(1));
        bus.publish(Pong(1));
        bus.publish(Pong(2));

        let stats = bus.stats();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].short_name(), "Pong");
        assert_eq!(stats[0].published, 2);
        assert_eq!(stats[0].pending, 2);
        assert_eq!(stats[1].short_name(), "Ping");
        assert_eq!(stats[1].delivered, 0);
    }
}
