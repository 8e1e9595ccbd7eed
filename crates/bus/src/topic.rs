//! Typed topics: fan-out of published messages to subscriber queues.

use crate::policy::{BusError, QueuePolicy};
use crate::stats::TopicStats;
use crate::subscription::{SharedQueue, SubscriberQueue, Subscription};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use tracing::{debug, trace, warn};

/// Shared state behind every handle to one topic.
pub(crate) struct TopicInner<T> {
    name: &'static str,
    /// Policy for subscriptions that don't specify one.
    default_policy: QueuePolicy,
    /// Subscriber queues in subscription order.
    queues: RefCell<Vec<SharedQueue<T>>>,
    published: Cell<u64>,
    delivered: Cell<u64>,
}

impl<T: 'static> TopicInner<T> {
    pub(crate) fn new(default_policy: QueuePolicy) -> Self {
        Self {
            name: std::any::type_name::<T>(),
            default_policy,
            queues: RefCell::new(Vec::new()),
            published: Cell::new(0),
            delivered: Cell::new(0),
        }
    }
}

/// Object-safe view of a topic, independent of its message type.
pub(crate) trait TopicInfo {
    fn stats(&self) -> TopicStats;
}

impl<T> TopicInfo for TopicInner<T> {
    fn stats(&self) -> TopicStats {
        let queues = self.queues.borrow();
        let (pending, dropped) = queues.iter().fold((0, 0), |(pending, dropped), queue| {
            let queue = queue.borrow();
            (pending + queue.len(), dropped + queue.dropped())
        });

        TopicStats {
            name: self.name,
            subscribers: queues.len(),
            published: self.published.get(),
            delivered: self.delivered.get(),
            dropped,
            pending,
        }
    }
}

/// Handle to the channel carrying every message of type `T` on one bus.
///
/// Handles are cheap to clone; all clones address the same subscriber list.
/// Obtain one with [`MessageBus::topic`](crate::MessageBus::topic).
pub struct Topic<T> {
    inner: Rc<TopicInner<T>>,
}

impl<T> Clone for Topic<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + 'static> Topic<T> {
    pub(crate) fn from_inner(inner: Rc<TopicInner<T>>) -> Self {
        Self { inner }
    }

    /// Register a new queue using the bus default policy.
    ///
    /// The queue receives every message published from now on, in publish
    /// order. Messages published earlier are never seen.
    pub fn subscribe(&self) -> Subscription<T> {
        self.attach(self.inner.default_policy)
    }

    /// Register a new queue with an explicit bounding policy.
    pub fn subscribe_with(&self, policy: QueuePolicy) -> Result<Subscription<T>, BusError> {
        Ok(self.attach(policy.validated()?))
    }

    fn attach(&self, policy: QueuePolicy) -> Subscription<T> {
        let queue = Rc::new(RefCell::new(SubscriberQueue::new(policy)));
        let mut queues = self.inner.queues.borrow_mut();
        queues.push(Rc::clone(&queue));

        debug!(
            topic = self.inner.name,
            subscribers = queues.len(),
            ?policy,
            "New subscription"
        );

        Subscription::new(queue, self.inner.name)
    }

    /// Append a copy of `message` to every subscriber queue.
    ///
    /// Queues are visited in subscription order. Runs to completion before
    /// returning; with no subscribers this does nothing beyond counting.
    pub fn publish(&self, message: T) {
        let queues = self.inner.queues.borrow();
        self.inner.published.set(self.inner.published.get() + 1);

        let Some((last, rest)) = queues.split_last() else {
            trace!(topic = self.inner.name, "Published with no subscribers");
            return;
        };

        let mut delivered = 0u64;
        for queue in rest {
            delivered += u64::from(self.push_into(queue, message.clone()));
        }
        delivered += u64::from(self.push_into(last, message));
        self.inner
            .delivered
            .set(self.inner.delivered.get() + delivered);

        trace!(
            topic = self.inner.name,
            subscribers = queues.len(),
            delivered,
            "Published message"
        );
    }

    fn push_into(&self, queue: &SharedQueue<T>, message: T) -> bool {
        let mut queue = queue.borrow_mut();
        let outcome = queue.push(message);

        // Report only the first loss per queue; the counter tracks the rest.
        if outcome.dropped() && queue.dropped() == 1 {
            warn!(
                topic = self.inner.name,
                policy = ?queue.policy(),
                "Subscriber queue full, dropping messages"
            );
        }

        outcome.delivered()
    }

    /// A publish-only handle to this topic.
    pub fn publisher(&self) -> Publisher<T> {
        Publisher {
            topic: self.clone(),
        }
    }

    /// Number of registered subscriber queues.
    pub fn subscriber_count(&self) -> usize {
        self.inner.queues.borrow().len()
    }

    /// Type name of the messages carried by this topic.
    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    pub fn stats(&self) -> TopicStats {
        self.inner.stats()
    }

    /// Whether two handles address the same topic.
    pub fn same_topic(&self, other: &Topic<T>) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> fmt::Debug for Topic<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Topic")
            .field("name", &self.inner.name)
            .field("subscribers", &self.inner.queues.borrow().len())
            .field("published", &self.inner.published.get())
            .finish()
    }
}

/// Publish-only handle to one topic.
///
/// Modules keep one of these per output type so that `update_state` needs no
/// bus lookup.
pub struct Publisher<T> {
    topic: Topic<T>,
}

impl<T> Clone for Publisher<T> {
    fn clone(&self) -> Self {
        Self {
            topic: self.topic.clone(),
        }
    }
}

impl<T: Clone + 'static> Publisher<T> {
    /// Append a copy of `message` to every subscriber queue.
    pub fn publish(&self, message: T) {
        self.topic.publish(message)
    }

    pub fn subscriber_count(&self) -> usize {
        self.topic.subscriber_count()
    }

    pub fn topic(&self) -> &Topic<T> {
        &self.topic
    }
}

impl<T> fmt::Debug for Publisher<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Publisher").field(&self.topic).finish()
    }
}
