//! Subscriber queues and the handles that own them.

use crate::policy::QueuePolicy;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

/// Result of appending to a subscriber queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PushOutcome {
    /// The message was appended without loss.
    Enqueued,
    /// The message was appended and the oldest queued message discarded.
    DroppedOldest,
    /// The queue was full and the message was discarded.
    DroppedNewest,
}

impl PushOutcome {
    pub(crate) fn delivered(self) -> bool {
        !matches!(self, PushOutcome::DroppedNewest)
    }

    pub(crate) fn dropped(self) -> bool {
        !matches!(self, PushOutcome::Enqueued)
    }
}

/// FIFO buffer fed by a topic and drained by exactly one subscriber.
#[derive(Debug)]
pub(crate) struct SubscriberQueue<T> {
    messages: VecDeque<T>,
    policy: QueuePolicy,
    dropped: u64,
}

impl<T> SubscriberQueue<T> {
    pub(crate) fn new(policy: QueuePolicy) -> Self {
        Self {
            messages: VecDeque::new(),
            policy,
            dropped: 0,
        }
    }

    /// Append `message`, applying the queue's bounding policy.
    pub(crate) fn push(&mut self, message: T) -> PushOutcome {
        match self.policy {
            QueuePolicy::Unbounded => {
                self.messages.push_back(message);
                PushOutcome::Enqueued
            }
            QueuePolicy::DropOldest { capacity } => {
                let outcome = if self.messages.len() >= capacity {
                    self.messages.pop_front();
                    self.dropped += 1;
                    PushOutcome::DroppedOldest
                } else {
                    PushOutcome::Enqueued
                };
                self.messages.push_back(message);
                outcome
            }
            QueuePolicy::DropNewest { capacity } => {
                if self.messages.len() >= capacity {
                    self.dropped += 1;
                    PushOutcome::DroppedNewest
                } else {
                    self.messages.push_back(message);
                    PushOutcome::Enqueued
                }
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.messages.len()
    }

    pub(crate) fn dropped(&self) -> u64 {
        self.dropped
    }

    pub(crate) fn policy(&self) -> QueuePolicy {
        self.policy
    }
}

pub(crate) type SharedQueue<T> = Rc<RefCell<SubscriberQueue<T>>>;

/// Exclusive read handle on one subscriber queue.
///
/// Created by [`Topic::subscribe`](crate::Topic::subscribe). The topic keeps
/// a shared reference to the queue so later publishes reach it; only this
/// handle can remove messages. Dropping the handle does not unsubscribe: the
/// topic keeps appending to the orphaned queue for the rest of its life.
pub struct Subscription<T> {
    queue: SharedQueue<T>,
    topic: &'static str,
}

impl<T> Subscription<T> {
    pub(crate) fn new(queue: SharedQueue<T>, topic: &'static str) -> Self {
        Self { queue, topic }
    }

    /// Remove and return the oldest queued message.
    pub fn pop(&mut self) -> Option<T> {
        self.queue.borrow_mut().messages.pop_front()
    }

    /// Remove every queued message, oldest first.
    pub fn drain(&mut self) -> Vec<T> {
        self.queue.borrow_mut().messages.drain(..).collect()
    }

    /// Discard every queued message and return the newest one.
    pub fn latest(&mut self) -> Option<T> {
        let mut queue = self.queue.borrow_mut();
        let latest = queue.messages.pop_back();
        queue.messages.clear();
        latest
    }

    /// Whether no message is waiting.
    pub fn is_empty(&self) -> bool {
        self.queue.borrow().messages.is_empty()
    }

    /// Number of waiting messages.
    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Messages this queue has discarded because of its bounding policy.
    pub fn dropped(&self) -> u64 {
        self.queue.borrow().dropped()
    }

    pub fn policy(&self) -> QueuePolicy {
        self.queue.borrow().policy()
    }

    /// Type name of the topic this subscription listens to.
    pub fn topic_name(&self) -> &'static str {
        self.topic
    }
}

impl<T: Clone> Subscription<T> {
    /// Clone of the oldest queued message, without removing it.
    pub fn peek(&self) -> Option<T> {
        self.queue.borrow().messages.front().cloned()
    }
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let queue = self.queue.borrow();
        f.debug_struct("Subscription")
            .field("topic", &self.topic)
            .field("pending", &queue.len())
            .field("dropped", &queue.dropped())
            .field("policy", &queue.policy())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbounded_push() {
        let mut queue = SubscriberQueue::new(QueuePolicy::Unbounded);
        for i in 0..100 {
            assert_eq!(queue.push(i), PushOutcome::Enqueued);
        }
        assert_eq!(queue.len(), 100);
        assert_eq!(queue.dropped(), 0);
    }

    #[test]
    fn test_drop_oldest_keeps_newest() {
        let mut queue = SubscriberQueue::new(QueuePolicy::DropOldest { capacity: 2 });
        assert_eq!(queue.push(1), PushOutcome::Enqueued);
        assert_eq!(queue.push(2), PushOutcome::Enqueued);
        assert_eq!(queue.push(3), PushOutcome::DroppedOldest);

        assert_eq!(queue.messages, VecDeque::from([2, 3]));
        assert_eq!(queue.dropped(), 1);
    }

    #[test]
    fn test_drop_newest_keeps_oldest() {
        let mut queue = SubscriberQueue::new(QueuePolicy::DropNewest { capacity: 2 });
        queue.push(1);
        queue.push(2);
        assert_eq!(queue.push(3), PushOutcome::DroppedNewest);
        assert_eq!(queue.push(4), PushOutcome::DroppedNewest);

        assert_eq!(queue.messages, VecDeque::from([1, 2]));
        assert_eq!(queue.dropped(), 2);
    }

    #[test]
    fn test_subscription_reads() {
        let shared = Rc::new(RefCell::new(SubscriberQueue::new(QueuePolicy::Unbounded)));
        let mut sub = Subscription::new(shared.clone(), "u32");
        assert!(sub.is_empty());
        assert_eq!(sub.peek(), None);

        for i in 1..=4u32 {
            shared.borrow_mut().push(i);
        }
        assert_eq!(sub.len(), 4);
        assert_eq!(sub.peek(), Some(1));
        assert_eq!(sub.pop(), Some(1));
        assert_eq!(sub.drain(), vec![2, 3, 4]);
        assert!(sub.is_empty());

        shared.borrow_mut().push(5);
        shared.borrow_mut().push(6);
        assert_eq!(sub.latest(), Some(6));
        assert!(sub.is_empty());
        assert_eq!(sub.latest(), None);
    }
}
