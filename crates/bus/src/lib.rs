//! Typed publish/subscribe message bus.
//!
//! Modules exchange data only through topics. A topic is identified by its
//! message type: there is exactly one [`Topic<T>`] per type `T` on a given
//! [`MessageBus`].
//!
//! # Delivery model
//!
//! ```text
//!   publisher ──publish(m)──► Topic<T>
//!                               │ clone m into every queue, in
//!                               │ subscription order
//!                 ┌─────────────┼─────────────┐
//!                 ▼             ▼             ▼
//!            queue #1       queue #2       queue #3
//!          (Subscription) (Subscription) (Subscription)
//!                 │             │             │
//!              pop()         pop()         pop()
//! ```
//!
//! - Publishing is synchronous: when `publish` returns, every queue already
//!   holds its copy.
//! - A queue sees exactly the messages published after it was created, in
//!   publish order.
//! - There is no unsubscribe. Queues are unbounded unless a
//!   [`QueuePolicy`] says otherwise.
//!
//! # Example
//!
//! ```
//! use tickbus_bus::MessageBus;
//!
//! let bus = MessageBus::new();
//! let mut sub = bus.subscribe::<u32>();
//! bus.publish(7u32);
//! assert_eq!(sub.pop(), Some(7));
//! ```

mod bus;
mod policy;
mod stats;
mod subscription;
mod topic;

pub use bus::MessageBus;
pub use policy::{BusError, QueuePolicy};
pub use stats::TopicStats;
pub use subscription::Subscription;
pub use topic::{Publisher, Topic};
