//! Per-topic counters.

use std::fmt;
use tickbus_core::short_type_name;

/// Snapshot of one topic's traffic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicStats {
    /// Type name of the messages carried by the topic.
    pub name: &'static str,
    /// Registered subscriber queues.
    pub subscribers: usize,
    /// Publish calls.
    pub published: u64,
    /// Copies appended to subscriber queues.
    pub delivered: u64,
    /// Copies discarded by bounded queue policies.
    pub dropped: u64,
    /// Messages currently waiting across all queues.
    pub pending: usize,
}

impl TopicStats {
    /// Message type name without its module path.
    pub fn short_name(&self) -> &'static str {
        short_type_name(self.name)
    }
}

impl fmt::Display for TopicStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: subscribers={} published={} delivered={} dropped={} pending={}",
            self.short_name(),
            self.subscribers,
            self.published,
            self.delivered,
            self.dropped,
            self.pending
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_name_and_display() {
        let stats = TopicStats {
            name: "tickbus_types::messages::ControlMsg",
            subscribers: 2,
            published: 3,
            delivered: 6,
            dropped: 0,
            pending: 1,
        };

        assert_eq!(stats.short_name(), "ControlMsg");
        assert_eq!(
            stats.to_string(),
            "ControlMsg: subscribers=2 published=3 delivered=6 dropped=0 pending=1"
        );
    }
}
