//! Subscriber queue bounding policies.

use thiserror::Error;

/// Errors from bus configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    /// A bounded queue policy was given a capacity of zero.
    #[error("Bounded queue policy requires a capacity of at least 1")]
    ZeroCapacity,
}

/// What a subscriber queue does when a publish would exceed its capacity.
///
/// There is no backpressure variant: publishers run on the single simulation
/// thread and cannot wait for a subscriber to drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueuePolicy {
    /// Grow without limit. A subscriber that never drains leaks memory for
    /// the rest of the run.
    #[default]
    Unbounded,

    /// Keep at most `capacity` messages, discarding the oldest on overflow.
    DropOldest { capacity: usize },

    /// Keep at most `capacity` messages, discarding the incoming message on
    /// overflow.
    DropNewest { capacity: usize },
}

impl QueuePolicy {
    /// Bounded policy that keeps the newest `capacity` messages.
    pub fn drop_oldest(capacity: usize) -> Result<Self, BusError> {
        Self::DropOldest { capacity }.validated()
    }

    /// Bounded policy that keeps the oldest `capacity` messages.
    pub fn drop_newest(capacity: usize) -> Result<Self, BusError> {
        Self::DropNewest { capacity }.validated()
    }

    /// Maximum queue length, or `None` when unbounded.
    pub fn capacity(&self) -> Option<usize> {
        match *self {
            QueuePolicy::Unbounded => None,
            QueuePolicy::DropOldest { capacity } | QueuePolicy::DropNewest { capacity } => {
                Some(capacity)
            }
        }
    }

    /// Return the policy unchanged if it is usable.
    pub fn validated(self) -> Result<Self, BusError> {
        if self.capacity() == Some(0) {
            return Err(BusError::ZeroCapacity);
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_capacity_rejected() {
        assert_eq!(QueuePolicy::drop_oldest(0), Err(BusError::ZeroCapacity));
        assert_eq!(QueuePolicy::drop_newest(0), Err(BusError::ZeroCapacity));
        assert_eq!(
            QueuePolicy::DropOldest { capacity: 0 }.validated(),
            Err(BusError::ZeroCapacity)
        );
    }

    #[test]
    fn test_capacity() {
        assert_eq!(QueuePolicy::Unbounded.capacity(), None);
        assert_eq!(QueuePolicy::drop_oldest(4).unwrap().capacity(), Some(4));
        assert_eq!(QueuePolicy::drop_newest(1).unwrap().capacity(), Some(1));
    }
}
