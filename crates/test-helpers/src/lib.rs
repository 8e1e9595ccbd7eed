//! Test helpers for Tickbus.
//!
//! Fixture maps plus two generic modules for observing and driving a bus
//! from tests:
//!
//! - [`Recorder`] drains a topic every tick and remembers when it saw what
//! - [`ScriptedPublisher`] publishes pre-planned messages at given times

use std::cell::{Ref, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;
use tickbus_bus::{MessageBus, Publisher, Subscription};
use tickbus_core::{Module, SimTime};
use tickbus_types::GridMap;

/// The 10x10 map used throughout the tests: free interior, occupied border.
pub fn bordered_map() -> GridMap {
    GridMap::bordered(10, 10).expect("10x10 bordered map is valid")
}

/// A message together with the tick at which a [`Recorder`] popped it.
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded<T> {
    pub tick: SimTime,
    pub message: T,
}

/// Shared view of everything a [`Recorder`] has seen.
pub struct RecordLog<T> {
    entries: Rc<RefCell<Vec<Recorded<T>>>>,
}

impl<T> Clone for RecordLog<T> {
    fn clone(&self) -> Self {
        Self {
            entries: Rc::clone(&self.entries),
        }
    }
}

impl<T: Clone> RecordLog<T> {
    /// All recorded entries, oldest first.
    pub fn entries(&self) -> Ref<'_, Vec<Recorded<T>>> {
        self.entries.borrow()
    }

    /// Recorded messages without tick information.
    pub fn messages(&self) -> Vec<T> {
        self.entries
            .borrow()
            .iter()
            .map(|entry| entry.message.clone())
            .collect()
    }

    /// Ticks at which each message was observed.
    pub fn ticks(&self) -> Vec<SimTime> {
        self.entries.borrow().iter().map(|entry| entry.tick).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

/// Module that drains one topic each tick into a [`RecordLog`].
pub struct Recorder<T> {
    sub: Subscription<T>,
    log: RecordLog<T>,
    name: String,
}

impl<T: Clone + 'static> Recorder<T> {
    /// Subscribe to `T` on `bus`.
    pub fn new(bus: &MessageBus, name: impl Into<String>) -> Self {
        Self {
            sub: bus.subscribe(),
            log: RecordLog {
                entries: Rc::new(RefCell::new(Vec::new())),
            },
            name: name.into(),
        }
    }

    /// Handle to the log; stays valid after the recorder is moved into a
    /// scheduler.
    pub fn log(&self) -> RecordLog<T> {
        self.log.clone()
    }
}

impl<T: Clone + 'static> Module for Recorder<T> {
    fn update_state(&mut self, now: SimTime) {
        let mut entries = self.log.entries.borrow_mut();
        for message in self.sub.drain() {
            entries.push(Recorded { tick: now, message });
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Module that publishes planned messages when their time comes.
///
/// Messages scheduled for a time that never coincides with a tick are
/// published on the first tick after it.
pub struct ScriptedPublisher<T> {
    publisher: Publisher<T>,
    plan: BTreeMap<SimTime, Vec<T>>,
    name: String,
}

impl<T: Clone + 'static> ScriptedPublisher<T> {
    pub fn new(
        bus: &MessageBus,
        name: impl Into<String>,
        plan: impl IntoIterator<Item = (SimTime, T)>,
    ) -> Self {
        let mut by_time: BTreeMap<SimTime, Vec<T>> = BTreeMap::new();
        for (time, message) in plan {
            by_time.entry(time).or_default().push(message);
        }

        Self {
            publisher: bus.publisher(),
            plan: by_time,
            name: name.into(),
        }
    }

    /// Messages not yet published.
    pub fn remaining(&self) -> usize {
        self.plan.values().map(Vec::len).sum()
    }
}

impl<T: Clone + 'static> Module for ScriptedPublisher<T> {
    fn update_state(&mut self, now: SimTime) {
        let due = match now.checked_add(1) {
            Some(next) => {
                let later = self.plan.split_off(&next);
                std::mem::replace(&mut self.plan, later)
            }
            None => std::mem::take(&mut self.plan),
        };
        for message in due.into_values().flatten() {
            self.publisher.publish(message);
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_publisher_releases_due_messages() {
        let bus = MessageBus::new();
        let mut sub = bus.subscribe::<u32>();
        let plan = [(0, 1u32), (2, 2), (2, 3), (5, 4)];
        let mut script = ScriptedPublisher::new(&bus, "script", plan);

        script.update_state(0);
        assert_eq!(sub.drain(), vec![1]);
        script.update_state(1);
        assert!(sub.is_empty());
        script.update_state(3);
        assert_eq!(sub.drain(), vec![2, 3]);
        assert_eq!(script.remaining(), 1);
    }

    #[test]
    fn test_recorder_stamps_ticks() {
        let bus = MessageBus::new();
        let mut recorder = Recorder::<u32>::new(&bus, "rec");
        let log = recorder.log();

        bus.publish(1u32);
        bus.publish(2u32);
        recorder.update_state(4);

        assert_eq!(log.messages(), vec![1, 2]);
        assert_eq!(log.ticks(), vec![4, 4]);
        assert_eq!(recorder.name(), "rec");
    }
}
