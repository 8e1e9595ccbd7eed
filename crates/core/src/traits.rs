//! Core trait for simulation modules.

use crate::SimTime;

/// A unit of simulated behaviour driven by the scheduler.
///
/// This is the only contract the scheduler knows about. Modules communicate
/// exclusively through topics on a message bus; they never hold references
/// to one another.
///
/// - **Synchronous**: `update_state` never blocks, sleeps or waits for input
/// - **Polling**: absent input is detected by checking queue emptiness; the
///   module then skips work or acts on its last known state
/// - **Fixed wiring**: subscriptions are created in the constructor and live
///   as long as the module
///
/// # Example
///
/// ```ignore
/// impl Module for Robot {
///     fn update_state(&mut self, now: SimTime) {
///         if let Some(control) = self.control_sub.pop() {
///             self.try_execute_control(&control);
///         }
///         self.state_pub.publish(TrueStateMsg::new(self.x, self.y, now));
///     }
/// }
/// ```
pub trait Module {
    /// Advance this module by one tick.
    ///
    /// Called exactly once per tick, in registration order, with the current
    /// simulated time. Messages published by modules registered earlier in
    /// the same tick are already visible in this module's queues.
    fn update_state(&mut self, now: SimTime);

    /// Name used in logs and run summaries.
    ///
    /// Defaults to the implementing type's name without its module path.
    fn name(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }
}

/// Strip the module path from a type name, leaving generic arguments alone.
///
/// `alloc::vec::Vec<core::option::Option<u8>>` becomes
/// `Vec<core::option::Option<u8>>`.
pub fn short_type_name(name: &str) -> &str {
    let head = match name.find('<') {
        Some(pos) => &name[..pos],
        None => name,
    };
    match head.rfind("::") {
        Some(pos) => &name[pos + 2..],
        None => name,
    }
}

impl<M: Module + ?Sized> Module for Box<M> {
    fn update_state(&mut self, now: SimTime) {
        (**self).update_state(now)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
