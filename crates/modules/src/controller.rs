//! Placeholder controller.

use tickbus_bus::{MessageBus, Publisher, Subscription};
use tickbus_core::{Module, SimTime};
use tickbus_types::{ControlMsg, Direction, LidarScanMsg};
use tracing::debug;

/// Demonstration controller: for every LiDAR scan it receives, it logs the
/// returns and commands a move in one fixed direction.
pub struct DummyController {
    direction: Direction,
    scan_sub: Subscription<LidarScanMsg>,
    control_pub: Publisher<ControlMsg>,
}

impl DummyController {
    /// A controller that always drives right.
    pub fn new(bus: &MessageBus) -> Self {
        Self::with_direction(bus, Direction::Right)
    }

    /// A controller that always drives in `direction`.
    pub fn with_direction(bus: &MessageBus, direction: Direction) -> Self {
        Self {
            direction,
            scan_sub: bus.subscribe(),
            control_pub: bus.publisher(),
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }
}

impl Module for DummyController {
    fn update_state(&mut self, now: SimTime) {
        let Some(scan) = self.scan_sub.pop() else {
            return;
        };

        for point in &scan.points {
            debug!(theta = point.theta, range = point.range, "LiDAR return");
        }

        self.control_pub.publish(ControlMsg::new(self.direction, now));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tickbus_types::LidarPoint;
    use tracing_test::traced_test;

    #[traced_test]
    #[test]
    fn test_commands_once_per_scan() {
        let bus = MessageBus::new();
        let mut controls = bus.subscribe::<ControlMsg>();
        let mut controller = DummyController::new(&bus);

        controller.update_state(0);
        assert!(controls.is_empty());

        bus.publish(LidarScanMsg::new(vec![LidarPoint::new(0.0, 8.0)], 1));
        controller.update_state(1);
        controller.update_state(2);

        assert_eq!(controls.drain(), vec![ControlMsg::new(Direction::Right, 1)]);
        assert!(logs_contain("LiDAR return"));
    }

    #[test]
    fn test_custom_direction() {
        let bus = MessageBus::new();
        let mut controls = bus.subscribe::<ControlMsg>();
        let mut controller = DummyController::with_direction(&bus, Direction::Down);

        bus.publish(LidarScanMsg::default());
        controller.update_state(4);

        assert_eq!(controller.direction(), Direction::Down);
        assert_eq!(controls.pop(), Some(ControlMsg::new(Direction::Down, 4)));
    }
}
