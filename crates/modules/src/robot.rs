//! Grid robot.

use crate::ModuleError;
use tickbus_bus::{MessageBus, Publisher, Subscription};
use tickbus_core::{Module, SimTime};
use tickbus_types::{ControlMsg, GridMap, TrueStateMsg};
use tracing::{debug, info};

/// A robot occupying one free cell of a grid map.
///
/// Consumes [`ControlMsg`] (at most one per tick) and publishes its true
/// position as [`TrueStateMsg`] every tick, whether or not it moved.
pub struct Robot {
    map: GridMap,
    x: i64,
    y: i64,
    control_sub: Subscription<ControlMsg>,
    state_pub: Publisher<TrueStateMsg>,
}

impl Robot {
    /// Place a robot at `(x, y)`.
    ///
    /// Fails if the cell is out of bounds or occupied. The start is checked
    /// before anything is registered on the bus.
    pub fn new(bus: &MessageBus, map: GridMap, x: i64, y: i64) -> Result<Self, ModuleError> {
        match map.is_occupied(x, y) {
            None => return Err(ModuleError::StartOutOfBounds { x, y }),
            Some(true) => return Err(ModuleError::StartOccupied { x, y }),
            Some(false) => {}
        }

        Ok(Self {
            map,
            x,
            y,
            control_sub: bus.subscribe(),
            state_pub: bus.publisher(),
        })
    }

    /// Current `(x, y)` cell.
    pub fn position(&self) -> (i64, i64) {
        (self.x, self.y)
    }

    /// Move one cell in the commanded direction if the target is free.
    ///
    /// Returns whether the robot moved. Out-of-bounds or occupied targets
    /// leave the position unchanged.
    pub fn try_execute_control(&mut self, control: &ControlMsg) -> bool {
        let (new_x, new_y) = control.direction.step(self.x, self.y);
        if !self.map.is_free(new_x, new_y) {
            debug!(
                direction = %control.direction,
                x = new_x,
                y = new_y,
                "Control blocked"
            );
            return false;
        }

        self.x = new_x;
        self.y = new_y;
        true
    }
}

impl Module for Robot {
    fn update_state(&mut self, now: SimTime) {
        if let Some(control) = self.control_sub.pop() {
            self.try_execute_control(&control);
        }

        self.state_pub.publish(TrueStateMsg::new(self.x, self.y, now));
        info!(x = self.x, y = self.y, now, "Robot position");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tickbus_test_helpers::bordered_map;
    use tickbus_types::Direction;
    use tracing_test::traced_test;

    #[test]
    fn test_invalid_start_registers_nothing() {
        let bus = MessageBus::new();

        let out = Robot::new(&bus, bordered_map(), 10, 1);
        assert!(matches!(out, Err(ModuleError::StartOutOfBounds { x: 10, y: 1 })));

        let negative = Robot::new(&bus, bordered_map(), -1, 3);
        assert!(matches!(negative, Err(ModuleError::StartOutOfBounds { .. })));

        let occupied = Robot::new(&bus, bordered_map(), 0, 0);
        assert!(matches!(occupied, Err(ModuleError::StartOccupied { x: 0, y: 0 })));

        assert_eq!(bus.topic_count(), 0);
        assert_eq!(bus.topic::<ControlMsg>().subscriber_count(), 0);
    }

    #[traced_test]
    #[test]
    fn test_publishes_position_every_tick() {
        let bus = MessageBus::new();
        let mut states = bus.subscribe::<TrueStateMsg>();
        let mut robot = Robot::new(&bus, bordered_map(), 1, 1).unwrap();

        for now in 0..3 {
            robot.update_state(now);
        }

        assert_eq!(
            states.drain(),
            vec![
                TrueStateMsg::new(1, 1, 0),
                TrueStateMsg::new(1, 1, 1),
                TrueStateMsg::new(1, 1, 2),
            ]
        );
        assert!(logs_contain("Robot position"));
    }

    #[test]
    fn test_one_direction_moves_one_axis() {
        let bus = MessageBus::new();
        let mut robot = Robot::new(&bus, bordered_map(), 4, 4).unwrap();

        assert!(robot.try_execute_control(&ControlMsg::new(Direction::Right, 0)));
        assert_eq!(robot.position(), (5, 4));
        assert!(robot.try_execute_control(&ControlMsg::new(Direction::Up, 0)));
        assert_eq!(robot.position(), (5, 3));
        assert!(robot.try_execute_control(&ControlMsg::new(Direction::Left, 0)));
        assert_eq!(robot.position(), (4, 3));
        assert!(robot.try_execute_control(&ControlMsg::new(Direction::Down, 0)));
        assert_eq!(robot.position(), (4, 4));
    }

    #[test]
    fn test_blocked_move_keeps_position() {
        let bus = MessageBus::new();
        let mut robot = Robot::new(&bus, bordered_map(), 1, 1).unwrap();

        assert!(!robot.try_execute_control(&ControlMsg::new(Direction::Left, 0)));
        assert!(!robot.try_execute_control(&ControlMsg::new(Direction::Up, 0)));
        assert_eq!(robot.position(), (1, 1));
    }

    #[test]
    fn test_consumes_one_control_per_tick() {
        let bus = MessageBus::new();
        let mut robot = Robot::new(&bus, bordered_map(), 1, 1).unwrap();

        bus.publish(ControlMsg::new(Direction::Right, 0));
        bus.publish(ControlMsg::new(Direction::Right, 0));

        robot.update_state(0);
        assert_eq!(robot.position(), (2, 1));
        robot.update_state(1);
        assert_eq!(robot.position(), (3, 1));
        robot.update_state(2);
        assert_eq!(robot.position(), (3, 1));
    }
}
