//! Planar LiDAR over an occupancy grid.

use crate::ModuleError;
use std::f64::consts::TAU;
use tickbus_bus::{MessageBus, Publisher, Subscription};
use tickbus_core::{Module, SimTime};
use tickbus_types::{GridMap, LidarPoint, LidarScanMsg, TrueStateMsg};
use tracing::trace;

/// Beam components smaller than this are treated as zero, so cardinal beams
/// stay on their row or column.
const AXIS_EPSILON: f64 = 1e-9;

/// Upper bound on samples per beam; keeps a scan's cost bounded.
const MAX_SAMPLES_PER_BEAM: f64 = 100_000.0;

/// Beam geometry of a [`Lidar`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LidarConfig {
    /// Number of beams, evenly spaced over a full turn starting at 0 rad.
    pub beams: usize,

    /// Longest range that can produce a return, in cells.
    pub max_range: f64,

    /// Distance between samples along a beam, in cells.
    pub range_step: f64,
}

impl Default for LidarConfig {
    fn default() -> Self {
        Self {
            beams: 4,
            max_range: 10.0,
            range_step: 0.5,
        }
    }
}

impl LidarConfig {
    /// Set the number of beams.
    pub fn with_beams(mut self, beams: usize) -> Self {
        self.beams = beams;
        self
    }

    /// Set the maximum range.
    pub fn with_max_range(mut self, max_range: f64) -> Self {
        self.max_range = max_range;
        self
    }

    /// Set the sampling step along each beam.
    pub fn with_range_step(mut self, range_step: f64) -> Self {
        self.range_step = range_step;
        self
    }

    fn validate(&self) -> Result<(), ModuleError> {
        if self.beams == 0 {
            return Err(ModuleError::InvalidParameter {
                name: "beams",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(self.max_range.is_finite() && self.max_range >= 0.0) {
            return Err(ModuleError::InvalidParameter {
                name: "max_range",
                reason: format!("must be finite and non-negative, got {}", self.max_range),
            });
        }
        if !(self.range_step.is_finite() && self.range_step > 0.0) {
            return Err(ModuleError::InvalidParameter {
                name: "range_step",
                reason: format!("must be finite and positive, got {}", self.range_step),
            });
        }
        let samples = self.max_range / self.range_step;
        if samples > MAX_SAMPLES_PER_BEAM {
            return Err(ModuleError::InvalidParameter {
                name: "range_step",
                reason: format!(
                    "{} samples per beam exceeds the limit of {MAX_SAMPLES_PER_BEAM}",
                    samples.floor()
                ),
            });
        }
        Ok(())
    }
}

/// Casts beams from the robot's true position and reports the first obstacle
/// hit along each one.
///
/// Consumes one [`TrueStateMsg`] per tick when available and publishes a
/// [`LidarScanMsg`] for it. Ticks without a pending state publish nothing.
pub struct Lidar {
    map: GridMap,
    config: LidarConfig,
    state_sub: Subscription<TrueStateMsg>,
    scan_pub: Publisher<LidarScanMsg>,
}

impl Lidar {
    /// Create a LiDAR with the default four-beam geometry.
    pub fn new(bus: &MessageBus, map: GridMap) -> Self {
        Self {
            map,
            config: LidarConfig::default(),
            state_sub: bus.subscribe(),
            scan_pub: bus.publisher(),
        }
    }

    /// Create a LiDAR with custom beam geometry.
    pub fn with_config(
        bus: &MessageBus,
        map: GridMap,
        config: LidarConfig,
    ) -> Result<Self, ModuleError> {
        config.validate()?;
        Ok(Self {
            map,
            config,
            state_sub: bus.subscribe(),
            scan_pub: bus.publisher(),
        })
    }

    pub fn config(&self) -> &LidarConfig {
        &self.config
    }

    /// Compute the returns seen from `state`.
    ///
    /// Each beam is sampled at `0, step, 2·step, ...` up to `max_range`; the
    /// first sample landing in an occupied in-bounds cell yields a point.
    /// Beams that leave the map or exceed the range yield nothing.
    pub fn scan(&self, state: &TrueStateMsg) -> Vec<LidarPoint> {
        let increment = TAU / self.config.beams as f64;
        let samples = (self.config.max_range / self.config.range_step).floor() as u64;

        (0..self.config.beams)
            .filter_map(|beam| {
                let theta = increment * beam as f64;
                let (dx, dy) = (snap(theta.cos()), snap(theta.sin()));

                (0..=samples)
                    .map(|k| k as f64 * self.config.range_step)
                    .find(|range| {
                        let cell_x = (state.x as f64 + range * dx).floor() as i64;
                        let cell_y = (state.y as f64 + range * dy).floor() as i64;
                        self.map.is_occupied(cell_x, cell_y) == Some(true)
                    })
                    .map(|range| LidarPoint::new(theta, range))
            })
            .collect()
    }
}

fn snap(component: f64) -> f64 {
    if component.abs() < AXIS_EPSILON {
        0.0
    } else {
        component
    }
}

impl Module for Lidar {
    fn update_state(&mut self, now: SimTime) {
        let Some(state) = self.state_sub.pop() else {
            return;
        };

        let points = self.scan(&state);
        trace!(
            x = state.x,
            y = state.y,
            returns = points.len(),
            now,
            "LiDAR scan"
        );
        self.scan_pub.publish(LidarScanMsg::new(points, state.time_ns));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};
    use tickbus_test_helpers::bordered_map;

    fn ranges(points: &[LidarPoint]) -> Vec<f64> {
        points.iter().map(|p| p.range).collect()
    }

    #[test]
    fn test_scan_in_bordered_map() {
        let bus = MessageBus::new();
        let lidar = Lidar::new(&bus, bordered_map());

        let points = lidar.scan(&TrueStateMsg::new(1, 1, 0));
        assert_eq!(points.len(), 4);
        assert_eq!(ranges(&points), vec![8.0, 8.0, 0.5, 0.5]);
        assert_eq!(points[0].theta, 0.0);
        assert_eq!(points[1].theta, FRAC_PI_2);
        assert_eq!(points[2].theta, PI);
    }

    #[test]
    fn test_scan_from_center() {
        let bus = MessageBus::new();
        let lidar = Lidar::new(&bus, bordered_map());

        let points = lidar.scan(&TrueStateMsg::new(4, 5, 0));
        assert_eq!(ranges(&points), vec![5.0, 4.0, 3.5, 4.5]);
    }

    #[test]
    fn test_out_of_range_obstacles_are_missed() {
        let bus = MessageBus::new();
        let config = LidarConfig::default().with_max_range(2.0);
        let lidar = Lidar::with_config(&bus, bordered_map(), config).unwrap();

        let points = lidar.scan(&TrueStateMsg::new(1, 1, 0));
        assert_eq!(ranges(&points), vec![0.5, 0.5]);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let bus = MessageBus::new();
        let zero_beams = LidarConfig::default().with_beams(0);
        assert!(Lidar::with_config(&bus, bordered_map(), zero_beams).is_err());

        let zero_step = LidarConfig::default().with_range_step(0.0);
        assert!(Lidar::with_config(&bus, bordered_map(), zero_step).is_err());

        let tiny_step = LidarConfig::default().with_range_step(1e-12);
        assert!(matches!(
            Lidar::with_config(&bus, bordered_map(), tiny_step),
            Err(ModuleError::InvalidParameter {
                name: "range_step",
                ..
            })
        ));

        assert_eq!(bus.topic_count(), 0);

        let fine_step = LidarConfig::default().with_range_step(0.001);
        assert!(Lidar::with_config(&bus, bordered_map(), fine_step).is_ok());
    }

    #[test]
    fn test_publishes_only_with_pending_state() {
        let bus = MessageBus::new();
        let mut scans = bus.subscribe::<LidarScanMsg>();
        let mut lidar = Lidar::new(&bus, bordered_map());

        lidar.update_state(0);
        assert!(scans.is_empty());

        bus.publish(TrueStateMsg::new(1, 1, 3));
        lidar.update_state(3);
        let scan = scans.pop().unwrap();
        assert_eq!(scan.time_ns, 3);
        assert_eq!(scan.points.len(), 4);
    }
}
